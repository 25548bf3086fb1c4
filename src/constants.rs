/// Speed of light in m/s, as used for wavelength calculations.
pub const SPEED_OF_LIGHT: f64 = 3.0e8;

/// Constant term of the free-space path loss formula for km/MHz units.
pub const FSPL_KM_MHZ_CONST_DB: f64 = 32.44;

/// Impedance of free space in ohms.
pub const FREE_SPACE_IMPEDANCE_OHMS: f64 = 377.0;

/// Conversion loss applied to each carrier feeding a third-order
/// intermodulation product.
pub const IM3_CONVERSION_LOSS_DB: f64 = 25.0;

/// Margin above receiver sensitivity allowed for IM3 products (90% coverage).
pub const IM3_SENSITIVITY_MARGIN_DB: f64 = 10.0;

/// Receiver sensitivity assumed when a receiver declares none.
pub const DEFAULT_SENSITIVITY_DBM: f64 = -100.0;

/// Out-of-band emission level assumed for transmitters that declare
/// neither an emission rule nor a flat emission floor.
pub const DEFAULT_EMISSION_FLOOR_DBM: f64 = -40.0;

/// Fixed acceptance threshold for near-field induced interference.
pub const INDUCED_POWER_LIMIT_DBM: f64 = -10.0;

/// Distance floor for IM3 path-loss evaluation; co-mounted transmitters
/// still mix, so the path loss is floored rather than rejected.
pub const IM3_MIN_DISTANCE_KM: f64 = 1.0;
