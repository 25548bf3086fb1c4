use crate::constants::{FSPL_KM_MHZ_CONST_DB, IM3_MIN_DISTANCE_KM};

/// Free-space path loss in dB for a distance in km and frequency in MHz.
///
/// The distance must be positive; callers reject zero separation through
/// the link geometry before reaching this point.
pub fn free_space_path_loss_db(distance_km: f64, freq_mhz: f64) -> f64 {
    20.0 * distance_km.log10() + 20.0 * freq_mhz.log10() + FSPL_KM_MHZ_CONST_DB
}

/// Free-space path loss with the distance floored at 1 km.
///
/// Used by the IM3 path, where co-mounted transmitter pairs are a valid
/// configuration and the mixing products still need a finite level.
pub fn free_space_path_loss_floored_db(distance_km: f64, freq_mhz: f64) -> f64 {
    let distance_km = if distance_km <= 0.0 {
        IM3_MIN_DISTANCE_KM
    } else {
        distance_km
    };
    free_space_path_loss_db(distance_km, freq_mhz)
}

/// Power in dBm to linear milliwatts.
pub fn dbm_to_mw(power_dbm: f64) -> f64 {
    rfconversions::power::db_to_linear(power_dbm)
}

/// Linear milliwatts to dBm.
pub fn mw_to_dbm(power_mw: f64) -> f64 {
    rfconversions::power::watts_to_dbm(power_mw / 1000.0)
}
