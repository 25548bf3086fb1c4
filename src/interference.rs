use crate::antenna::{polarization_loss_db, Antenna};
use crate::constants::{FREE_SPACE_IMPEDANCE_OHMS, INDUCED_POWER_LIMIT_DBM, SPEED_OF_LIGHT};
use crate::error::AnalysisError;
use crate::propagation::{dbm_to_mw, free_space_path_loss_db, mw_to_dbm};
use crate::unit::{Receiver, Transmitter};

/// Peak gain plus pattern attenuation towards a direction.
///
/// Coaxial units (same X and Y) have no defined bearing, so the azimuth
/// lookup is skipped and only the elevation cut applies.
pub(crate) fn directional_gain_dbi(
    antenna: &Antenna,
    peak_gain_dbi: f64,
    azimuth_offset_deg: f64,
    elevation_offset_deg: f64,
    coaxial: bool,
) -> Result<f64, AnalysisError> {
    let horizontal_db = if coaxial {
        0.0
    } else {
        antenna.pattern.azimuth_attenuation_db(azimuth_offset_deg)?
    };
    let vertical_db = antenna.pattern.elevation_attenuation_db(elevation_offset_deg)?;
    Ok(peak_gain_dbi + horizontal_db + vertical_db)
}

/// Interference level at the receiver input, with the branch taken and
/// the out-of-band component terms retained for reporting.
#[derive(Clone, Copy, Debug)]
pub struct InterferenceLevel {
    pub level_dbm: f64,
    /// True when the direct co-channel formula applied.
    pub bands_overlap: bool,
    pub delta_f_mhz: f64,
    pub delta_bw_mhz: f64,
    /// Carrier, emission-at-rx, and emission-at-average terms of the
    /// out-of-band sum; `None` on the co-channel branch.
    pub components_dbm: Option<[f64; 3]>,
}

/// Interference power coupled from `tx` into `rx` over `distance_km`,
/// given the directional gains already resolved for this link.
///
/// Bands overlap when `delta_f` is strictly below `1.5 * (BW_tx + BW_rx)`
/// (in MHz); equality takes the out-of-band branch. The out-of-band level
/// sums three contributions in linear power: the carrier suppressed by the
/// receiver's adjacent-channel selectivity, the declared out-of-band
/// emission at the receive frequency, and the emission at the average of
/// the two frequencies with averaged path loss and ACS applied.
pub fn interference_level(
    tx: &Transmitter,
    rx: &Receiver,
    distance_km: f64,
    gt_dbi: f64,
    gr_dbi: f64,
) -> InterferenceLevel {
    let fspl_tx_db = free_space_path_loss_db(distance_km, tx.unit.frequency_mhz);
    let fspl_rx_db = free_space_path_loss_db(distance_km, rx.unit.frequency_mhz);
    let polar_loss_db = polarization_loss_db(
        tx.unit.antenna.info.polarization,
        rx.unit.antenna.info.polarization,
    );

    let delta_f_mhz = (tx.unit.frequency_mhz - rx.unit.frequency_mhz).abs();
    let delta_bw_mhz = 1.5 * (tx.unit.bandwidth_khz + rx.unit.bandwidth_khz) / 1000.0;

    let path_gain_db = gt_dbi + gr_dbi - tx.unit.cable_loss_db - rx.unit.cable_loss_db;

    if delta_f_mhz >= delta_bw_mhz {
        let acs_db = rx.acs_db.unwrap_or(0.0);
        let emission_at_rx_dbm = tx.emission_level_dbm(rx.unit.frequency_mhz);
        let freq_avg_mhz = (tx.unit.frequency_mhz + rx.unit.frequency_mhz) / 2.0;
        let emission_at_avg_dbm = tx.emission_level_dbm(freq_avg_mhz);

        let carrier_dbm = tx.power_dbm + path_gain_db - fspl_tx_db - acs_db;
        let emission_rx_dbm = emission_at_rx_dbm + path_gain_db - fspl_rx_db;
        let emission_avg_dbm =
            emission_at_avg_dbm + path_gain_db - (fspl_tx_db + fspl_rx_db) / 2.0 - acs_db;

        let sum_mw =
            dbm_to_mw(carrier_dbm) + dbm_to_mw(emission_rx_dbm) + dbm_to_mw(emission_avg_dbm);

        InterferenceLevel {
            level_dbm: mw_to_dbm(sum_mw) - polar_loss_db,
            bands_overlap: false,
            delta_f_mhz,
            delta_bw_mhz,
            components_dbm: Some([carrier_dbm, emission_rx_dbm, emission_avg_dbm]),
        }
    } else {
        InterferenceLevel {
            level_dbm: tx.power_dbm + path_gain_db - fspl_tx_db - polar_loss_db,
            bands_overlap: true,
            delta_f_mhz,
            delta_bw_mhz,
            components_dbm: None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BlockingCheck {
    pub power_dbm: f64,
    pub threshold_dbm: f64,
    pub passed: bool,
    pub freq_offset_mhz: f64,
    pub limit_mhz: f64,
}

/// Outcome of the blocking-interference check.
#[derive(Clone, Copy, Debug)]
pub enum BlockingResult {
    /// The receiver declares no blocking parameters or no sensitivity.
    MissingParameters,
    /// The carrier sits beyond the declared blocking offset window.
    OutsideOffsetWindow {
        freq_offset_mhz: f64,
        limit_mhz: f64,
    },
    Evaluated(BlockingCheck),
}

impl BlockingResult {
    pub fn evaluated(&self) -> Option<&BlockingCheck> {
        match self {
            BlockingResult::Evaluated(check) => Some(check),
            _ => None,
        }
    }
}

/// Receiver desensitization by a strong nearby carrier.
///
/// Evaluated only when the receiver declares an offset window, a
/// rejection figure, and a sensitivity; a carrier at exactly the
/// threshold level passes.
pub fn check_blocking(
    tx: &Transmitter,
    rx: &Receiver,
    distance_km: f64,
    gt_dbi: f64,
    gr_dbi: f64,
) -> BlockingResult {
    let (Some(spec), Some(sensitivity_dbm)) = (rx.blocking, rx.sensitivity_dbm) else {
        return BlockingResult::MissingParameters;
    };

    let freq_offset_mhz = (tx.unit.frequency_mhz - rx.unit.frequency_mhz).abs();
    if freq_offset_mhz > spec.freq_offset_mhz {
        return BlockingResult::OutsideOffsetWindow {
            freq_offset_mhz,
            limit_mhz: spec.freq_offset_mhz,
        };
    }

    let fspl_db = free_space_path_loss_db(distance_km, tx.unit.frequency_mhz);
    let polar_loss_db = polarization_loss_db(
        tx.unit.antenna.info.polarization,
        rx.unit.antenna.info.polarization,
    );

    let power_dbm = tx.power_dbm + gt_dbi + gr_dbi
        - tx.unit.cable_loss_db
        - rx.unit.cable_loss_db
        - fspl_db
        - polar_loss_db;
    let threshold_dbm = sensitivity_dbm + spec.rejection_db;

    BlockingResult::Evaluated(BlockingCheck {
        power_dbm,
        threshold_dbm,
        passed: power_dbm <= threshold_dbm,
        freq_offset_mhz,
        limit_mhz: spec.freq_offset_mhz,
    })
}

#[derive(Clone, Copy, Debug)]
pub struct InducedCheck {
    pub distance_m: f64,
    pub wavelength_m: f64,
    pub limit_m: f64,
    pub power_dbm: f64,
    pub threshold_dbm: f64,
    pub passed: bool,
}

/// Outcome of the near-field induced-interference check.
#[derive(Clone, Copy, Debug)]
pub enum InducedResult {
    /// Separation exceeds the near-field limit for this antenna class.
    NotConsidered {
        distance_m: f64,
        wavelength_m: f64,
        limit_m: f64,
    },
    Evaluated(InducedCheck),
}

impl InducedResult {
    pub fn evaluated(&self) -> Option<&InducedCheck> {
        match self {
            InducedResult::Evaluated(check) => Some(check),
            _ => None,
        }
    }
}

/// Direct near-field coupling of transmit energy into the receive
/// antenna.
///
/// The near-field extent is `k` wavelengths with `k` picked by the TX
/// antenna's peak-gain class; separations beyond it are not considered
/// (a separation of exactly the limit still is). Inside it, the field
/// strength at the receive aperture is converted to an induced power and
/// held against a fixed -10 dBm threshold (strictly below passes).
pub fn check_induced(tx: &Transmitter, distance_m: f64, gt_dbi: f64) -> InducedResult {
    let wavelength_m = SPEED_OF_LIGHT / (tx.unit.frequency_mhz * 1e6);

    let gain_max_dbi = tx.unit.antenna.info.gain_max_dbi;
    let k = if gain_max_dbi < 9.01 {
        1.0
    } else if gain_max_dbi < 18.01 {
        3.0
    } else {
        10.0
    };
    let limit_m = k * wavelength_m;

    if distance_m > limit_m {
        return InducedResult::NotConsidered {
            distance_m,
            wavelength_m,
            limit_m,
        };
    }

    let radiated_mw = dbm_to_mw(tx.power_dbm - tx.unit.cable_loss_db + gt_dbi);
    let field_v_per_m = (30.0 * radiated_mw).sqrt() / distance_m;
    let aperture_m2 = wavelength_m * wavelength_m / (4.0 * std::f64::consts::PI);
    let induced_mw = field_v_per_m * field_v_per_m * aperture_m2 / FREE_SPACE_IMPEDANCE_OHMS;
    let power_dbm = mw_to_dbm(induced_mw);

    InducedResult::Evaluated(InducedCheck {
        distance_m,
        wavelength_m,
        limit_m,
        power_dbm,
        threshold_dbm: INDUCED_POWER_LIMIT_DBM,
        passed: power_dbm < INDUCED_POWER_LIMIT_DBM,
    })
}

/// Full single-pair EMC assessment of one transmitter against one
/// receiver.
#[derive(Clone, Debug)]
pub struct InterferenceResult {
    pub tx_name: String,
    pub rx_name: String,
    pub distance_m: f64,
    pub azimuth_offset_tx_deg: f64,
    pub elevation_offset_tx_deg: f64,
    pub azimuth_offset_rx_deg: f64,
    pub elevation_offset_rx_deg: f64,
    pub gt_dbi: f64,
    pub gr_dbi: f64,
    pub fspl_db: f64,
    pub polarization_loss_db: f64,
    /// Desired-link received power, before EN/ACS treatment.
    pub desired_power_dbm: f64,
    pub interference: InterferenceLevel,
    pub blocking: BlockingResult,
    pub induced: InducedResult,
}

/// Runs the desired-link budget and every interference check for one
/// TX/RX pair.
///
/// The TX peak gain is de-rated against the victim receiver's frequency
/// before the pattern attenuations apply; the RX gain is not de-rated.
/// Zero separation is a geometry error.
pub fn analyze_tx_to_rx(
    tx: &Transmitter,
    rx: &Receiver,
) -> Result<InterferenceResult, AnalysisError> {
    let geometry = tx.unit.geometry_towards(&rx.unit);
    geometry.require_separation()?;

    let gt_dbi = directional_gain_dbi(
        &tx.unit.antenna,
        tx.unit
            .antenna
            .info
            .adjusted_peak_gain_dbi(rx.unit.frequency_mhz),
        geometry.azimuth_offset_a_deg,
        geometry.elevation_offset_a_deg,
        geometry.coaxial,
    )?;
    let gr_dbi = directional_gain_dbi(
        &rx.unit.antenna,
        rx.unit.antenna.info.gain_max_dbi,
        geometry.azimuth_offset_b_deg,
        geometry.elevation_offset_b_deg,
        geometry.coaxial,
    )?;

    let interference = interference_level(tx, rx, geometry.distance_km, gt_dbi, gr_dbi);
    let polar_loss_db = polarization_loss_db(
        tx.unit.antenna.info.polarization,
        rx.unit.antenna.info.polarization,
    );
    let fspl_db = free_space_path_loss_db(geometry.distance_km, tx.unit.frequency_mhz);
    let desired_power_dbm = tx.power_dbm + gt_dbi + gr_dbi
        - fspl_db
        - tx.unit.cable_loss_db
        - rx.unit.cable_loss_db;

    let blocking = check_blocking(tx, rx, geometry.distance_km, gt_dbi, gr_dbi);
    let induced = check_induced(tx, geometry.distance_m(), gt_dbi);

    Ok(InterferenceResult {
        tx_name: tx.unit.device_name.clone(),
        rx_name: rx.unit.device_name.clone(),
        distance_m: geometry.distance_m(),
        azimuth_offset_tx_deg: geometry.azimuth_offset_a_deg,
        elevation_offset_tx_deg: geometry.elevation_offset_a_deg,
        azimuth_offset_rx_deg: geometry.azimuth_offset_b_deg,
        elevation_offset_rx_deg: geometry.elevation_offset_b_deg,
        gt_dbi,
        gr_dbi,
        fspl_db,
        polarization_loss_db: polar_loss_db,
        desired_power_dbm,
        interference,
        blocking,
        induced,
    })
}
