use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::antenna::{Antenna, AntennaInfo, Polarization};
use crate::error::AnalysisError;
use crate::geometry::{Boresight, Position};
use crate::pattern::{AntennaPattern, PatternSample};
use crate::unit::{BlockingSpec, EmissionRule, RadioUnit, Receiver, Transmitter};

/// A complete site: every transmitter and receiver with its antenna
/// resolved against the antenna library.
#[derive(Clone, Debug)]
pub struct Site {
    pub name: String,
    pub transmitters: Vec<Transmitter>,
    pub receivers: Vec<Receiver>,
}

#[derive(Deserialize, Debug)]
struct SiteConfig {
    name: String,
    /// Antenna library path, relative to the site file.
    antenna_file: String,
    #[serde(default, rename = "transmitter")]
    transmitters: Vec<TransmitterConfig>,
    #[serde(default, rename = "receiver")]
    receivers: Vec<ReceiverConfig>,
}

#[derive(Deserialize, Debug)]
struct UnitConfig {
    device_name: String,
    antenna: String,
    frequency_mhz: f64,
    bandwidth_khz: f64,
    azimuth_deg: f64,
    elevation_deg: f64,
    position_m: [f64; 3],
    cable_loss_db: f64,
}

#[derive(Deserialize, Debug)]
struct TransmitterConfig {
    #[serde(flatten)]
    unit: UnitConfig,
    power_dbm: f64,
    emission_rule: Option<EmissionRuleConfig>,
    emission_floor_dbm: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct EmissionRuleConfig {
    freq_limit_mhz: f64,
    below_limit_dbm: f64,
    above_limit_dbm: f64,
}

#[derive(Deserialize, Debug)]
struct ReceiverConfig {
    #[serde(flatten)]
    unit: UnitConfig,
    sensitivity_dbm: Option<f64>,
    acs_db: Option<f64>,
    blocking: Option<BlockingConfig>,
}

#[derive(Deserialize, Debug)]
struct BlockingConfig {
    freq_offset_mhz: f64,
    rejection_db: f64,
}

#[derive(Deserialize, Debug)]
struct AntennaLibraryConfig {
    #[serde(rename = "antenna")]
    antennas: Vec<AntennaConfig>,
}

#[derive(Deserialize, Debug)]
struct AntennaConfig {
    name: String,
    gain_max_dbi: f64,
    #[serde(default)]
    polarization: Polarization,
    freq_min_mhz: Option<f64>,
    freq_max_mhz: Option<f64>,
    #[serde(default = "default_gain_oob_dbi")]
    gain_oob_dbi: f64,
    /// (angle_deg, attenuation_db) pairs.
    azimuth: Vec<(f64, f64)>,
    elevation: Vec<(f64, f64)>,
}

fn default_gain_oob_dbi() -> f64 {
    -20.0
}

/// Loads an antenna library file into shared antenna instances.
///
/// Each antenna identity is built once; every unit referencing the same
/// name shares the same read-only instance.
pub fn load_antenna_library(
    path: &Path,
) -> Result<HashMap<String, Arc<Antenna>>, AnalysisError> {
    let content = fs::read_to_string(path)?;
    let config: AntennaLibraryConfig = toml::from_str(&content)?;

    let mut library = HashMap::new();
    for antenna in config.antennas {
        debug!(name = %antenna.name, "loaded antenna");
        library.insert(antenna.name.clone(), Arc::new(build_antenna(antenna)));
    }
    Ok(library)
}

fn build_antenna(config: AntennaConfig) -> Antenna {
    let to_samples = |pairs: Vec<(f64, f64)>| {
        pairs
            .into_iter()
            .map(|(angle_deg, attenuation_db)| PatternSample {
                angle_deg,
                attenuation_db,
            })
            .collect::<Vec<_>>()
    };

    Antenna {
        name: config.name,
        info: AntennaInfo {
            gain_max_dbi: config.gain_max_dbi,
            polarization: config.polarization,
            freq_range_mhz: config.freq_min_mhz.zip(config.freq_max_mhz),
            gain_oob_dbi: config.gain_oob_dbi,
        },
        pattern: AntennaPattern::new(to_samples(config.azimuth), to_samples(config.elevation)),
    }
}

/// Loads a site file and resolves every unit's antenna reference.
///
/// The antenna library path inside the file is taken relative to the
/// site file's directory, so a site and its library travel together.
pub fn load_site(path: &Path) -> Result<Site, AnalysisError> {
    let content = fs::read_to_string(path)?;
    let config: SiteConfig = toml::from_str(&content)?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let library = load_antenna_library(&base_dir.join(&config.antenna_file))?;

    debug!(
        site = %config.name,
        transmitters = config.transmitters.len(),
        receivers = config.receivers.len(),
        "loaded site configuration"
    );

    let transmitters = config
        .transmitters
        .into_iter()
        .map(|tx| {
            Ok(Transmitter {
                unit: build_unit(tx.unit, &library)?,
                power_dbm: tx.power_dbm,
                emission_rule: tx.emission_rule.map(|rule| EmissionRule {
                    freq_limit_mhz: rule.freq_limit_mhz,
                    below_limit_dbm: rule.below_limit_dbm,
                    above_limit_dbm: rule.above_limit_dbm,
                }),
                emission_floor_dbm: tx.emission_floor_dbm,
            })
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    let receivers = config
        .receivers
        .into_iter()
        .map(|rx| {
            Ok(Receiver {
                unit: build_unit(rx.unit, &library)?,
                sensitivity_dbm: rx.sensitivity_dbm,
                acs_db: rx.acs_db,
                blocking: rx.blocking.map(|blocking| BlockingSpec {
                    freq_offset_mhz: blocking.freq_offset_mhz,
                    rejection_db: blocking.rejection_db,
                }),
            })
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    Ok(Site {
        name: config.name,
        transmitters,
        receivers,
    })
}

fn build_unit(
    config: UnitConfig,
    library: &HashMap<String, Arc<Antenna>>,
) -> Result<RadioUnit, AnalysisError> {
    let antenna = library.get(&config.antenna).ok_or_else(|| {
        AnalysisError::Configuration(format!(
            "device '{}' references antenna '{}' not present in the antenna library",
            config.device_name, config.antenna
        ))
    })?;

    let [x_m, y_m, z_m] = config.position_m;
    Ok(RadioUnit {
        device_name: config.device_name,
        antenna: Arc::clone(antenna),
        position: Position::new(x_m, y_m, z_m),
        boresight: Boresight {
            azimuth_deg: config.azimuth_deg,
            elevation_deg: config.elevation_deg,
        },
        frequency_mhz: config.frequency_mhz,
        bandwidth_khz: config.bandwidth_khz,
        cable_loss_db: config.cable_loss_db,
    })
}
