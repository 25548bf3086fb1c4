use std::sync::Arc;

use crate::antenna::Antenna;
use crate::constants::DEFAULT_EMISSION_FLOOR_DBM;
use crate::geometry::{Boresight, LinkGeometry, Position};

/// Parameters shared by transmitters and receivers: a device with an
/// antenna emplaced somewhere on the site.
#[derive(Clone, Debug)]
pub struct RadioUnit {
    pub device_name: String,
    pub antenna: Arc<Antenna>,
    pub position: Position,
    pub boresight: Boresight,
    pub frequency_mhz: f64,
    pub bandwidth_khz: f64,
    pub cable_loss_db: f64,
}

impl RadioUnit {
    /// Geometry from this unit towards another, oriented A→B.
    pub fn geometry_towards(&self, other: &RadioUnit) -> LinkGeometry {
        LinkGeometry::between(
            &self.position,
            &self.boresight,
            &other.position,
            &other.boresight,
        )
    }
}

/// Declared out-of-band emission limits of a transmitter, piecewise
/// around a frequency limit.
#[derive(Clone, Copy, Debug)]
pub struct EmissionRule {
    pub freq_limit_mhz: f64,
    pub below_limit_dbm: f64,
    pub above_limit_dbm: f64,
}

impl EmissionRule {
    pub fn level_dbm(&self, freq_mhz: f64) -> f64 {
        if freq_mhz <= self.freq_limit_mhz {
            self.below_limit_dbm
        } else {
            self.above_limit_dbm
        }
    }
}

/// A transmitting radio unit.
#[derive(Clone, Debug)]
pub struct Transmitter {
    pub unit: RadioUnit,
    pub power_dbm: f64,
    pub emission_rule: Option<EmissionRule>,
    /// Flat out-of-band emission level used when no rule is declared.
    pub emission_floor_dbm: Option<f64>,
}

impl Transmitter {
    /// Out-of-band emission level towards a given frequency, falling back
    /// to the flat floor (default -40 dBm) when no rule is declared.
    pub fn emission_level_dbm(&self, freq_mhz: f64) -> f64 {
        match self.emission_rule {
            Some(rule) => rule.level_dbm(freq_mhz),
            None => self.emission_floor_dbm.unwrap_or(DEFAULT_EMISSION_FLOOR_DBM),
        }
    }
}

/// Receiver blocking tolerance: strong signals within `freq_offset_mhz`
/// of the tuned frequency must stay `rejection_db` below sensitivity.
#[derive(Clone, Copy, Debug)]
pub struct BlockingSpec {
    pub freq_offset_mhz: f64,
    pub rejection_db: f64,
}

/// A receiving radio unit.
#[derive(Clone, Debug)]
pub struct Receiver {
    pub unit: RadioUnit,
    pub sensitivity_dbm: Option<f64>,
    /// Adjacent-channel selectivity; 0 dB assumed when absent.
    pub acs_db: Option<f64>,
    pub blocking: Option<BlockingSpec>,
}
