use serde::Deserialize;

use crate::pattern::AntennaPattern;

/// Antenna polarization tag.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Polarization {
    Vertical,
    Horizontal,
    Circular,
    /// Polarization metadata absent or unrecognized; treated as
    /// compatible with everything so missing data never blocks analysis.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Coupling loss between a transmit and receive polarization.
///
/// Matched linear polarizations couple without penalty, crossed linear
/// polarizations take the planning cross-pol discrimination value, and
/// circular against linear splits the power. Pairs involving an unknown
/// tag return 0 dB.
pub fn polarization_loss_db(tx: Polarization, rx: Polarization) -> f64 {
    use Polarization::*;

    match (tx, rx) {
        (Unknown, _) | (_, Unknown) => 0.0,
        (a, b) if a == b => 0.0,
        (Vertical, Horizontal) | (Horizontal, Vertical) => 20.0,
        (Circular, _) | (_, Circular) => 3.0,
        _ => 0.0,
    }
}

/// Catalog parameters of one antenna model.
#[derive(Clone, Debug)]
pub struct AntennaInfo {
    pub gain_max_dbi: f64,
    pub polarization: Polarization,
    /// Design frequency band in MHz; `None` disables off-band de-rating.
    pub freq_range_mhz: Option<(f64, f64)>,
    /// Gain assumed far outside the design band.
    pub gain_oob_dbi: f64,
}

impl AntennaInfo {
    /// Peak gain corrected for operation away from the design band.
    ///
    /// The frequency ratio to band center selects between full peak gain
    /// (ratio below `a`), the out-of-band gain (ratio above `b`), and a
    /// linear blend in between. Higher-gain antennas roll off faster.
    /// Missing band data or a non-positive frequency is a pass-through.
    pub fn adjusted_peak_gain_dbi(&self, freq_mhz: f64) -> f64 {
        let Some((freq_min_mhz, freq_max_mhz)) = self.freq_range_mhz else {
            return self.gain_max_dbi;
        };
        if freq_mhz <= 0.0 || freq_min_mhz <= 0.0 || freq_max_mhz <= 0.0 {
            return self.gain_max_dbi;
        }

        let center_mhz = (freq_min_mhz + freq_max_mhz) / 2.0;
        let ratio = (freq_mhz / center_mhz).max(center_mhz / freq_mhz);

        let (a, b) = if self.gain_max_dbi < 6.01 {
            (1.2, 2.0)
        } else if self.gain_max_dbi < 15.01 {
            (1.15, 1.75)
        } else {
            (1.1, 1.5)
        };

        if ratio <= a {
            self.gain_max_dbi
        } else if ratio >= b {
            self.gain_oob_dbi
        } else {
            let alpha = (ratio - a) / (b - a);
            self.gain_max_dbi * (1.0 - alpha) + self.gain_oob_dbi * alpha
        }
    }
}

/// One antenna identity: catalog parameters plus its measured patterns.
///
/// Loaded once per identity and shared read-only between every radio
/// unit that references it.
#[derive(Clone, Debug)]
pub struct Antenna {
    pub name: String,
    pub info: AntennaInfo,
    pub pattern: AntennaPattern,
}
