use serde::Deserialize;

use crate::error::AnalysisError;

/// One measured point of a radiation pattern.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct PatternSample {
    pub angle_deg: f64,
    pub attenuation_db: f64, // relative to peak gain, typically <= 0
}

/// Measured horizontal (azimuth) and vertical (elevation) radiation
/// patterns of one antenna.
///
/// Azimuth is circular over 0-360 degrees; elevation is not. Samples are
/// sorted and de-duplicated at construction so interpolation is
/// unambiguous.
#[derive(Clone, Debug)]
pub struct AntennaPattern {
    azimuth: Vec<PatternSample>,
    elevation: Vec<PatternSample>,
}

impl AntennaPattern {
    pub fn new(azimuth: Vec<PatternSample>, elevation: Vec<PatternSample>) -> AntennaPattern {
        AntennaPattern {
            azimuth: sort_and_dedup(azimuth),
            elevation: sort_and_dedup(elevation),
        }
    }

    /// Pattern attenuation in dB at an azimuth offset from boresight.
    ///
    /// The query angle is normalized modulo 360. The sample sequence is
    /// logically extended by a +360-degree copy of itself so that
    /// interpolation wraps smoothly across the 0/360 boundary and
    /// `azimuth_attenuation_db(0) == azimuth_attenuation_db(360)`.
    pub fn azimuth_attenuation_db(&self, angle_deg: f64) -> Result<f64, AnalysisError> {
        if self.azimuth.len() < 2 {
            return Err(AnalysisError::PatternData(format!(
                "azimuth pattern has {} sample(s), need at least 2",
                self.azimuth.len()
            )));
        }

        let angle = angle_deg.rem_euclid(360.0);
        let extended: Vec<PatternSample> = self
            .azimuth
            .iter()
            .copied()
            .chain(self.azimuth.iter().map(|s| PatternSample {
                angle_deg: s.angle_deg + 360.0,
                attenuation_db: s.attenuation_db,
            }))
            .collect();

        Ok(interpolate(&extended, angle))
    }

    /// Pattern attenuation in dB at an elevation offset from boresight.
    ///
    /// Angles outside the sampled range hold the boundary sample's value.
    pub fn elevation_attenuation_db(&self, angle_deg: f64) -> Result<f64, AnalysisError> {
        if self.elevation.len() < 2 {
            return Err(AnalysisError::PatternData(format!(
                "elevation pattern has {} sample(s), need at least 2",
                self.elevation.len()
            )));
        }

        Ok(interpolate(&self.elevation, angle_deg))
    }

    pub fn azimuth_samples(&self) -> &[PatternSample] {
        &self.azimuth
    }

    pub fn elevation_samples(&self) -> &[PatternSample] {
        &self.elevation
    }
}

fn sort_and_dedup(mut samples: Vec<PatternSample>) -> Vec<PatternSample> {
    samples.sort_by(|a, b| a.angle_deg.total_cmp(&b.angle_deg));
    samples.dedup_by(|a, b| a.angle_deg == b.angle_deg);
    samples
}

// Piecewise-linear interpolation over an increasing sample sequence,
// holding the boundary value outside the sampled range.
fn interpolate(samples: &[PatternSample], angle_deg: f64) -> f64 {
    let first = samples[0];
    let last = samples[samples.len() - 1];

    if angle_deg <= first.angle_deg {
        return first.attenuation_db;
    }
    if angle_deg >= last.angle_deg {
        return last.attenuation_db;
    }

    for pair in samples.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if angle_deg <= hi.angle_deg {
            let span = hi.angle_deg - lo.angle_deg;
            let t = (angle_deg - lo.angle_deg) / span;
            return lo.attenuation_db + t * (hi.attenuation_db - lo.attenuation_db);
        }
    }

    last.attenuation_db
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(angle_deg: f64, attenuation_db: f64) -> PatternSample {
        PatternSample {
            angle_deg,
            attenuation_db,
        }
    }

    fn directional_pattern() -> AntennaPattern {
        AntennaPattern::new(
            vec![
                sample(0.0, 0.0),
                sample(90.0, -10.0),
                sample(180.0, -25.0),
                sample(270.0, -10.0),
                sample(350.0, -2.0),
            ],
            vec![
                sample(-90.0, -30.0),
                sample(0.0, 0.0),
                sample(90.0, -30.0),
            ],
        )
    }

    #[test]
    fn azimuth_hits_samples_exactly() {
        let pattern = directional_pattern();
        assert_eq!(pattern.azimuth_attenuation_db(0.0).unwrap(), 0.0);
        assert_eq!(pattern.azimuth_attenuation_db(180.0).unwrap(), -25.0);
    }

    #[test]
    fn azimuth_interpolates_between_samples() {
        let pattern = directional_pattern();
        let at_45 = pattern.azimuth_attenuation_db(45.0).unwrap();
        assert!((at_45 - -5.0).abs() < 1e-9);
    }

    #[test]
    fn azimuth_is_periodic() {
        let pattern = directional_pattern();
        for angle in [0.0, 37.5, 90.0, 181.0, 355.0] {
            let base = pattern.azimuth_attenuation_db(angle).unwrap();
            let wrapped = pattern.azimuth_attenuation_db(angle + 360.0).unwrap();
            assert_eq!(base, wrapped, "gain({angle}) != gain({})", angle + 360.0);
        }
    }

    #[test]
    fn azimuth_wraps_across_zero() {
        // 355 lies between the 350-degree sample (-2 dB) and the wrapped
        // 0-degree sample at 360 (0 dB): halfway is -1 dB.
        let pattern = directional_pattern();
        let at_355 = pattern.azimuth_attenuation_db(355.0).unwrap();
        assert!((at_355 - -1.0).abs() < 1e-9);
    }

    #[test]
    fn azimuth_negative_angle_normalizes() {
        let pattern = directional_pattern();
        let at_minus_5 = pattern.azimuth_attenuation_db(-5.0).unwrap();
        let at_355 = pattern.azimuth_attenuation_db(355.0).unwrap();
        assert_eq!(at_minus_5, at_355);
    }

    #[test]
    fn elevation_clamps_outside_range() {
        let pattern = directional_pattern();
        assert_eq!(pattern.elevation_attenuation_db(-120.0).unwrap(), -30.0);
        assert_eq!(pattern.elevation_attenuation_db(120.0).unwrap(), -30.0);
    }

    #[test]
    fn elevation_interpolates() {
        let pattern = directional_pattern();
        let at_45 = pattern.elevation_attenuation_db(45.0).unwrap();
        assert!((at_45 - -15.0).abs() < 1e-9);
    }

    #[test]
    fn too_few_samples_is_an_error() {
        let pattern = AntennaPattern::new(vec![sample(0.0, 0.0)], Vec::new());
        assert!(matches!(
            pattern.azimuth_attenuation_db(10.0),
            Err(AnalysisError::PatternData(_))
        ));
        assert!(matches!(
            pattern.elevation_attenuation_db(10.0),
            Err(AnalysisError::PatternData(_))
        ));
    }

    #[test]
    fn duplicate_angles_are_dropped() {
        let pattern = AntennaPattern::new(
            vec![sample(0.0, 0.0), sample(0.0, -3.0), sample(180.0, -20.0)],
            Vec::new(),
        );
        assert_eq!(pattern.azimuth_samples().len(), 2);
        assert_eq!(pattern.azimuth_attenuation_db(0.0).unwrap(), 0.0);
    }
}
