use crate::antenna::polarization_loss_db;
use crate::constants::{
    DEFAULT_SENSITIVITY_DBM, IM3_CONVERSION_LOSS_DB, IM3_SENSITIVITY_MARGIN_DB,
};
use crate::error::AnalysisError;
use crate::interference::directional_gain_dbi;
use crate::propagation::{dbm_to_mw, free_space_path_loss_floored_db, mw_to_dbm};
use crate::unit::{Receiver, Transmitter};

/// One third-order intermodulation product `2*f_primary - f_secondary`.
///
/// The primary transmitter contributes its carrier twice, so its
/// bandwidth and geometry drive the assessment of this candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Im3Candidate {
    pub frequency_mhz: f64,
    pub primary: usize,
    pub secondary: usize,
}

/// Both IM3 products of every unordered pair among the selected
/// transmitters.
pub fn generate_candidates(
    transmitters: &[Transmitter],
    selected: &[usize],
) -> Result<Vec<Im3Candidate>, AnalysisError> {
    for &id in selected {
        if id >= transmitters.len() {
            return Err(AnalysisError::Configuration(format!(
                "transmitter index {id} out of range ({} configured)",
                transmitters.len()
            )));
        }
    }

    let mut candidates = Vec::new();
    for (n, &i) in selected.iter().enumerate() {
        for &j in &selected[n + 1..] {
            let f1 = transmitters[i].unit.frequency_mhz;
            let f2 = transmitters[j].unit.frequency_mhz;
            candidates.push(Im3Candidate {
                frequency_mhz: 2.0 * f1 - f2,
                primary: i,
                secondary: j,
            });
            candidates.push(Im3Candidate {
                frequency_mhz: 2.0 * f2 - f1,
                primary: j,
                secondary: i,
            });
        }
    }
    Ok(candidates)
}

/// A candidate classified against one receiver.
#[derive(Clone, Copy, Debug)]
pub struct Im3Assessment {
    pub candidate: Im3Candidate,
    pub delta_f_mhz: f64,
    pub delta_bw_mhz: f64,
    /// True when the product falls inside the victim's widened band.
    pub near: bool,
}

/// Classifies every candidate of the selected transmitters against one
/// receiver. A candidate is near when its offset from the receive
/// frequency is strictly below `1.5 * (BW_primary + BW_rx)` in MHz.
pub fn assess_candidates(
    transmitters: &[Transmitter],
    selected: &[usize],
    rx: &Receiver,
) -> Result<Vec<Im3Assessment>, AnalysisError> {
    let candidates = generate_candidates(transmitters, selected)?;

    Ok(candidates
        .into_iter()
        .map(|candidate| {
            let delta_f_mhz = (candidate.frequency_mhz - rx.unit.frequency_mhz).abs();
            let delta_bw_mhz = 1.5
                * (transmitters[candidate.primary].unit.bandwidth_khz + rx.unit.bandwidth_khz)
                / 1000.0;
            Im3Assessment {
                candidate,
                delta_f_mhz,
                delta_bw_mhz,
                near: delta_f_mhz < delta_bw_mhz,
            }
        })
        .collect())
}

/// Estimated level of one IM3 product at the receiver input.
#[derive(Clone, Copy, Debug)]
pub struct Im3LevelEstimate {
    pub level_dbm: f64,
    /// Sensitivity plus the coverage margin.
    pub threshold_dbm: f64,
    pub exceeds_threshold: bool,
}

/// Estimates the level of the product `2*f1 - f2` from `tx1` and `tx2`
/// at the receiver.
///
/// Each contributing carrier takes a fixed 25 dB intermodulation
/// conversion loss. Geometry, pattern gains, and polarization are
/// resolved for the primary transmitter only, with peak gains applied
/// un-derated, and the path loss floors the distance at 1 km so
/// co-mounted pairs still produce a finite level. Products outside the
/// widened band need both transmitters' emission rules; a missing rule
/// is a configuration error.
pub fn estimate_level(
    tx1: &Transmitter,
    tx2: &Transmitter,
    rx: &Receiver,
    product_freq_mhz: f64,
) -> Result<Im3LevelEstimate, AnalysisError> {
    let geometry = tx1.unit.geometry_towards(&rx.unit);

    let gt_dbi = directional_gain_dbi(
        &tx1.unit.antenna,
        tx1.unit.antenna.info.gain_max_dbi,
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

    let fspl_tx1_db =
        free_space_path_loss_floored_db(geometry.distance_km, tx1.unit.frequency_mhz);
    let fspl_tx2_db =
        free_space_path_loss_floored_db(geometry.distance_km, tx2.unit.frequency_mhz);
    let fspl_rx_db = free_space_path_loss_floored_db(geometry.distance_km, rx.unit.frequency_mhz);
    let polar_loss_db = polarization_loss_db(
        tx1.unit.antenna.info.polarization,
        rx.unit.antenna.info.polarization,
    );

    let delta_f_mhz = (product_freq_mhz - rx.unit.frequency_mhz).abs();
    let delta_bw_mhz = 1.5 * (tx1.unit.bandwidth_khz + rx.unit.bandwidth_khz) / 1000.0;

    let sum_mw = if delta_f_mhz < delta_bw_mhz {
        let p1_dbm = tx1.power_dbm - IM3_CONVERSION_LOSS_DB + gt_dbi + gr_dbi
            - tx1.unit.cable_loss_db
            - rx.unit.cable_loss_db
            - fspl_tx1_db
            - polar_loss_db;
        let p2_dbm = tx2.power_dbm - IM3_CONVERSION_LOSS_DB + gt_dbi + gr_dbi
            - tx2.unit.cable_loss_db
            - rx.unit.cable_loss_db
            - fspl_tx2_db
            - polar_loss_db;
        dbm_to_mw(p1_dbm) + dbm_to_mw(p2_dbm)
    } else {
        let rule1 = tx1.emission_rule.ok_or_else(|| {
            AnalysisError::Configuration(format!(
                "transmitter '{}' declares no emission rule, required for out-of-band IM3",
                tx1.unit.device_name
            ))
        })?;
        let rule2 = tx2.emission_rule.ok_or_else(|| {
            AnalysisError::Configuration(format!(
                "transmitter '{}' declares no emission rule, required for out-of-band IM3",
                tx2.unit.device_name
            ))
        })?;

        let acs_db = rx.acs_db.unwrap_or(0.0);
        let en1_dbm = rule1.level_dbm(rx.unit.frequency_mhz);
        let en2_dbm = rule2.level_dbm(rx.unit.frequency_mhz);

        let carrier1_dbm = tx1.power_dbm - IM3_CONVERSION_LOSS_DB + gt_dbi + gr_dbi
            - tx1.unit.cable_loss_db
            - rx.unit.cable_loss_db
            - fspl_tx1_db
            - acs_db;
        let emission1_dbm = en1_dbm - IM3_CONVERSION_LOSS_DB + gt_dbi + gr_dbi
            - tx1.unit.cable_loss_db
            - rx.unit.cable_loss_db
            - fspl_rx_db;
        let carrier2_dbm = tx2.power_dbm - IM3_CONVERSION_LOSS_DB + gt_dbi + gr_dbi
            - tx2.unit.cable_loss_db
            - rx.unit.cable_loss_db
            - fspl_tx2_db
            - acs_db;
        let emission2_dbm = en2_dbm - IM3_CONVERSION_LOSS_DB + gt_dbi + gr_dbi
            - tx2.unit.cable_loss_db
            - rx.unit.cable_loss_db
            - fspl_rx_db;

        dbm_to_mw(carrier1_dbm)
            + dbm_to_mw(emission1_dbm)
            + dbm_to_mw(carrier2_dbm)
            + dbm_to_mw(emission2_dbm)
    };

    let level_dbm = mw_to_dbm(sum_mw);
    let threshold_dbm =
        rx.sensitivity_dbm.unwrap_or(DEFAULT_SENSITIVITY_DBM) + IM3_SENSITIVITY_MARGIN_DB;

    Ok(Im3LevelEstimate {
        level_dbm,
        threshold_dbm,
        exceeds_threshold: level_dbm > threshold_dbm,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::antenna::{Antenna, AntennaInfo, Polarization};
    use crate::geometry::{Boresight, Position};
    use crate::pattern::{AntennaPattern, PatternSample};
    use crate::unit::{EmissionRule, RadioUnit};

    fn omni_antenna() -> Arc<Antenna> {
        let flat = |angles: &[f64]| {
            angles
                .iter()
                .map(|&angle_deg| PatternSample {
                    angle_deg,
                    attenuation_db: 0.0,
                })
                .collect::<Vec<_>>()
        };
        Arc::new(Antenna {
            name: "omni".to_string(),
            info: AntennaInfo {
                gain_max_dbi: 2.15,
                polarization: Polarization::Vertical,
                freq_range_mhz: Some((146.0, 174.0)),
                gain_oob_dbi: -20.0,
            },
            pattern: AntennaPattern::new(
                flat(&[0.0, 90.0, 180.0, 270.0]),
                flat(&[-90.0, 0.0, 90.0]),
            ),
        })
    }

    fn tx(freq_mhz: f64, z_m: f64) -> Transmitter {
        Transmitter {
            unit: RadioUnit {
                device_name: format!("tx-{freq_mhz}"),
                antenna: omni_antenna(),
                position: Position::new(0.0, 0.0, z_m),
                boresight: Boresight {
                    azimuth_deg: 45.0,
                    elevation_deg: 0.0,
                },
                frequency_mhz: freq_mhz,
                bandwidth_khz: 25.0,
                cable_loss_db: 2.0,
            },
            power_dbm: 44.0,
            emission_rule: None,
            emission_floor_dbm: None,
        }
    }

    fn rx(freq_mhz: f64, z_m: f64) -> Receiver {
        Receiver {
            unit: RadioUnit {
                device_name: format!("rx-{freq_mhz}"),
                antenna: omni_antenna(),
                position: Position::new(0.0, 0.0, z_m),
                boresight: Boresight {
                    azimuth_deg: 45.0,
                    elevation_deg: 0.0,
                },
                frequency_mhz: freq_mhz,
                bandwidth_khz: 25.0,
                cable_loss_db: 2.0,
            },
            sensitivity_dbm: Some(-118.0),
            acs_db: None,
            blocking: None,
        }
    }

    #[test]
    fn candidate_frequencies_for_a_pair() {
        let transmitters = vec![tx(160.0, 25.0), tx(164.0, 30.0)];
        let candidates = generate_candidates(&transmitters, &[0, 1]).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].frequency_mhz, 156.0);
        assert_eq!(candidates[0].primary, 0);
        assert_eq!(candidates[0].secondary, 1);
        assert_eq!(candidates[1].frequency_mhz, 168.0);
        assert_eq!(candidates[1].primary, 1);
        assert_eq!(candidates[1].secondary, 0);
    }

    #[test]
    fn three_transmitters_give_six_candidates() {
        let transmitters = vec![tx(158.0, 25.0), tx(162.0, 30.0), tx(164.0, 35.0)];
        let candidates = generate_candidates(&transmitters, &[0, 1, 2]).unwrap();
        assert_eq!(candidates.len(), 6);
    }

    #[test]
    fn subset_selection_skips_other_transmitters() {
        let transmitters = vec![tx(158.0, 25.0), tx(162.0, 30.0), tx(164.0, 35.0)];
        let candidates = generate_candidates(&transmitters, &[0, 2]).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].frequency_mhz, 2.0 * 158.0 - 164.0);
    }

    #[test]
    fn out_of_range_selection_is_a_configuration_error() {
        let transmitters = vec![tx(158.0, 25.0)];
        assert!(matches!(
            generate_candidates(&transmitters, &[0, 3]),
            Err(AnalysisError::Configuration(_))
        ));
    }

    #[test]
    fn product_on_the_victim_frequency_is_near() {
        // 2*158 - 162 = 154 lands exactly on the receiver.
        let transmitters = vec![tx(158.0, 25.0), tx(162.0, 30.0)];
        let victim = rx(154.0, 27.0);

        let assessments = assess_candidates(&transmitters, &[0, 1], &victim).unwrap();

        assert_eq!(assessments[0].candidate.frequency_mhz, 154.0);
        assert_eq!(assessments[0].delta_f_mhz, 0.0);
        assert!((assessments[0].delta_bw_mhz - 0.075).abs() < 1e-12);
        assert!(assessments[0].near);
        // 2*162 - 158 = 166 is 12 MHz away.
        assert!(!assessments[1].near);
    }

    #[test]
    fn near_product_level_is_finite_and_in_band() {
        let transmitters = vec![tx(158.0, 25.0), tx(162.0, 30.0)];
        let victim = rx(154.0, 27.0);

        let estimate = estimate_level(&transmitters[0], &transmitters[1], &victim, 154.0).unwrap();

        assert!(estimate.level_dbm.is_finite());
        assert_eq!(estimate.threshold_dbm, -108.0);
        // Two 44 dBm carriers a few meters away swamp a -108 dBm limit
        // even after the 25 dB conversion loss.
        assert!(estimate.exceeds_threshold);
    }

    #[test]
    fn far_product_without_emission_rules_is_a_configuration_error() {
        let transmitters = vec![tx(158.0, 25.0), tx(162.0, 30.0)];
        let victim = rx(120.0, 27.0);

        assert!(matches!(
            estimate_level(&transmitters[0], &transmitters[1], &victim, 166.0),
            Err(AnalysisError::Configuration(_))
        ));
    }

    #[test]
    fn far_product_with_emission_rules_uses_four_terms() {
        let rule = EmissionRule {
            freq_limit_mhz: 1000.0,
            below_limit_dbm: -36.0,
            above_limit_dbm: -30.0,
        };
        let mut tx1 = tx(158.0, 25.0);
        let mut tx2 = tx(162.0, 30.0);
        tx1.emission_rule = Some(rule);
        tx2.emission_rule = Some(rule);
        let victim = rx(120.0, 27.0);

        let estimate = estimate_level(&tx1, &tx2, &victim, 166.0).unwrap();
        assert!(estimate.level_dbm.is_finite());

        // Raising the receiver's selectivity suppresses the carrier terms.
        let mut selective = rx(120.0, 27.0);
        selective.acs_db = Some(70.0);
        let suppressed = estimate_level(&tx1, &tx2, &selective, 166.0).unwrap();
        assert!(suppressed.level_dbm < estimate.level_dbm);
    }

    #[test]
    fn co_mounted_pair_yields_a_finite_level() {
        // Same coordinates: geometry degenerates, the path-loss floor
        // keeps the estimate finite.
        let transmitters = vec![tx(158.0, 25.0), tx(162.0, 25.0)];
        let mut victim = rx(154.0, 25.0);
        victim.unit.position = transmitters[0].unit.position;

        let estimate = estimate_level(&transmitters[0], &transmitters[1], &victim, 154.0).unwrap();
        assert!(estimate.level_dbm.is_finite());
    }
}
