pub mod antenna;
pub mod cli;
pub mod constants;
mod error;
pub mod geometry;
pub mod im3;
pub mod interference;
pub mod pattern;
pub mod propagation;
pub mod site;
pub mod unit;

pub use antenna::{polarization_loss_db, Antenna, AntennaInfo, Polarization};
pub use error::AnalysisError;
pub use geometry::{angle_difference, Boresight, LinkGeometry, Position};
pub use im3::{
    assess_candidates, estimate_level, generate_candidates, Im3Assessment, Im3Candidate,
    Im3LevelEstimate,
};
pub use interference::{
    analyze_tx_to_rx, BlockingResult, InducedResult, InterferenceLevel, InterferenceResult,
};
pub use pattern::{AntennaPattern, PatternSample};
pub use site::{load_antenna_library, load_site, Site};
pub use unit::{BlockingSpec, EmissionRule, RadioUnit, Receiver, Transmitter};

/// Outcome of one TX/RX pair in a whole-site sweep.
#[derive(Debug)]
pub struct PairReport {
    pub tx_index: usize,
    pub rx_index: usize,
    pub outcome: Result<InterferenceResult, AnalysisError>,
}

/// Analyzes every transmitter against every receiver of a site.
///
/// A failing pair (zero separation, broken pattern data) is reported in
/// place without aborting the rest of the sweep.
pub fn analyze_all_pairs(site: &Site) -> Vec<PairReport> {
    let mut reports = Vec::with_capacity(site.transmitters.len() * site.receivers.len());
    for (tx_index, tx) in site.transmitters.iter().enumerate() {
        for (rx_index, rx) in site.receivers.iter().enumerate() {
            reports.push(PairReport {
                tx_index,
                rx_index,
                outcome: analyze_tx_to_rx(tx, rx),
            });
        }
    }
    reports
}
