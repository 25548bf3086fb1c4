use serde::Deserialize;

use crate::error::AnalysisError;

/// Antenna position on the mast in meters.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct Position {
    pub x_m: f64,
    pub y_m: f64,
    pub z_m: f64,
}

impl Position {
    pub fn new(x_m: f64, y_m: f64, z_m: f64) -> Position {
        Position { x_m, y_m, z_m }
    }
}

/// Antenna boresight direction in degrees.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct Boresight {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

/// Derived geometry between two emplaced antennas, recomputed per query.
#[derive(Clone, Copy, Debug)]
pub struct LinkGeometry {
    pub distance_km: f64,
    /// True when both antennas share the same X and Y (undefined bearing).
    pub coaxial: bool,
    pub bearing_a_to_b_deg: f64,
    pub elevation_a_to_b_deg: f64,
    pub bearing_b_to_a_deg: f64,
    pub elevation_b_to_a_deg: f64,
    /// Circular offset of B from A's boresight azimuth, range [0, 180].
    pub azimuth_offset_a_deg: f64,
    pub elevation_offset_a_deg: f64,
    pub azimuth_offset_b_deg: f64,
    pub elevation_offset_b_deg: f64,
}

impl LinkGeometry {
    /// Computes the full link geometry from A towards B and back.
    ///
    /// Bearings and offsets are computed independently for each direction
    /// because the boresights differ at each end. Construction never
    /// fails; callers that cannot tolerate zero separation check
    /// [`LinkGeometry::require_separation`].
    pub fn between(
        a_position: &Position,
        a_boresight: &Boresight,
        b_position: &Position,
        b_boresight: &Boresight,
    ) -> LinkGeometry {
        let dx = b_position.x_m - a_position.x_m;
        let dy = b_position.y_m - a_position.y_m;
        let dz = b_position.z_m - a_position.z_m;

        let distance_km = (dx * dx + dy * dy + dz * dz).sqrt() / 1000.0;

        let bearing_a_to_b_deg = bearing_deg(dx, dy);
        let elevation_a_to_b_deg = elevation_deg(dz, dx, dy);
        let bearing_b_to_a_deg = bearing_deg(-dx, -dy);
        let elevation_b_to_a_deg = elevation_deg(-dz, -dx, -dy);

        LinkGeometry {
            distance_km,
            coaxial: dx == 0.0 && dy == 0.0,
            bearing_a_to_b_deg,
            elevation_a_to_b_deg,
            bearing_b_to_a_deg,
            elevation_b_to_a_deg,
            azimuth_offset_a_deg: angle_difference(a_boresight.azimuth_deg, bearing_a_to_b_deg),
            elevation_offset_a_deg: angle_difference(
                a_boresight.elevation_deg,
                elevation_a_to_b_deg,
            ),
            azimuth_offset_b_deg: angle_difference(b_boresight.azimuth_deg, bearing_b_to_a_deg),
            elevation_offset_b_deg: angle_difference(
                b_boresight.elevation_deg,
                elevation_b_to_a_deg,
            ),
        }
    }

    /// Zero distance has no defined bearing or path loss.
    pub fn require_separation(&self) -> Result<(), AnalysisError> {
        if self.distance_km == 0.0 {
            return Err(AnalysisError::Geometry(
                "zero distance between antennas, check the coordinates".to_string(),
            ));
        }
        Ok(())
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_km * 1000.0
    }
}

/// Azimuth of the displacement (dx, dy), measured clockwise from +Y,
/// range [0, 360).
pub fn bearing_deg(dx: f64, dy: f64) -> f64 {
    (dx.atan2(dy).to_degrees() + 360.0) % 360.0
}

/// Elevation of the displacement, negated so that a positive boresight
/// elevation points down the mast towards a lower target.
pub fn elevation_deg(dz: f64, dx: f64, dy: f64) -> f64 {
    let horizontal_m = (dx * dx + dy * dy).sqrt();
    -dz.atan2(horizontal_m).to_degrees()
}

/// Circular difference between two angles in degrees, symmetric,
/// range [0, 180].
pub fn angle_difference(a1_deg: f64, a2_deg: f64) -> f64 {
    let diff = (a1_deg - a2_deg).abs();
    diff.min(360.0 - diff)
}
