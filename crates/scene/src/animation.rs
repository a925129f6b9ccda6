use std::f64::consts::TAU;

use foundation::math::{Mat4, Vec3, mat4_rotation_y};

use crate::flights::FlightPaths;
use crate::schedule::FlightSchedule;

/// One marker per flight, placed by distance travelled so it moves at constant speed.
pub fn marker_positions(paths: &FlightPaths, schedule: &FlightSchedule, now_ms: f64) -> Vec<Vec3> {
    paths
        .paths()
        .iter()
        .enumerate()
        .map(|(i, path)| path.spline.point_at(schedule.progress(i, now_ms)))
        .collect()
}

/// Accumulated rotation of the globe about its polar axis.
///
/// Tracks, endpoints and markers share it; the starfield stays put.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct GlobeSpin {
    angle: f64,
    per_frame: f64,
}

impl GlobeSpin {
    pub fn new(per_frame: f64) -> Self {
        Self {
            angle: 0.0,
            per_frame,
        }
    }

    /// Step once per rendered frame, independent of frame time.
    pub fn advance(&mut self) {
        self.angle = (self.angle + self.per_frame).rem_euclid(TAU);
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn model_matrix(&self) -> Mat4 {
        mat4_rotation_y(self.angle)
    }
}
