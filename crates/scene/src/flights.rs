//! Arc geometry for each flight.

use foundation::math::{Vec3, lat_lng_inter_point, xyz_from_lat_lng};
use formats::{FlightRange, FlightRecord};
use tracing::debug;

use crate::config::FlightsConfig;
use crate::spline::{CatmullRom3, MIN_ARC_SEGMENTS, SplineError};

/// A straight piece of a track polyline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TrackSegment {
    pub start: Vec3,
    pub end: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightPath {
    pub record: FlightRecord,
    pub control_points: Vec<Vec3>,
    pub spline: CatmullRom3,
    /// Arc length of the spline in scene units.
    pub distance: f64,
}

impl FlightPath {
    /// Lift the great circle between the endpoints into an arc.
    ///
    /// Control point `i` of `n + 1` sits at `i / n` along the great circle, at
    /// radius `radius + sin(i * 180° / n) * max_height`: on the surface at both
    /// ends and `max_height` above it halfway.
    pub fn build(
        record: FlightRecord,
        radius: f64,
        max_height: f64,
        segments: u32,
    ) -> Result<Self, SplineError> {
        if segments < MIN_ARC_SEGMENTS {
            return Err(SplineError::TooFewSegments(segments));
        }
        let n = segments;
        let control_points: Vec<Vec3> = (0..=n)
            .map(|i| {
                let fraction = i as f64 / n as f64;
                let arc_angle = (fraction * 180.0).to_radians();
                let arc_radius = radius + arc_angle.sin() * max_height;
                let ll = lat_lng_inter_point(record.start, record.end, fraction);
                xyz_from_lat_lng(ll.lat_deg, ll.lng_deg, arc_radius)
            })
            .collect();

        let spline = CatmullRom3::centripetal(control_points.clone())?;
        let distance = spline.length();
        Ok(Self {
            record,
            control_points,
            spline,
            distance,
        })
    }

    /// Polyline through `samples` evenly spaced curve parameters.
    pub fn track_segments(&self, samples: u32) -> Vec<TrackSegment> {
        let samples = samples.max(2);
        let last = (samples - 1) as f64;
        (0..samples - 1)
            .map(|j| TrackSegment {
                start: self.spline.point(j as f64 / last),
                end: self.spline.point((j + 1) as f64 / last),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlightPaths {
    paths: Vec<FlightPath>,
}

impl FlightPaths {
    pub fn build(
        records: &[FlightRecord],
        range: FlightRange,
        radius: f64,
        config: &FlightsConfig,
    ) -> Result<Self, SplineError> {
        let paths = range
            .apply(records)
            .iter()
            .map(|record| {
                FlightPath::build(
                    *record,
                    radius,
                    config.arc_max_height,
                    config.spline_control_points,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            total = records.len(),
            shown = paths.len(),
            "built flight paths"
        );
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[FlightPath] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Every segment of every track, flight by flight.
    pub fn track_segments(&self, samples: u32) -> Vec<TrackSegment> {
        self.paths
            .iter()
            .flat_map(|p| p.track_segments(samples))
            .collect()
    }

    /// Start and end of each flight on the globe surface: `[s0, e0, s1, e1, ...]`.
    pub fn endpoint_cloud(&self, radius: f64) -> Vec<Vec3> {
        self.paths
            .iter()
            .flat_map(|p| {
                let s = p.record.start;
                let e = p.record.end;
                [
                    xyz_from_lat_lng(s.lat_deg, s.lng_deg, radius),
                    xyz_from_lat_lng(e.lat_deg, e.lng_deg, radius),
                ]
            })
            .collect()
    }
}
