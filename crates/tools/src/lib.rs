//! Offline inspection and export of flight tables.

use std::fmt;

use foundation::math::central_angle;
use formats::{FlightRange, FlightRecord};
use scene::config::SceneConfig;
use scene::flights::FlightPaths;
use scene::schedule::flight_duration_ms;
use scene::spline::SplineError;
use serde::Serialize;

/// One row of `flightglobe inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightSummary {
    /// Row in the full flight table.
    pub index: usize,
    pub record: FlightRecord,
    pub angle_deg: f64,
    pub arc_length: f64,
    pub duration_ms: f64,
}

impl fmt::Display for FlightSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.record.start;
        let e = self.record.end;
        write!(
            f,
            "{:>5}  {:>8.3} {:>9.3} -> {:>8.3} {:>9.3}  {:>7.2}°  {:>7.4}  {:>9.0} ms",
            self.index,
            s.lat_deg,
            s.lng_deg,
            e.lat_deg,
            e.lng_deg,
            self.angle_deg,
            self.arc_length,
            self.duration_ms
        )
    }
}

pub fn build_paths(
    records: &[FlightRecord],
    range: FlightRange,
    config: &SceneConfig,
) -> Result<FlightPaths, SplineError> {
    FlightPaths::build(records, range, config.globe.radius, &config.flights)
}

pub fn summarize(
    records: &[FlightRecord],
    range: FlightRange,
    config: &SceneConfig,
) -> Result<Vec<FlightSummary>, SplineError> {
    let first = range.resolve(records.len()).start;
    let paths = build_paths(records, range, config)?;
    Ok(paths
        .paths()
        .iter()
        .enumerate()
        .map(|(i, path)| FlightSummary {
            index: first + i,
            record: path.record,
            angle_deg: central_angle(path.record.start, path.record.end).to_degrees(),
            arc_length: path.distance,
            duration_ms: flight_duration_ms(path.distance, &config.flights),
        })
        .collect())
}

/// Sampled geometry of one flight, as written by `flightglobe export`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackExport {
    pub index: usize,
    pub record: FlightRecord,
    pub control_points: Vec<[f64; 3]>,
    pub track: Vec<[f64; 3]>,
}

pub fn export_tracks(
    records: &[FlightRecord],
    range: FlightRange,
    config: &SceneConfig,
    samples: u32,
) -> Result<Vec<TrackExport>, SplineError> {
    let first = range.resolve(records.len()).start;
    let paths = build_paths(records, range, config)?;
    let samples = samples.max(2);
    let last = (samples - 1) as f64;
    Ok(paths
        .paths()
        .iter()
        .enumerate()
        .map(|(i, path)| TrackExport {
            index: first + i,
            record: path.record,
            control_points: path
                .control_points
                .iter()
                .map(|p| [p.x, p.y, p.z])
                .collect(),
            track: (0..samples)
                .map(|j| {
                    let p = path.spline.point(j as f64 / last);
                    [p.x, p.y, p.z]
                })
                .collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{export_tracks, summarize};
    use formats::{FlightRange, FlightRecord};
    use foundation::math::LatLng;
    use pretty_assertions::assert_eq;
    use scene::config::SceneConfig;

    fn flights() -> Vec<FlightRecord> {
        vec![
            FlightRecord::new(LatLng::new(0.0, 0.0), LatLng::new(0.0, 90.0)),
            FlightRecord::new(LatLng::new(51.47, -0.45), LatLng::new(40.64, -73.78)),
            FlightRecord::new(LatLng::new(-33.94, 151.18), LatLng::new(1.36, 103.99)),
        ]
    }

    #[test]
    fn summary_rows_keep_table_indices() {
        let config = SceneConfig::default();
        let range: FlightRange = "1..".parse().unwrap();
        let rows = summarize(&flights(), range, &config).unwrap();
        assert_eq!(rows.iter().map(|r| r.index).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn summary_measures_the_arc() {
        let config = SceneConfig::default();
        let rows = summarize(&flights(), FlightRange::all(), &config).unwrap();
        let quarter = &rows[0];
        assert!((quarter.angle_deg - 90.0).abs() < 1e-9);
        // The lifted arc is longer than the surface distance.
        let surface = config.globe.radius * std::f64::consts::FRAC_PI_2;
        assert!(quarter.arc_length > surface);
        assert!(quarter.duration_ms > 0.0);
        assert!(quarter.to_string().contains("90.00°"));
    }

    #[test]
    fn export_samples_each_track() {
        let config = SceneConfig::default();
        let tracks = export_tracks(&flights(), "..1".parse().unwrap(), &config, 5).unwrap();
        assert_eq!(tracks.len(), 1);
        let track = &tracks[0];
        assert_eq!(track.track.len(), 5);
        assert_eq!(
            track.control_points.len(),
            config.flights.spline_control_points as usize + 1
        );
        for (a, b) in track.track[0].iter().zip(track.control_points[0]) {
            assert!((a - b).abs() < 1e-9);
        }

        let json = serde_json::to_value(&tracks).unwrap();
        assert_eq!(json[0]["index"], 0);
        assert!(json[0]["track"].as_array().is_some());
    }
}
