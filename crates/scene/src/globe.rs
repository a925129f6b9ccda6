//! The assembled flight globe: geometry, flights and their animation state.

use foundation::math::Vec3;
use formats::FlightRecord;
use rand::Rng;
use runtime::Frame;
use thiserror::Error;
use tracing::{debug, warn};

use crate::animation::{GlobeSpin, marker_positions};
use crate::config::{ConfigError, SceneConfig};
use crate::flights::FlightPaths;
use crate::mesh::{SphereMesh, sphere_mesh};
use crate::schedule::FlightSchedule;
use crate::spline::SplineError;

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Spline(#[from] SplineError),
}

#[derive(Debug, Clone)]
pub struct GlobeScene {
    pub config: SceneConfig,
    pub globe_mesh: SphereMesh,
    /// Viewed from inside.
    pub star_mesh: SphereMesh,
    pub paths: FlightPaths,
    /// Departure and arrival of every shown flight, on the surface.
    pub endpoints: Vec<Vec3>,
    pub schedule: FlightSchedule,
    pub spin: GlobeSpin,
}

impl GlobeScene {
    pub fn new<R: Rng + ?Sized>(
        config: SceneConfig,
        records: &[FlightRecord],
        now_ms: f64,
        rng: &mut R,
    ) -> Result<Self, SceneError> {
        config.validate()?;

        let range = config.flights.range;
        if range.end.is_some_and(|end| end > records.len()) || range.start > records.len() {
            warn!(
                start = range.start,
                end = ?range.end,
                available = records.len(),
                "flight range reaches past the table, clamping"
            );
        }

        let radius = config.globe.radius;
        let globe_mesh = sphere_mesh(
            radius,
            config.globe.width_segments,
            config.globe.height_segments,
        );
        let star_mesh = sphere_mesh(
            config.stars.radius,
            config.stars.segments,
            config.stars.segments,
        );

        let paths = FlightPaths::build(records, range, radius, &config.flights)?;
        let endpoints = paths.endpoint_cloud(radius);
        let distances: Vec<f64> = paths.paths().iter().map(|p| p.distance).collect();
        let schedule = FlightSchedule::new(&distances, now_ms, &config.flights, rng);
        let spin = GlobeSpin::new(config.globe.spin_per_frame);

        debug!(
            flights = paths.len(),
            globe_triangles = globe_mesh.triangle_count(),
            star_triangles = star_mesh.triangle_count(),
            "scene ready"
        );

        Ok(Self {
            config,
            globe_mesh,
            star_mesh,
            paths,
            endpoints,
            schedule,
            spin,
        })
    }

    /// Step the animation to `frame` and return this frame's marker positions.
    ///
    /// Positions are in the globe's own frame; the spin is applied by the
    /// model matrix.
    pub fn advance<R: Rng + ?Sized>(&mut self, frame: &Frame, rng: &mut R) -> Vec<Vec3> {
        let now_ms = frame.time.as_millis();
        self.spin.advance();
        let restarted = self.schedule.reschedule_finished(now_ms, rng);
        if restarted > 0 {
            debug!(frame = frame.index, restarted, "flights departing again");
        }
        marker_positions(&self.paths, &self.schedule, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{GlobeScene, SceneError};
    use crate::config::{ConfigError, SceneConfig};
    use formats::{FlightRange, FlightRecord};
    use foundation::math::LatLng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use runtime::FrameClock;

    fn records() -> Vec<FlightRecord> {
        vec![
            FlightRecord::new(LatLng::new(51.47, -0.45), LatLng::new(40.64, -73.78)),
            FlightRecord::new(LatLng::new(35.55, 139.78), LatLng::new(-33.94, 151.18)),
            FlightRecord::new(LatLng::new(1.36, 103.99), LatLng::new(25.25, 55.36)),
        ]
    }

    #[test]
    fn builds_every_part() {
        let mut rng = SmallRng::seed_from_u64(5);
        let scene = GlobeScene::new(SceneConfig::default(), &records(), 0.0, &mut rng).unwrap();
        assert_eq!(scene.paths.len(), 3);
        assert_eq!(scene.endpoints.len(), 6);
        assert_eq!(scene.schedule.len(), 3);
        assert_eq!(scene.globe_mesh.vertex_count(), 21 * 21);
        assert_eq!(scene.star_mesh.vertex_count(), 65 * 65);
    }

    #[test]
    fn range_selects_a_slice() {
        let mut config = SceneConfig::default();
        config.flights.range = FlightRange {
            start: 1,
            end: Some(10),
        };
        let mut rng = SmallRng::seed_from_u64(5);
        let scene = GlobeScene::new(config, &records(), 0.0, &mut rng).unwrap();
        assert_eq!(scene.paths.len(), 2);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = SceneConfig::default();
        config.stars.radius = -1.0;
        let mut rng = SmallRng::seed_from_u64(5);
        let err = GlobeScene::new(config, &records(), 0.0, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            SceneError::Config(ConfigError::NotPositive {
                field: "stars.radius",
                ..
            })
        ));
    }

    #[test]
    fn advance_spins_and_moves_markers() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut scene = GlobeScene::new(SceneConfig::default(), &records(), 0.0, &mut rng).unwrap();
        let mut clock = FrameClock::new();

        let first = scene.advance(&clock.tick(0.0), &mut rng);
        assert_eq!(first.len(), 3);
        for _ in 0..99 {
            scene.advance(&clock.tick(100.0), &mut rng);
        }
        assert!((scene.spin.angle() - 100.0 * 0.0025).abs() < 1e-9);

        // Every flight has departed by the end of the jitter window.
        let later = scene.advance(&clock.tick(20_000.0), &mut rng);
        for (marker, start) in later.iter().zip(&first) {
            assert!((*marker - *start).length() > 0.0);
        }
    }

    #[test]
    fn empty_table_is_fine() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut scene = GlobeScene::new(SceneConfig::default(), &[], 0.0, &mut rng).unwrap();
        assert!(scene.paths.is_empty());
        let markers = scene.advance(&FrameClock::new().tick(16.0), &mut rng);
        assert!(markers.is_empty());
    }
}
