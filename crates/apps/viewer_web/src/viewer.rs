//! Browser-independent viewer state: scene, camera, input and frame timing.

use foundation::math::{LatLng, Vec2};
use formats::FlightRecord;
use gpu::{FramePacket, Renderer, StaticBuffers, Viewport};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use runtime::{FrameClock, FrameStats};
use scene::GlobeScene;
use scene::camera::PerspectiveCamera;
use scene::config::SceneConfig;
use scene::controls::{DragButton, OrbitControls};
use scene::picking::{ndc_from_pointer, pick_globe};

use crate::error::ViewerError;

/// Frames between two performance reports.
pub const STATS_REPORT_FRAMES: u64 = 600;

#[derive(Debug)]
pub struct Viewer {
    pub scene: GlobeScene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    viewport: Viewport,
    clock: FrameClock,
    stats: FrameStats,
    rng: SmallRng,
}

impl Viewer {
    pub fn new(
        config: SceneConfig,
        records: &[FlightRecord],
        viewport: Viewport,
        now_ms: f64,
        seed: u64,
    ) -> Result<Self, ViewerError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let camera = PerspectiveCamera::from_config(
            &config.camera,
            viewport.width as f64,
            viewport.height as f64,
        );
        let controls = OrbitControls::new(config.controls.clone(), viewport.height as f64);
        let scene = GlobeScene::new(config, records, now_ms, &mut rng)?;
        Ok(Self {
            scene,
            camera,
            controls,
            viewport,
            clock: FrameClock::new(),
            stats: FrameStats::default(),
            rng,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn static_buffers(&self) -> StaticBuffers {
        Renderer::static_buffers(&self.scene)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        self.camera
            .set_aspect(self.viewport.width as f64, self.viewport.height as f64);
        self.controls
            .set_viewport_height(self.viewport.height as f64);
    }

    pub fn pointer_down(&mut self, x_px: f64, y_px: f64, button: i16) {
        self.controls
            .on_pointer_down(Vec2::new(x_px, y_px), DragButton::from_dom_button(button));
    }

    pub fn pointer_move(&mut self, x_px: f64, y_px: f64) {
        self.controls.on_pointer_move(Vec2::new(x_px, y_px));
    }

    pub fn pointer_up(&mut self) {
        self.controls.on_pointer_up();
    }

    pub fn wheel(&mut self, delta_y: f64) {
        self.controls.on_wheel(delta_y);
    }

    /// Geographic point under the pointer, if it is over the globe.
    pub fn pick(&self, x_px: f64, y_px: f64) -> Option<LatLng> {
        let ndc = ndc_from_pointer(
            x_px,
            y_px,
            self.viewport.width as f64,
            self.viewport.height as f64,
        );
        pick_globe(
            ndc,
            &self.camera,
            self.scene.config.globe.radius,
            self.scene.spin.angle(),
        )
    }

    /// Advance one animation frame at browser time `now_ms`.
    pub fn frame(&mut self, now_ms: f64) -> FramePacket {
        let frame = self.clock.tick(now_ms);
        if frame.index > 0 {
            self.stats.record(frame.elapsed_ms);
        }
        self.controls.update(&mut self.camera);
        let markers = self.scene.advance(&frame, &mut self.rng);
        Renderer::prepare(&self.scene, &self.camera, &markers, self.viewport)
    }

    /// A summary of recent frame times, once every [`STATS_REPORT_FRAMES`].
    pub fn take_stats_report(&mut self) -> Option<String> {
        if self.stats.count >= STATS_REPORT_FRAMES {
            Some(self.stats.take_report().to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{STATS_REPORT_FRAMES, Viewer};
    use formats::FlightRecord;
    use foundation::math::LatLng;
    use gpu::Viewport;
    use scene::config::SceneConfig;

    fn viewer() -> Viewer {
        let flights = [FlightRecord::new(
            LatLng::new(51.47, -0.45),
            LatLng::new(40.64, -73.78),
        )];
        Viewer::new(SceneConfig::default(), &flights, Viewport::new(800, 600), 0.0, 42).unwrap()
    }

    #[test]
    fn frame_packets_track_the_viewport() {
        let mut v = viewer();
        let packet = v.frame(16.0);
        assert_eq!(packet.markers.len(), 1);
        assert_eq!(packet.globals.viewport[..2], [800.0, 600.0]);

        v.resize(1024, 512);
        let packet = v.frame(32.0);
        assert_eq!(packet.globals.viewport[..2], [1024.0, 512.0]);
        assert!((v.camera.aspect - 2.0).abs() < 1e-12);
    }

    #[test]
    fn drag_moves_the_camera_on_the_next_frame() {
        let mut v = viewer();
        let before = v.camera.position;
        v.pointer_down(100.0, 100.0, 0);
        v.pointer_move(160.0, 120.0);
        v.pointer_up();
        assert_eq!(v.camera.position, before);
        v.frame(16.0);
        assert_ne!(v.camera.position, before);
    }

    #[test]
    fn moves_after_release_do_not_rotate() {
        let mut released = viewer();
        let mut idle = viewer();
        for v in [&mut released, &mut idle] {
            v.pointer_down(100.0, 100.0, 0);
            v.pointer_move(160.0, 120.0);
            v.pointer_up();
        }
        released.pointer_move(400.0, 300.0);
        for t in [16.0, 32.0, 48.0] {
            released.frame(t);
            idle.frame(t);
        }
        assert_eq!(released.camera.position, idle.camera.position);
    }

    #[test]
    fn clicking_the_globe_center_picks_a_coordinate() {
        let v = viewer();
        let hit = v.pick(400.0, 300.0).unwrap();
        assert!((-90.0..=90.0).contains(&hit.lat_deg));
        assert!(v.pick(0.0, 0.0).is_none());
    }

    #[test]
    fn stats_report_keeps_long_stalls() {
        let mut v = viewer();
        v.frame(0.0);
        for i in 1..STATS_REPORT_FRAMES {
            v.frame(i as f64 * 16.0);
        }
        // A half-second hitch, well past the simulation clamp.
        let last = (STATS_REPORT_FRAMES - 1) as f64 * 16.0;
        v.frame(last + 500.0);
        let report = v.take_stats_report().unwrap();
        assert!(report.contains("max 500.00ms"), "{report}");
    }

    #[test]
    fn stats_report_after_enough_frames() {
        let mut v = viewer();
        for i in 0..=STATS_REPORT_FRAMES {
            v.frame(i as f64 * 16.0);
            if i < STATS_REPORT_FRAMES {
                assert!(v.take_stats_report().is_none());
            }
        }
        let report = v.take_stats_report().unwrap();
        assert!(report.starts_with("600 frames"), "{report}");
        assert!(v.take_stats_report().is_none());
    }
}
