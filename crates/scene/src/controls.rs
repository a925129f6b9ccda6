//! Orbit camera controls: drag to orbit the target, right-drag to pan, wheel to dolly.
//!
//! Pointer handlers only accumulate deltas; [`OrbitControls::update`] applies
//! them to the camera once per frame.

use std::f64::consts::{PI, TAU};

use foundation::math::{Vec2, Vec3};

use crate::camera::PerspectiveCamera;
use crate::config::ControlsConfig;

/// Keeps the polar angle off the poles so `look_at` never degenerates.
const POLAR_EPSILON: f64 = 1e-6;

/// Dolly step per wheel notch at `zoom_speed = 1`.
const ZOOM_STEP: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragButton {
    #[default]
    None,
    Rotate,
    Dolly,
    Pan,
}

impl DragButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom_button(button: i16) -> Self {
        match button {
            0 => DragButton::Rotate,
            1 => DragButton::Dolly,
            2 => DragButton::Pan,
            _ => DragButton::None,
        }
    }
}

/// Camera offset from its target in spherical form (`y` up).
#[derive(Debug, Copy, Clone, PartialEq)]
struct Spherical {
    radius: f64,
    /// Polar angle from `+Y`.
    phi: f64,
    /// Azimuth around `+Y`, measured from `+Z` towards `+X`.
    theta: f64,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
            theta: v.x.atan2(v.z),
        }
    }

    fn to_offset(self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(
            self.radius * sin_phi * sin_theta,
            self.radius * cos_phi,
            self.radius * sin_phi * cos_theta,
        )
    }
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub config: ControlsConfig,
    viewport_height: f64,
    drag_button: DragButton,
    last_pos_px: Vec2,
    /// Pending azimuth and polar changes in radians.
    delta_theta: f64,
    delta_phi: f64,
    /// Pending pan in pixels.
    pan_px: Vec2,
    /// Pending radius multiplier.
    scale: f64,
}

impl OrbitControls {
    pub fn new(config: ControlsConfig, viewport_height: f64) -> Self {
        Self {
            config,
            viewport_height: viewport_height.max(1.0),
            drag_button: DragButton::None,
            last_pos_px: Vec2::default(),
            delta_theta: 0.0,
            delta_phi: 0.0,
            pan_px: Vec2::default(),
            scale: 1.0,
        }
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height.max(1.0);
    }

    pub fn drag_button(&self) -> DragButton {
        self.drag_button
    }

    pub fn on_pointer_down(&mut self, pos_px: Vec2, button: DragButton) {
        let enabled = match button {
            DragButton::Rotate => self.config.enable_rotate,
            DragButton::Pan => self.config.enable_pan,
            DragButton::Dolly => self.config.enable_zoom,
            DragButton::None => false,
        };
        self.drag_button = if enabled { button } else { DragButton::None };
        self.last_pos_px = pos_px;
    }

    pub fn on_pointer_move(&mut self, pos_px: Vec2) {
        let dx = pos_px.x - self.last_pos_px.x;
        let dy = pos_px.y - self.last_pos_px.y;
        self.last_pos_px = pos_px;

        match self.drag_button {
            DragButton::None => {}
            DragButton::Rotate => {
                // A drag across the full viewport height is one full turn.
                let speed = self.config.rotate_speed;
                self.delta_theta -= TAU * dx * speed / self.viewport_height;
                self.delta_phi -= TAU * dy * speed / self.viewport_height;
            }
            DragButton::Pan => {
                self.pan_px.x += dx * self.config.pan_speed;
                self.pan_px.y += dy * self.config.pan_speed;
            }
            DragButton::Dolly => {
                if dy > 0.0 {
                    self.dolly_out();
                } else if dy < 0.0 {
                    self.dolly_in();
                }
            }
        }
    }

    pub fn on_pointer_up(&mut self) {
        self.drag_button = DragButton::None;
    }

    /// `delta_y` is the DOM `WheelEvent.deltaY`; negative moves closer.
    pub fn on_wheel(&mut self, delta_y: f64) {
        if !self.config.enable_zoom {
            return;
        }
        if delta_y < 0.0 {
            self.dolly_in();
        } else if delta_y > 0.0 {
            self.dolly_out();
        }
    }

    fn zoom_scale(&self) -> f64 {
        ZOOM_STEP.powf(self.config.zoom_speed)
    }

    fn dolly_in(&mut self) {
        self.scale *= self.zoom_scale();
    }

    fn dolly_out(&mut self) {
        self.scale /= self.zoom_scale();
    }

    /// Apply pending input to `camera`. Returns whether it moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let pending = self.delta_theta != 0.0
            || self.delta_phi != 0.0
            || self.pan_px != Vec2::default()
            || self.scale != 1.0;
        if !pending {
            return false;
        }

        let mut offset = camera.position - camera.target;

        // Pan speed follows the visible extent at the target's depth.
        let target_distance = offset.length() * (camera.fov_y_rad() / 2.0).tan();
        let pan = camera.right() * (-2.0 * self.pan_px.x * target_distance / self.viewport_height)
            + camera.screen_up() * (2.0 * self.pan_px.y * target_distance / self.viewport_height);

        let mut spherical = Spherical::from_offset(offset);
        spherical.theta += self.delta_theta;
        spherical.phi = (spherical.phi + self.delta_phi).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        spherical.radius *= self.scale;
        spherical.radius = spherical.radius.max(self.config.min_distance);
        if let Some(max) = self.config.max_distance {
            spherical.radius = spherical.radius.min(max);
        }
        offset = spherical.to_offset();

        camera.target = camera.target + pan;
        camera.position = camera.target + offset;

        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.pan_px = Vec2::default();
        self.scale = 1.0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{DragButton, OrbitControls, Spherical};
    use crate::camera::PerspectiveCamera;
    use crate::config::{CameraConfig, ControlsConfig};
    use foundation::math::{Vec2, Vec3};

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::from_config(&CameraConfig::default(), 800.0, 600.0)
    }

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "expected {a} ~= {b}");
    }

    #[test]
    fn spherical_round_trip() {
        let v = Vec3::new(5.0, 2.0, -5.5);
        let back = Spherical::from_offset(v).to_offset();
        assert!((back - v).length() < 1e-12);
    }

    #[test]
    fn horizontal_drag_orbits_at_constant_distance() {
        let mut cam = camera();
        let before = cam.position;
        let mut controls = OrbitControls::new(ControlsConfig::default(), 600.0);

        controls.on_pointer_down(Vec2::new(100.0, 100.0), DragButton::Rotate);
        controls.on_pointer_move(Vec2::new(250.0, 100.0));
        controls.on_pointer_up();
        assert!(controls.update(&mut cam));

        assert_close(cam.position.length(), before.length(), 1e-9);
        assert_close(cam.position.y, before.y, 1e-9);
        // 150 px of a 600 px viewport is a quarter turn.
        let turned = before.x.atan2(before.z) - cam.position.x.atan2(cam.position.z);
        assert_close(turned.rem_euclid(std::f64::consts::TAU), std::f64::consts::FRAC_PI_2, 1e-9);
        assert!(!controls.update(&mut cam));
    }

    #[test]
    fn vertical_drag_stops_short_of_the_pole() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(ControlsConfig::default(), 600.0);
        controls.on_pointer_down(Vec2::new(0.0, 0.0), DragButton::Rotate);
        controls.on_pointer_move(Vec2::new(0.0, 5_000.0));
        controls.update(&mut cam);

        let dir = cam.position.normalize();
        assert!(dir.y > 0.999_999);
        assert!(dir.y < 1.0);
        assert!(cam.right().length() > 0.5);
    }

    #[test]
    fn wheel_is_ignored_unless_zoom_is_enabled() {
        let mut cam = camera();
        let before = cam.position;
        let mut controls = OrbitControls::new(ControlsConfig::default(), 600.0);
        controls.on_wheel(-100.0);
        assert!(!controls.update(&mut cam));
        assert_eq!(cam.position, before);

        let mut zooming = OrbitControls::new(
            ControlsConfig {
                enable_zoom: true,
                min_distance: 7.0,
                ..ControlsConfig::default()
            },
            600.0,
        );
        zooming.on_wheel(-100.0);
        zooming.update(&mut cam);
        assert_close(cam.position.length(), before.length() * 0.95, 1e-9);

        for _ in 0..50 {
            zooming.on_wheel(-100.0);
        }
        zooming.update(&mut cam);
        assert_close(cam.position.length(), 7.0, 1e-9);
    }

    #[test]
    fn pan_moves_target_and_camera_together() {
        let mut cam = camera();
        let offset_before = cam.position - cam.target;
        let mut controls = OrbitControls::new(ControlsConfig::default(), 600.0);
        controls.on_pointer_down(Vec2::new(300.0, 300.0), DragButton::Pan);
        controls.on_pointer_move(Vec2::new(360.0, 300.0));
        controls.update(&mut cam);

        assert!(cam.target.length() > 0.0);
        assert!((cam.position - cam.target - offset_before).length() < 1e-9);
        // Dragging right drags the scene right, so the target moves left.
        assert!(cam.target.dot(cam.right()) < 0.0);
    }

    #[test]
    fn disabled_buttons_do_nothing() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(
            ControlsConfig {
                enable_rotate: false,
                ..ControlsConfig::default()
            },
            600.0,
        );
        controls.on_pointer_down(Vec2::new(0.0, 0.0), DragButton::Rotate);
        assert_eq!(controls.drag_button(), DragButton::None);
        controls.on_pointer_move(Vec2::new(50.0, 50.0));
        assert!(!controls.update(&mut cam));
        assert_eq!(DragButton::from_dom_button(2), DragButton::Pan);
    }
}
