use foundation::math::{Mat4, Vec3, mat4_look_at_rh, mat4_mul, mat4_perspective_rh_z0};

use crate::config::CameraConfig;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_deg: f64,
    /// Viewport width over height.
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl PerspectiveCamera {
    pub fn from_config(config: &CameraConfig, width: f64, height: f64) -> Self {
        let mut camera = Self {
            position: config.position,
            target: config.target,
            up: Vec3::Y,
            fov_y_deg: config.fov_y_deg,
            aspect: 1.0,
            near: config.near,
            far: config.far,
        };
        camera.set_aspect(width, height);
        camera
    }

    /// Match the projection to a resized viewport.
    pub fn set_aspect(&mut self, width: f64, height: f64) {
        self.aspect = width.max(1.0) / height.max(1.0);
    }

    pub fn fov_y_rad(&self) -> f64 {
        self.fov_y_deg.to_radians()
    }

    /// Unit vector from the camera towards its target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Screen-right in world space.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    /// Screen-up in world space (orthogonal to `forward` and `right`).
    pub fn screen_up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn view_matrix(&self) -> Mat4 {
        mat4_look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        mat4_perspective_rh_z0(self.fov_y_rad(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        mat4_mul(self.projection_matrix(), self.view_matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::PerspectiveCamera;
    use crate::config::CameraConfig;
    use foundation::math::Vec3;

    fn clip(m: [[f32; 4]; 4], p: Vec3) -> [f32; 4] {
        let v = [p.x as f32, p.y as f32, p.z as f32, 1.0];
        let mut out = [0.0f32; 4];
        for (row, o) in out.iter_mut().enumerate() {
            *o = (0..4).map(|col| m[col][row] * v[col]).sum();
        }
        out
    }

    #[test]
    fn default_camera_frames_the_origin() {
        let camera = PerspectiveCamera::from_config(&CameraConfig::default(), 1600.0, 900.0);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-12);

        let c = clip(camera.view_proj(), Vec3::ZERO);
        assert!((c[0] / c[3]).abs() < 1e-5);
        assert!((c[1] / c[3]).abs() < 1e-5);
        let depth = c[2] / c[3];
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn basis_is_orthonormal() {
        let camera = PerspectiveCamera::from_config(&CameraConfig::default(), 800.0, 600.0);
        let (f, r, u) = (camera.forward(), camera.right(), camera.screen_up());
        assert!(f.dot(r).abs() < 1e-12);
        assert!(f.dot(u).abs() < 1e-12);
        assert!((r.length() - 1.0).abs() < 1e-12);
        assert!(u.y > 0.0);
    }

    #[test]
    fn zero_sized_viewport_keeps_a_finite_aspect() {
        let mut camera = PerspectiveCamera::from_config(&CameraConfig::default(), 800.0, 600.0);
        camera.set_aspect(0.0, 0.0);
        assert_eq!(camera.aspect, 1.0);
    }
}
