use foundation::math::{
    LatLng, Vec2, Vec3, lat_lng_from_xyz, mat4_invert, mat4_transform_vector, rotate_y,
};

use crate::camera::PerspectiveCamera;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize(),
        }
    }

    pub fn at(&self, distance: f64) -> Vec3 {
        self.origin + self.dir * distance
    }

    /// Ray from the camera through a point in normalized device coordinates.
    ///
    /// The direction is built in view space and taken to world space by the
    /// inverse view matrix.
    pub fn from_camera(ndc: Vec2, camera: &PerspectiveCamera) -> Self {
        let half_height = (camera.fov_y_rad() / 2.0).tan();
        let half_width = half_height * camera.aspect;
        let view_dir = Vec3::new(ndc.x * half_width, ndc.y * half_height, -1.0);
        let dir = match mat4_invert(camera.view_matrix()) {
            Some(camera_to_world) => mat4_transform_vector(camera_to_world, view_dir),
            None => {
                camera.right() * view_dir.x + camera.screen_up() * view_dir.y + camera.forward()
            }
        };
        Self::new(camera.position, dir)
    }
}

/// Pointer position in pixels to normalized device coordinates (`y` up).
pub fn ndc_from_pointer(x_px: f64, y_px: f64, width: f64, height: f64) -> Vec2 {
    Vec2::new(
        x_px / width.max(1.0) * 2.0 - 1.0,
        -(y_px / height.max(1.0)) * 2.0 + 1.0,
    )
}

/// Distance along `ray` to the nearest hit on an origin-centered sphere.
///
/// Hits behind the ray origin are ignored; from inside the sphere this is the
/// exit point.
pub fn intersect_sphere(ray: &Ray, radius: f64) -> Option<f64> {
    let b = ray.origin.dot(ray.dir);
    let c = ray.origin.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let near = -b - root;
    let far = -b + root;
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        Some(far)
    } else {
        None
    }
}

/// Geographic coordinate under the pointer, undoing the globe's current spin.
pub fn pick_globe(
    ndc: Vec2,
    camera: &PerspectiveCamera,
    radius: f64,
    spin_angle: f64,
) -> Option<LatLng> {
    let ray = Ray::from_camera(ndc, camera);
    let distance = intersect_sphere(&ray, radius)?;
    let local = rotate_y(ray.at(distance), -spin_angle);
    Some(lat_lng_from_xyz(local))
}
