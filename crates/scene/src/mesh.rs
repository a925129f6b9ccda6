//! UV sphere geometry.

use std::f64::consts::{PI, TAU};

/// Upper bound on either segment count; keeps vertex indices well inside `u32`.
pub const MAX_SPHERE_SEGMENTS: u32 = 1024;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SphereMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// Counter-clockwise triangles when seen from outside.
    pub indices: Vec<u32>,
}

impl SphereMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Build a UV sphere of `radius` centered at the origin.
///
/// Rows run from the north pole (`v = 0`) to the south pole, columns wrap once
/// around the polar axis with a duplicated seam column. `u = 0.5` faces `+X`,
/// so an equirectangular texture centered on the prime meridian lines up with
/// `foundation::math::xyz_from_lat_lng`. Pole rows get a half-segment u
/// offset and their degenerate triangles are dropped. Segment counts are
/// clamped to `3..=MAX_SPHERE_SEGMENTS` around and `2..=MAX_SPHERE_SEGMENTS`
/// from pole to pole.
pub fn sphere_mesh(radius: f64, width_segments: u32, height_segments: u32) -> SphereMesh {
    let width = width_segments.clamp(3, MAX_SPHERE_SEGMENTS);
    let height = height_segments.clamp(2, MAX_SPHERE_SEGMENTS);
    let stride = width + 1;
    let vertex_count = stride as usize * (height as usize + 1);

    let mut mesh = SphereMesh {
        positions: Vec::with_capacity(vertex_count),
        normals: Vec::with_capacity(vertex_count),
        uvs: Vec::with_capacity(vertex_count),
        indices: Vec::with_capacity(6 * width as usize * (height as usize - 1)),
    };

    for iy in 0..=height {
        let v = iy as f64 / height as f64;
        let u_offset = if iy == 0 {
            0.5 / width as f64
        } else if iy == height {
            -0.5 / width as f64
        } else {
            0.0
        };

        let (sin_theta, cos_theta) = (v * PI).sin_cos();
        for ix in 0..=width {
            let u = ix as f64 / width as f64;
            let (sin_phi, cos_phi) = (u * TAU).sin_cos();

            let x = -cos_phi * sin_theta;
            let y = cos_theta;
            let z = sin_phi * sin_theta;

            mesh.positions.push([
                (radius * x) as f32,
                (radius * y) as f32,
                (radius * z) as f32,
            ]);
            mesh.normals.push([x as f32, y as f32, z as f32]);
            mesh.uvs.push([(u + u_offset) as f32, (1.0 - v) as f32]);
        }
    }

    for iy in 0..height {
        for ix in 0..width {
            let a = iy * stride + ix + 1;
            let b = iy * stride + ix;
            let c = (iy + 1) * stride + ix;
            let d = (iy + 1) * stride + ix + 1;

            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::{MAX_SPHERE_SEGMENTS, sphere_mesh};
    use foundation::math::{Vec3, xyz_from_lat_lng};

    fn v(p: [f32; 3]) -> Vec3 {
        Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64)
    }

    #[test]
    fn counts_match_segment_grid() {
        let mesh = sphere_mesh(1.6, 20, 20);
        assert_eq!(mesh.vertex_count(), 21 * 21);
        assert_eq!(mesh.normals.len(), mesh.vertex_count());
        assert_eq!(mesh.uvs.len(), mesh.vertex_count());
        // Pole rows contribute one triangle per column, the rest two.
        assert_eq!(mesh.triangle_count(), 2 * 20 * 20 - 2 * 20);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn vertices_lie_on_the_sphere() {
        let mesh = sphere_mesh(90.0, 16, 8);
        for p in &mesh.positions {
            assert!((v(*p).length() - 90.0).abs() < 1e-3);
        }
        for n in &mesh.normals {
            assert!((v(*n).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn segment_counts_are_clamped() {
        let mesh = sphere_mesh(1.0, 0, 0);
        assert_eq!(mesh.vertex_count(), 4 * 3);

        let mesh = sphere_mesh(1.0, 70_000, 3);
        assert_eq!(mesh.vertex_count(), (MAX_SPHERE_SEGMENTS as usize + 1) * 4);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn texture_center_faces_prime_meridian() {
        let mesh = sphere_mesh(1.0, 4, 2);
        // Equator row, middle column: u = 0.5, v = 0.5.
        let idx = 5 + 2;
        assert_eq!(mesh.uvs[idx], [0.5, 0.5]);
        let expected = xyz_from_lat_lng(0.0, 0.0, 1.0);
        assert!((v(mesh.positions[idx]) - expected).length() < 1e-6);

        // A quarter turn further east in u is 90 degrees east in longitude.
        let east = xyz_from_lat_lng(0.0, 90.0, 1.0);
        assert!((v(mesh.positions[idx + 1]) - east).length() < 1e-6);
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        let mesh = sphere_mesh(1.0, 8, 6);
        for tri in mesh.indices.chunks_exact(3) {
            let a = v(mesh.positions[tri[0] as usize]);
            let b = v(mesh.positions[tri[1] as usize]);
            let c = v(mesh.positions[tri[2] as usize]);
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) * (1.0 / 3.0);
            assert!(normal.dot(centroid) > 0.0);
        }
    }
}
