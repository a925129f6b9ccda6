//! Column-major 4x4 matrices (`m[col][row]`), laid out the way WGSL expects them.

use super::Vec3;

pub type Mat4 = [[f32; 4]; 4];

pub fn mat4_identity() -> Mat4 {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Column-major matrix multiply: `c = a * b`.
pub fn mat4_mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut c = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

/// Inverse of `m`, or `None` when it is singular.
///
/// Cofactor expansion carried out in `f64`.
pub fn mat4_invert(m: Mat4) -> Option<Mat4> {
    // Flatten column-major: a[col * 4 + row].
    let mut a = [0.0f64; 16];
    for col in 0..4 {
        for row in 0..4 {
            a[col * 4 + row] = m[col][row] as f64;
        }
    }

    let mut inv = [0.0f64; 16];
    inv[0] = a[5] * a[10] * a[15] - a[5] * a[11] * a[14] - a[9] * a[6] * a[15]
        + a[9] * a[7] * a[14] + a[13] * a[6] * a[11] - a[13] * a[7] * a[10];
    inv[4] = -a[4] * a[10] * a[15] + a[4] * a[11] * a[14] + a[8] * a[6] * a[15]
        - a[8] * a[7] * a[14] - a[12] * a[6] * a[11] + a[12] * a[7] * a[10];
    inv[8] = a[4] * a[9] * a[15] - a[4] * a[11] * a[13] - a[8] * a[5] * a[15]
        + a[8] * a[7] * a[13] + a[12] * a[5] * a[11] - a[12] * a[7] * a[9];
    inv[12] = -a[4] * a[9] * a[14] + a[4] * a[10] * a[13] + a[8] * a[5] * a[14]
        - a[8] * a[6] * a[13] - a[12] * a[5] * a[10] + a[12] * a[6] * a[9];
    inv[1] = -a[1] * a[10] * a[15] + a[1] * a[11] * a[14] + a[9] * a[2] * a[15]
        - a[9] * a[3] * a[14] - a[13] * a[2] * a[11] + a[13] * a[3] * a[10];
    inv[5] = a[0] * a[10] * a[15] - a[0] * a[11] * a[14] - a[8] * a[2] * a[15]
        + a[8] * a[3] * a[14] + a[12] * a[2] * a[11] - a[12] * a[3] * a[10];
    inv[9] = -a[0] * a[9] * a[15] + a[0] * a[11] * a[13] + a[8] * a[1] * a[15]
        - a[8] * a[3] * a[13] - a[12] * a[1] * a[11] + a[12] * a[3] * a[9];
    inv[13] = a[0] * a[9] * a[14] - a[0] * a[10] * a[13] - a[8] * a[1] * a[14]
        + a[8] * a[2] * a[13] + a[12] * a[1] * a[10] - a[12] * a[2] * a[9];
    inv[2] = a[1] * a[6] * a[15] - a[1] * a[7] * a[14] - a[5] * a[2] * a[15]
        + a[5] * a[3] * a[14] + a[13] * a[2] * a[7] - a[13] * a[3] * a[6];
    inv[6] = -a[0] * a[6] * a[15] + a[0] * a[7] * a[14] + a[4] * a[2] * a[15]
        - a[4] * a[3] * a[14] - a[12] * a[2] * a[7] + a[12] * a[3] * a[6];
    inv[10] = a[0] * a[5] * a[15] - a[0] * a[7] * a[13] - a[4] * a[1] * a[15]
        + a[4] * a[3] * a[13] + a[12] * a[1] * a[7] - a[12] * a[3] * a[5];
    inv[14] = -a[0] * a[5] * a[14] + a[0] * a[6] * a[13] + a[4] * a[1] * a[14]
        - a[4] * a[2] * a[13] - a[12] * a[1] * a[6] + a[12] * a[2] * a[5];
    inv[3] = -a[1] * a[6] * a[11] + a[1] * a[7] * a[10] + a[5] * a[2] * a[11]
        - a[5] * a[3] * a[10] - a[9] * a[2] * a[7] + a[9] * a[3] * a[6];
    inv[7] = a[0] * a[6] * a[11] - a[0] * a[7] * a[10] - a[4] * a[2] * a[11]
        + a[4] * a[3] * a[10] + a[8] * a[2] * a[7] - a[8] * a[3] * a[6];
    inv[11] = -a[0] * a[5] * a[11] + a[0] * a[7] * a[9] + a[4] * a[1] * a[11]
        - a[4] * a[3] * a[9] - a[8] * a[1] * a[7] + a[8] * a[3] * a[5];
    inv[15] = a[0] * a[5] * a[10] - a[0] * a[6] * a[9] - a[4] * a[1] * a[10]
        + a[4] * a[2] * a[9] + a[8] * a[1] * a[6] - a[8] * a[2] * a[5];

    let det = a[0] * inv[0] + a[1] * inv[4] + a[2] * inv[8] + a[3] * inv[12];
    if det.abs() < 1e-12 || !det.is_finite() {
        return None;
    }
    let inv_det = 1.0 / det;

    let mut out = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            out[col][row] = (inv[col * 4 + row] * inv_det) as f32;
        }
    }
    Some(out)
}

/// Transform a direction (`w = 0`) by `m`.
pub fn mat4_transform_vector(m: Mat4, v: Vec3) -> Vec3 {
    let v = [v.x as f32, v.y as f32, v.z as f32];
    let row = |r: usize| (m[0][r] * v[0] + m[1][r] * v[1] + m[2][r] * v[2]) as f64;
    Vec3::new(row(0), row(1), row(2))
}

/// Right-handed perspective projection with depth range `[0, 1]`.
pub fn mat4_perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
    let f = 1.0 / (0.5 * fov_y_rad).tan();
    let m00 = (f / aspect) as f32;
    let m11 = f as f32;
    let m22 = (far / (near - far)) as f32;
    let m23 = ((near * far) / (near - far)) as f32;

    [
        [m00, 0.0, 0.0, 0.0],
        [0.0, m11, 0.0, 0.0],
        [0.0, 0.0, m22, -1.0],
        [0.0, 0.0, m23, 0.0],
    ]
}

pub fn mat4_look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).normalize();
    let s = f.cross(up).normalize();
    let u = s.cross(f);

    let ex = -s.dot(eye);
    let ey = -u.dot(eye);
    let ez = f.dot(eye);

    [
        [s.x as f32, u.x as f32, (-f.x) as f32, 0.0],
        [s.y as f32, u.y as f32, (-f.y) as f32, 0.0],
        [s.z as f32, u.z as f32, (-f.z) as f32, 0.0],
        [ex as f32, ey as f32, ez as f32, 1.0],
    ]
}

/// Rotation about `+Y` by `angle_rad` (counter-clockwise seen from above).
pub fn mat4_rotation_y(angle_rad: f64) -> Mat4 {
    let (s, c) = angle_rad.sin_cos();
    let (s, c) = (s as f32, c as f32);
    [
        [c, 0.0, -s, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [s, 0.0, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Rotate `v` about `+Y`; same convention as [`mat4_rotation_y`].
pub fn rotate_y(v: Vec3, angle_rad: f64) -> Vec3 {
    let (s, c) = angle_rad.sin_cos();
    Vec3::new(c * v.x + s * v.z, v.y, -s * v.x + c * v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(m: Mat4, p: Vec3) -> Vec3 {
        let v = [p.x as f32, p.y as f32, p.z as f32, 1.0];
        let row = |r: usize| m[0][r] * v[0] + m[1][r] * v[1] + m[2][r] * v[2] + m[3][r] * v[3];
        Vec3::new(row(0) as f64, row(1) as f64, row(2) as f64)
    }

    fn assert_near_identity(m: Mat4) {
        let id = mat4_identity();
        for col in 0..4 {
            for row in 0..4 {
                assert!(
                    (m[col][row] - id[col][row]).abs() < 1e-4,
                    "m[{col}][{row}] = {}",
                    m[col][row]
                );
            }
        }
    }

    #[test]
    fn inverse_round_trips() {
        let view = mat4_look_at_rh(Vec3::new(5.0, 2.0, -5.5), Vec3::ZERO, Vec3::Y);
        let proj = mat4_perspective_rh_z0(45f64.to_radians(), 1.5, 0.1, 100.0);
        for m in [view, proj, mat4_mul(proj, view), mat4_rotation_y(1.1)] {
            let inv = mat4_invert(m).unwrap();
            assert_near_identity(mat4_mul(m, inv));
            assert_near_identity(mat4_mul(inv, m));
        }
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert_eq!(mat4_invert([[0.0; 4]; 4]), None);
        let mut flat = mat4_identity();
        flat[2] = [0.0; 4];
        assert_eq!(mat4_invert(flat), None);
    }

    #[test]
    fn inverse_view_maps_view_directions_back_to_world() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let inv = mat4_invert(mat4_look_at_rh(eye, Vec3::ZERO, Vec3::Y)).unwrap();
        let forward = mat4_transform_vector(inv, Vec3::new(0.0, 0.0, -1.0));
        assert!((forward - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn identity_is_neutral() {
        let r = mat4_rotation_y(0.3);
        assert_eq!(mat4_mul(mat4_identity(), r), r);
        assert_eq!(mat4_mul(r, mat4_identity()), r);
    }

    #[test]
    fn rotation_matrix_matches_rotate_y() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        let angle = 0.7;
        let a = apply(mat4_rotation_y(angle), p);
        let b = rotate_y(p, angle);
        assert!((a - b).length() < 1e-5);
    }

    #[test]
    fn quarter_turn_moves_plus_x_to_minus_z() {
        let p = rotate_y(Vec3::new(1.0, 0.0, 0.0), std::f64::consts::FRAC_PI_2);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn look_at_puts_target_on_negative_z() {
        let view = mat4_look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let p = apply(view, Vec3::ZERO);
        assert!((p.z + 5.0).abs() < 1e-5);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
    }

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth() {
        let proj = mat4_perspective_rh_z0(45f64.to_radians(), 1.0, 1.0, 100.0);
        let depth = |z: f32| {
            let clip_z = proj[2][2] * z + proj[3][2];
            let clip_w = proj[2][3] * z;
            clip_z / clip_w
        };
        assert!(depth(-1.0).abs() < 1e-6);
        assert!((depth(-100.0) - 1.0).abs() < 1e-6);
    }
}
