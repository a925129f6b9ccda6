use serde::{Deserialize, Serialize};

use super::Vec3;

/// Geographic coordinate in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat_deg: f64,
    pub lng_deg: f64,
}

impl LatLng {
    pub fn new(lat_deg: f64, lng_deg: f64) -> Self {
        Self { lat_deg, lng_deg }
    }
}

/// Scene-space position of a geographic coordinate on a sphere of `radius`.
///
/// North is `+Y` and `(0, 0)` lands on `+X`. Longitude grows towards `-Z`, which
/// lines up with the equirectangular texture mapping of the globe mesh.
pub fn xyz_from_lat_lng(lat_deg: f64, lng_deg: f64, radius: f64) -> Vec3 {
    let phi = (90.0 - lat_deg).to_radians();
    let theta = (360.0 - lng_deg).to_radians();

    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Inverse of [`xyz_from_lat_lng`]; the radius is discarded.
///
/// Longitude is normalized to `(-180, 180]`.
pub fn lat_lng_from_xyz(p: Vec3) -> LatLng {
    let r = p.length();
    if r <= 0.0 {
        return LatLng::default();
    }
    let lat = (p.y / r).clamp(-1.0, 1.0).asin().to_degrees();
    let mut lng = -p.z.atan2(p.x).to_degrees();
    if lng <= -180.0 {
        lng += 360.0;
    }
    LatLng::new(lat, lng)
}

/// Great-circle angular distance between two coordinates (radians).
pub fn central_angle(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat_deg.to_radians();
    let lng1 = a.lng_deg.to_radians();
    let lat2 = b.lat_deg.to_radians();
    let lng2 = b.lng_deg.to_radians();

    let h = ((lat1 - lat2) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lng1 - lng2) / 2.0).sin().powi(2);
    2.0 * h.sqrt().clamp(0.0, 1.0).asin()
}

/// Point at `fraction` of the way along the great circle from `a` to `b`.
///
/// Coincident endpoints return `a`. Antipodal endpoints have no unique great
/// circle; those fall back to interpolating latitude and longitude linearly.
pub fn lat_lng_inter_point(a: LatLng, b: LatLng, fraction: f64) -> LatLng {
    let d = central_angle(a, b);
    if d <= 1e-12 {
        return a;
    }
    let sin_d = d.sin();
    if sin_d.abs() <= 1e-12 {
        return LatLng::new(
            a.lat_deg + (b.lat_deg - a.lat_deg) * fraction,
            a.lng_deg + (b.lng_deg - a.lng_deg) * fraction,
        );
    }

    let lat1 = a.lat_deg.to_radians();
    let lng1 = a.lng_deg.to_radians();
    let lat2 = b.lat_deg.to_radians();
    let lng2 = b.lng_deg.to_radians();

    let wa = ((1.0 - fraction) * d).sin() / sin_d;
    let wb = (fraction * d).sin() / sin_d;
    let x = wa * lat1.cos() * lng1.cos() + wb * lat2.cos() * lng2.cos();
    let y = wa * lat1.cos() * lng1.sin() + wb * lat2.cos() * lng2.sin();
    let z = wa * lat1.sin() + wb * lat2.sin();

    LatLng::new(
        z.atan2((x * x + y * y).sqrt()).to_degrees(),
        y.atan2(x).to_degrees(),
    )
}

#[cfg(test)]
mod tests {
    use super::{LatLng, central_angle, lat_lng_from_xyz, lat_lng_inter_point, xyz_from_lat_lng};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn equator_prime_meridian_is_plus_x() {
        let p = xyz_from_lat_lng(0.0, 0.0, 2.0);
        assert_close(p.x, 2.0, 1e-12);
        assert_close(p.y, 0.0, 1e-12);
        assert_close(p.z, 0.0, 1e-12);
    }

    #[test]
    fn north_pole_is_plus_y_and_east_is_minus_z() {
        let pole = xyz_from_lat_lng(90.0, 0.0, 1.0);
        assert_close(pole.y, 1.0, 1e-12);

        let east = xyz_from_lat_lng(0.0, 90.0, 1.0);
        assert_close(east.x, 0.0, 1e-12);
        assert_close(east.z, -1.0, 1e-12);
    }

    #[test]
    fn lat_lng_round_trips_through_xyz() {
        let p = xyz_from_lat_lng(51.47, -0.45, 1.6);
        let ll = lat_lng_from_xyz(p);
        assert_close(ll.lat_deg, 51.47, 1e-9);
        assert_close(ll.lng_deg, -0.45, 1e-9);
        assert_close(p.length(), 1.6, 1e-12);
    }

    #[test]
    fn central_angle_quarter_turn() {
        let a = LatLng::new(0.0, 0.0);
        let b = LatLng::new(0.0, 90.0);
        assert_close(central_angle(a, b), std::f64::consts::FRAC_PI_2, 1e-12);
        assert_close(central_angle(a, a), 0.0, 1e-12);
    }

    #[test]
    fn inter_point_hits_endpoints_and_midpoint() {
        let a = LatLng::new(0.0, 0.0);
        let b = LatLng::new(0.0, 90.0);

        let start = lat_lng_inter_point(a, b, 0.0);
        assert_close(start.lat_deg, 0.0, 1e-9);
        assert_close(start.lng_deg, 0.0, 1e-9);

        let mid = lat_lng_inter_point(a, b, 0.5);
        assert_close(mid.lat_deg, 0.0, 1e-9);
        assert_close(mid.lng_deg, 45.0, 1e-9);

        let end = lat_lng_inter_point(a, b, 1.0);
        assert_close(end.lng_deg, 90.0, 1e-9);
    }

    #[test]
    fn inter_point_of_meridian_arc_bulges_through_pole() {
        let a = LatLng::new(45.0, 0.0);
        let b = LatLng::new(45.0, 180.0);
        let mid = lat_lng_inter_point(a, b, 0.5);
        assert_close(mid.lat_deg, 90.0, 1e-6);
    }

    #[test]
    fn coincident_and_antipodal_endpoints_stay_finite() {
        let a = LatLng::new(10.0, 20.0);
        assert_eq!(lat_lng_inter_point(a, a, 0.3), a);

        let p = lat_lng_inter_point(LatLng::new(0.0, 0.0), LatLng::new(0.0, 180.0), 0.5);
        assert!(p.lat_deg.is_finite() && p.lng_deg.is_finite());
    }
}
