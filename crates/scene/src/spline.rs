//! Open Catmull-Rom curves through 3D control points.

use foundation::math::Vec3;
use thiserror::Error;

/// Divisions used to tabulate arc length.
pub const ARC_LENGTH_DIVISIONS: usize = 200;

/// Fewest spline segments a flight arc may be split into.
pub const MIN_ARC_SEGMENTS: u32 = 2;

#[derive(Debug, Error, PartialEq)]
pub enum SplineError {
    #[error("a spline needs at least 2 control points, got {0}")]
    TooFewPoints(usize),
    #[error("an arc needs at least 2 spline segments, got {0}")]
    TooFewSegments(u32),
}

/// Knot parameterization.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum CurveKind {
    /// Knot spacing `|Δ|^0.5`; never forms cusps or self-intersections.
    #[default]
    Centripetal,
    /// Knot spacing `|Δ|`.
    Chordal,
    Uniform {
        tension: f64,
    },
}

/// One axis of a cubic segment: `c0 + c1 t + c2 t² + c3 t³`.
#[derive(Debug, Copy, Clone)]
struct Cubic {
    c0: f64,
    c1: f64,
    c2: f64,
    c3: f64,
}

impl Cubic {
    fn hermite(x0: f64, x1: f64, t0: f64, t1: f64) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    fn uniform(x0: f64, x1: f64, x2: f64, x3: f64, tension: f64) -> Self {
        Self::hermite(x1, x2, tension * (x2 - x0), tension * (x3 - x1))
    }

    fn non_uniform(x0: f64, x1: f64, x2: f64, x3: f64, dt0: f64, dt1: f64, dt2: f64) -> Self {
        let t1 = ((x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1) * dt1;
        let t2 = ((x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2) * dt1;
        Self::hermite(x1, x2, t1, t2)
    }

    fn eval(&self, t: f64) -> f64 {
        let t2 = t * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t2 * t
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatmullRom3 {
    points: Vec<Vec3>,
    kind: CurveKind,
    /// Cumulative length at `i / ARC_LENGTH_DIVISIONS`.
    arc_lengths: Vec<f64>,
}

impl CatmullRom3 {
    pub fn new(points: Vec<Vec3>, kind: CurveKind) -> Result<Self, SplineError> {
        if points.len() < 2 {
            return Err(SplineError::TooFewPoints(points.len()));
        }
        let mut curve = Self {
            points,
            kind,
            arc_lengths: Vec::new(),
        };
        curve.arc_lengths = curve.lengths(ARC_LENGTH_DIVISIONS);
        Ok(curve)
    }

    pub fn centripetal(points: Vec<Vec3>) -> Result<Self, SplineError> {
        Self::new(points, CurveKind::Centripetal)
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    /// Position at curve parameter `t` in `[0, 1]`.
    ///
    /// `t` is spread evenly over the control-point intervals, so equal steps
    /// in `t` are not equal steps in distance; see [`CatmullRom3::point_at`].
    pub fn point(&self, t: f64) -> Vec3 {
        let pts = &self.points;
        let l = pts.len();

        let p = (l - 1) as f64 * t.clamp(0.0, 1.0);
        let mut seg = p.floor() as usize;
        let mut weight = p - seg as f64;
        if seg >= l - 1 {
            seg = l - 2;
            weight = 1.0;
        }

        // Phantom end points mirror the neighbouring interval.
        let p0 = if seg > 0 {
            pts[seg - 1]
        } else {
            pts[0] + (pts[0] - pts[1])
        };
        let p1 = pts[seg];
        let p2 = pts[seg + 1];
        let p3 = if seg + 2 < l {
            pts[seg + 2]
        } else {
            pts[l - 1] + (pts[l - 1] - pts[l - 2])
        };

        let cubic = |x0: f64, x1: f64, x2: f64, x3: f64| -> Cubic {
            match self.kind {
                CurveKind::Uniform { tension } => Cubic::uniform(x0, x1, x2, x3, tension),
                CurveKind::Centripetal | CurveKind::Chordal => {
                    let pow = if matches!(self.kind, CurveKind::Chordal) {
                        0.5
                    } else {
                        0.25
                    };
                    let mut dt0 = p0.distance_squared(p1).powf(pow);
                    let mut dt1 = p1.distance_squared(p2).powf(pow);
                    let mut dt2 = p2.distance_squared(p3).powf(pow);
                    if dt1 < 1e-4 {
                        dt1 = 1.0;
                    }
                    if dt0 < 1e-4 {
                        dt0 = dt1;
                    }
                    if dt2 < 1e-4 {
                        dt2 = dt1;
                    }
                    Cubic::non_uniform(x0, x1, x2, x3, dt0, dt1, dt2)
                }
            }
        };

        Vec3::new(
            cubic(p0.x, p1.x, p2.x, p3.x).eval(weight),
            cubic(p0.y, p1.y, p2.y, p3.y).eval(weight),
            cubic(p0.z, p1.z, p2.z, p3.z).eval(weight),
        )
    }

    /// Cumulative chord lengths over `divisions` equal parameter steps.
    pub fn lengths(&self, divisions: usize) -> Vec<f64> {
        let divisions = divisions.max(1);
        let mut out = Vec::with_capacity(divisions + 1);
        let mut last = self.point(0.0);
        let mut sum = 0.0;
        out.push(0.0);
        for i in 1..=divisions {
            let current = self.point(i as f64 / divisions as f64);
            sum += current.distance(last);
            out.push(sum);
            last = current;
        }
        out
    }

    pub fn length(&self) -> f64 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Curve parameter at arc-length fraction `u`.
    pub fn u_to_t(&self, u: f64) -> f64 {
        let u = u.clamp(0.0, 1.0);
        let lengths = &self.arc_lengths;
        let total = self.length();
        let n = lengths.len() - 1;
        if total <= 0.0 {
            return u;
        }

        let target = u * total;
        let idx = lengths.partition_point(|&len| len < target);
        if idx < lengths.len() && lengths[idx] == target {
            return idx as f64 / n as f64;
        }
        if idx == 0 {
            return 0.0;
        }
        if idx >= lengths.len() {
            return 1.0;
        }

        let i = idx - 1;
        let before = lengths[i];
        let segment = lengths[i + 1] - before;
        let fraction = if segment > 0.0 {
            (target - before) / segment
        } else {
            0.0
        };
        (i as f64 + fraction) / n as f64
    }

    /// Position at arc-length fraction `u`, for constant-speed motion.
    pub fn point_at(&self, u: f64) -> Vec3 {
        self.point(self.u_to_t(u))
    }
}

#[cfg(test)]
mod tests {
    use super::{CatmullRom3, CurveKind, SplineError};
    use foundation::math::Vec3;

    fn assert_vec_close(a: Vec3, b: Vec3, eps: f64) {
        let diff = (a - b).length();
        assert!(diff <= eps, "expected {a:?} ~= {b:?} (diff {diff})");
    }

    fn arc() -> Vec<Vec3> {
        (0..=8)
            .map(|i| {
                let a = i as f64 * std::f64::consts::PI / 8.0;
                Vec3::new(a.cos(), a.sin(), 0.0)
            })
            .collect()
    }

    #[test]
    fn rejects_single_point() {
        assert_eq!(
            CatmullRom3::centripetal(vec![Vec3::ZERO]).unwrap_err(),
            SplineError::TooFewPoints(1)
        );
    }

    #[test]
    fn passes_through_control_points() {
        for kind in [
            CurveKind::Centripetal,
            CurveKind::Chordal,
            CurveKind::Uniform { tension: 0.5 },
        ] {
            let points = arc();
            let curve = CatmullRom3::new(points.clone(), kind).unwrap();
            for (i, p) in points.iter().enumerate() {
                let t = i as f64 / (points.len() - 1) as f64;
                assert_vec_close(curve.point(t), *p, 1e-9);
            }
        }
    }

    #[test]
    fn two_points_give_a_straight_line() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(2.0, 0.0, 0.0);
        let curve = CatmullRom3::centripetal(vec![a, b]).unwrap();
        assert_vec_close(curve.point(0.5), Vec3::new(1.0, 0.0, 0.0), 1e-9);
        assert!((curve.length() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn length_of_half_circle_is_close_to_pi() {
        let curve = CatmullRom3::centripetal(arc()).unwrap();
        assert!((curve.length() - std::f64::consts::PI).abs() < 1e-2);
    }

    #[test]
    fn point_at_is_arc_length_parameterized() {
        // Uneven spacing: the parameter midpoint is not the distance midpoint.
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
        ];
        let curve = CatmullRom3::centripetal(points).unwrap();
        let mid = curve.point_at(0.5);
        assert!((mid.x - 5.0).abs() < 0.1, "mid {mid:?}");
        assert_vec_close(curve.point_at(0.0), Vec3::new(0.0, 0.0, 0.0), 1e-9);
        assert_vec_close(curve.point_at(1.0), Vec3::new(10.0, 0.0, 0.0), 1e-9);
    }

    #[test]
    fn u_to_t_is_monotonic_and_clamped() {
        let curve = CatmullRom3::centripetal(arc()).unwrap();
        let mut last = -1.0;
        for i in 0..=50 {
            let t = curve.u_to_t(i as f64 / 50.0);
            assert!(t >= last);
            last = t;
        }
        assert_eq!(curve.u_to_t(-1.0), 0.0);
        assert_eq!(curve.u_to_t(2.0), 1.0);
    }

    #[test]
    fn repeated_points_stay_finite() {
        let p = Vec3::new(1.0, 1.0, 1.0);
        let curve = CatmullRom3::centripetal(vec![p, p, p]).unwrap();
        let q = curve.point_at(0.3);
        assert!(q.x.is_finite() && q.y.is_finite() && q.z.is_finite());
        assert_eq!(curve.length(), 0.0);
    }
}
