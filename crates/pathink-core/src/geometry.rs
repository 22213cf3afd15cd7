//! Geometry primitives for closest-point queries and direction constraints.

use kurbo::{CubicBez, ParamCurve, ParamCurveDeriv, Point, Vec2};
use std::f64::consts::{FRAC_PI_4, TAU};

/// Default number of uniform samples for [`closest_point_on_cubic_bezier`].
pub const DEFAULT_BEZIER_SAMPLES: usize = 50;

/// Maximum Newton refinement steps after coarse sampling.
const NEWTON_ITERATIONS: usize = 5;

/// Lower bound for the derivative magnitude and the Newton step size.
const NEWTON_EPSILON: f64 = 1e-4;

/// Below this length a vector is treated as zero.
const ZERO_LENGTH: f64 = 1e-12;

/// Result of a closest-point query on a curve or segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    /// The closest point on the curve.
    pub point: Point,
    /// Curve parameter of `point`, always in `[0, 1]`.
    pub t: f64,
    /// Euclidean distance from the query point to `point`.
    pub distance: f64,
}

/// Find the closest point on the segment `start..end`.
///
/// The projection parameter is clamped to the segment, so points beyond either
/// end map onto that endpoint. A zero-length segment returns `start` with `t = 0`.
pub fn closest_point_on_line_segment(point: Point, start: Point, end: Point) -> ClosestPoint {
    let seg = end - start;
    let len_sq = seg.hypot2();
    if len_sq < ZERO_LENGTH {
        return ClosestPoint {
            point: start,
            t: 0.0,
            distance: (point - start).hypot(),
        };
    }

    let t = ((point - start).dot(seg) / len_sq).clamp(0.0, 1.0);
    let closest = start + seg * t;
    ClosestPoint {
        point: closest,
        t,
        distance: (point - closest).hypot(),
    }
}

/// Find the closest point on the cubic Bézier `p0, p1, p2, p3`.
///
/// The curve is first sampled uniformly at `samples` steps (at least one) to
/// find a coarse minimum, then refined with up to five Newton iterations.
/// A curve collapsed to one point returns that point with `t = 0`.
pub fn closest_point_on_cubic_bezier(
    point: Point,
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    samples: usize,
) -> ClosestPoint {
    if p0 == p1 && p0 == p2 && p0 == p3 {
        return ClosestPoint {
            point: p0,
            t: 0.0,
            distance: (point - p0).hypot(),
        };
    }

    let curve = CubicBez::new(p0, p1, p2, p3);
    let samples = samples.max(1);

    let mut best_t = 0.0;
    let mut best_dist_sq = f64::INFINITY;
    for i in 0..=samples {
        let t = i as f64 / samples as f64;
        let dist_sq = (curve.eval(t) - point).hypot2();
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best_t = t;
            if dist_sq == 0.0 {
                return ClosestPoint {
                    point: curve.eval(t),
                    t,
                    distance: 0.0,
                };
            }
        }
    }

    let deriv = curve.deriv();
    let mut t = best_t;
    for _ in 0..NEWTON_ITERATIONS {
        let d = curve.eval(t) - point;
        let d_prime = deriv.eval(t).to_vec2();
        let denom = d_prime.hypot2();
        if denom < NEWTON_EPSILON {
            break;
        }
        let step = d.dot(d_prime) / denom;
        t = (t - step).clamp(0.0, 1.0);
        if step.abs() < NEWTON_EPSILON {
            break;
        }
    }

    // Refinement can overshoot on strongly curved spans; keep the better estimate.
    let refined_dist_sq = (curve.eval(t) - point).hypot2();
    if refined_dist_sq > best_dist_sq {
        t = best_t;
    }

    let closest = curve.eval(t);
    ClosestPoint {
        point: closest,
        t,
        distance: (closest - point).hypot(),
    }
}

/// Normalize an angle in radians to `[0, 2π)`.
pub fn normalize_angle(radians: f64) -> f64 {
    let wrapped = radians.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Snap an angle in degrees to the nearest multiple of `increment`.
/// Returns the snapped angle normalized to `[0, 360)`.
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    if increment <= 0.0 {
        return angle_degrees.rem_euclid(360.0);
    }
    let snapped = (angle_degrees / increment).round() * increment;
    let normalized = snapped.rem_euclid(360.0);
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Constrain `point` so the vector from `start` lies on one of the eight
/// directions at 45° increments, preserving its length.
///
/// A zero-length vector returns `point` unchanged.
pub fn constrain_to_cardinal_and_diagonal(start: Point, point: Point) -> Point {
    let v = point - start;
    let length = v.hypot();
    if length < ZERO_LENGTH {
        return point;
    }

    let angle = (v.atan2() / FRAC_PI_4).round() * FRAC_PI_4;
    start + Vec2::from_angle(angle) * length
}

/// Intersection point of segments `a0..a1` and `b0..b1`, if they cross.
///
/// Parallel, collinear, and degenerate segments return `None`.
pub fn line_segment_intersection(a0: Point, a1: Point, b0: Point, b1: Point) -> Option<Point> {
    let r = a1 - a0;
    let s = b1 - b0;
    let denom = r.cross(s);
    if denom.abs() < ZERO_LENGTH {
        return None;
    }

    let qp = b0 - a0;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a0 + r * t)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn assert_point_eq(a: Point, b: Point, eps: f64) {
        assert!((a.x - b.x).abs() < eps && (a.y - b.y).abs() < eps, "{a:?} != {b:?}");
    }

    #[test]
    fn test_segment_projection_inside() {
        let r = closest_point_on_line_segment(
            Point::new(4.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert_point_eq(r.point, Point::new(4.0, 0.0), 1e-12);
        assert!((r.t - 0.4).abs() < 1e-12);
        assert!((r.distance - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_segment_clamps_past_end() {
        let r = closest_point_on_line_segment(
            Point::new(20.0, 2.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert_eq!(r.point, Point::new(10.0, 0.0));
        assert!((r.t - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_segment_clamps_before_start() {
        let r = closest_point_on_line_segment(
            Point::new(-5.0, 1.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert_eq!(r.point, Point::new(0.0, 0.0));
        assert!(r.t.abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_length_segment() {
        let p = Point::new(3.0, 4.0);
        let r = closest_point_on_line_segment(p, Point::ZERO, Point::ZERO);
        assert_eq!(r.point, Point::ZERO);
        assert!((r.distance - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_bezier_point_on_sample() {
        let (p0, p1, p2, p3) = (
            Point::new(0.0, 0.0),
            Point::new(30.0, 100.0),
            Point::new(70.0, -50.0),
            Point::new(100.0, 0.0),
        );
        let target = CubicBez::new(p0, p1, p2, p3).eval(0.3);
        let r = closest_point_on_cubic_bezier(target, p0, p1, p2, p3, 50);
        assert!(r.distance < 1e-6);
        assert!((r.t - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_bezier_refines_between_samples() {
        let (p0, p1, p2, p3) = (
            Point::new(0.0, 0.0),
            Point::new(0.0, 50.0),
            Point::new(100.0, 50.0),
            Point::new(100.0, 0.0),
        );
        let curve = CubicBez::new(p0, p1, p2, p3);
        let on_curve = curve.eval(0.537);
        // Coarse sampling with 10 steps puts the estimate at 0.5.
        let r = closest_point_on_cubic_bezier(on_curve, p0, p1, p2, p3, 10);
        assert!(r.distance < 1e-2, "distance {}", r.distance);
    }

    #[test]
    fn test_bezier_clamps_t() {
        let r = closest_point_on_cubic_bezier(
            Point::new(-50.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 0.0),
            DEFAULT_BEZIER_SAMPLES,
        );
        assert!(r.t.abs() < f64::EPSILON);
        assert_point_eq(r.point, Point::new(0.0, 0.0), 1e-12);
        assert!((r.distance - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_bezier_degenerate_curve() {
        let p = Point::new(5.0, 5.0);
        let r = closest_point_on_cubic_bezier(Point::new(8.0, 9.0), p, p, p, p, 20);
        assert_eq!(r.point, p);
        assert!(r.t.abs() < f64::EPSILON);
        assert!((r.distance - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(-PI / 2.0) - 3.0 * PI / 2.0).abs() < 1e-12);
        assert!((normalize_angle(5.0 * PI) - PI).abs() < 1e-12);
        assert!(normalize_angle(TAU).abs() < 1e-12);
        assert!((normalize_angle(1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_snap_angle() {
        assert!((snap_angle(7.0, 15.0) - 0.0).abs() < 0.01);
        assert!((snap_angle(8.0, 15.0) - 15.0).abs() < 0.01);
        assert!((snap_angle(359.0, 15.0) - 0.0).abs() < 0.01);
        assert!((snap_angle(-10.0, 15.0) - 345.0).abs() < 0.01);
    }

    #[test]
    fn test_constrain_horizontal() {
        let p = constrain_to_cardinal_and_diagonal(Point::ZERO, Point::new(100.0, 5.0));
        let len = (100.0f64 * 100.0 + 25.0).sqrt();
        assert_point_eq(p, Point::new(len, 0.0), 1e-9);
    }

    #[test]
    fn test_constrain_diagonal_preserves_length() {
        let start = Point::new(10.0, 10.0);
        let p = constrain_to_cardinal_and_diagonal(start, Point::new(60.0, 65.0));
        let v = p - start;
        assert!((v.x - v.y).abs() < 1e-9);
        assert!((v.hypot() - Vec2::new(50.0, 55.0).hypot()).abs() < 1e-9);
    }

    #[test]
    fn test_constrain_vertical_negative() {
        let p = constrain_to_cardinal_and_diagonal(Point::ZERO, Point::new(-3.0, -40.0));
        assert!(p.x.abs() < 1e-9);
        assert!(p.y < 0.0);
    }

    #[test]
    fn test_constrain_zero_length() {
        let p = Point::new(4.0, 4.0);
        assert_eq!(constrain_to_cardinal_and_diagonal(p, p), p);
    }

    #[test]
    fn test_segment_intersection() {
        let hit = line_segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        );
        assert_point_eq(hit.unwrap(), Point::new(5.0, 5.0), 1e-12);
    }

    #[test]
    fn test_segment_intersection_parallel_and_disjoint() {
        assert!(
            line_segment_intersection(
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(10.0, 1.0),
            )
            .is_none()
        );
        assert!(
            line_segment_intersection(
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(5.0, 0.0),
                Point::new(6.0, -1.0),
            )
            .is_none()
        );
    }
}
