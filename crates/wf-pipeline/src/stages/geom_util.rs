// SPDX-License-Identifier: MIT OR Apache-2.0
//! Small vector-math helpers shared by LOGIC_B, LOGIC_E, and Door Bridge.
//!
//! All three stages need the same operation: given a reference axis
//! (an origin and a unit direction), find the point on some other infinite
//! line that sits at a given longitudinal parameter along that axis. LOGIC_B
//! uses it to trim a pair's second line to the first's overlap interval;
//! LOGIC_E uses it to re-derive a merged band's two sides after extending
//! the longitudinal range; Door Bridge uses it to find the bridge corners on
//! both sides of a wall's thickness.

use wf_core::Point;

/// Unit direction from `p1` to `p2`, or `(0, 0)` if the segment is degenerate.
#[must_use]
pub fn line_direction(p1: Point, p2: Point) -> (f64, f64) {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f64::EPSILON { (0.0, 0.0) } else { (dx / len, dy / len) }
}

/// 2D dot product.
#[must_use]
pub fn dot2(a: (f64, f64), b: (f64, f64)) -> f64 {
    a.0 * b.0 + a.1 * b.1
}

/// Fold a direction into a canonical half-plane so that `u` and `-u` always
/// produce the same result (direction and its reverse are the same axis).
#[must_use]
pub fn canonical_direction(u: (f64, f64)) -> (f64, f64) {
    if u.0 < 0.0 || (u.0 == 0.0 && u.1 < 0.0) { (-u.0, -u.1) } else { u }
}

/// Project `p` onto `u`, relative to `origin`: `dot(p - origin, u)`.
#[must_use]
pub fn project_scalar(p: Point, origin: Point, u: (f64, f64)) -> f64 {
    dot2((p.x - origin.x, p.y - origin.y), u)
}

/// The point at longitudinal parameter `t` along the axis `(origin, u)`.
#[must_use]
pub fn point_on_axis(origin: Point, u: (f64, f64), t: f64) -> Point {
    Point::new(origin.x + u.0 * t, origin.y + u.1 * t)
}

/// Find the point on the infinite line through `(target_origin, target_dir)`
/// whose projection onto the reference axis `(reference_origin,
/// reference_dir)` equals `t`.
///
/// This is the operation spec.md describes as "points on `L_j` at the same
/// parameter, projected onto `L_j`'s infinite line": rather than walking
/// along `target_dir` by `t` (which would use the *target*'s own
/// parametrization), we solve for the point whose reference-axis projection
/// matches, so the two lines stay trim-matched even when `target_dir` is
/// only approximately parallel to `reference_dir` (within the detector's
/// angular tolerance). When the two directions are exactly antiparallel
/// this produces the identical result as first flipping `target`'s
/// endpoints — the sign is absorbed into `denom` — so no explicit
/// reorientation step is needed.
///
/// Returns `target_origin` unchanged if the two directions are (numerically)
/// perpendicular, since no parameter can satisfy the projection equation.
#[must_use]
pub fn project_onto_line_at_param(
    target_origin: Point,
    target_dir: (f64, f64),
    reference_origin: Point,
    reference_dir: (f64, f64),
    t: f64,
) -> Point {
    let denom = dot2(target_dir, reference_dir);
    if denom.abs() <= f64::EPSILON {
        return target_origin;
    }
    let c = project_scalar(target_origin, reference_origin, reference_dir);
    let s = (t - c) / denom;
    Point::new(target_origin.x + target_dir.0 * s, target_origin.y + target_dir.1 * s)
}

/// `(min, max)` of two values.
#[must_use]
pub fn minmax(x: f64, y: f64) -> (f64, f64) {
    if x <= y { (x, y) } else { (y, x) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_onto_line_recovers_parallel_point() {
        let origin = Point::new(0.0, 0.0);
        let u = (1.0, 0.0);
        let target_origin = Point::new(0.0, 100.0);
        let p = project_onto_line_at_param(target_origin, u, origin, u, 500.0);
        assert!((p.x - 500.0).abs() < 1e-9);
        assert!((p.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn project_onto_line_handles_antiparallel_target() {
        let origin = Point::new(0.0, 0.0);
        let u = (1.0, 0.0);
        // target line runs from (1000,100) to (0,100): direction is (-1, 0).
        let target_origin = Point::new(1000.0, 100.0);
        let target_dir = (-1.0, 0.0);
        let p = project_onto_line_at_param(target_origin, target_dir, origin, u, 500.0);
        assert!((p.x - 500.0).abs() < 1e-9);
        assert!((p.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn canonical_direction_is_stable_under_negation() {
        let u = (-0.5, 0.8);
        assert_eq!(canonical_direction(u), canonical_direction((0.5, -0.8)));
    }
}
