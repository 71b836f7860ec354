// SPDX-License-Identifier: MIT OR Apache-2.0
//! The three detector predicates: parallelism, perpendicular distance, and
//! longitudinal overlap.

use crate::to_vec2;
use glam::DVec2;
use wf_core::Line;

fn direction(line: &Line) -> DVec2 {
    let d = to_vec2(line.p2) - to_vec2(line.p1);
    let len = d.length();
    if len <= f64::EPSILON { DVec2::ZERO } else { d / len }
}

/// Angle between two lines' directions, folded into `[0, 90]` degrees
/// (direction and its reverse are treated as the same orientation).
#[must_use]
pub fn angle_between_deg(a: &Line, b: &Line) -> f64 {
    let da = direction(a);
    let db = direction(b);
    let cos_theta = da.dot(db).clamp(-1.0, 1.0).abs();
    cos_theta.acos().to_degrees()
}

/// `true` if `a` and `b` are parallel within `tolerance_deg` (direction and
/// its reverse both count).
#[must_use]
pub fn are_parallel(a: &Line, b: &Line, tolerance_deg: f64) -> bool {
    let da = direction(a);
    let db = direction(b);
    if da == DVec2::ZERO || db == DVec2::ZERO {
        return false;
    }
    let cos_theta = da.dot(db).clamp(-1.0, 1.0).abs();
    let angle_deg = cos_theta.acos().to_degrees();
    angle_deg <= tolerance_deg
}

/// Perpendicular distance between the two lines' infinite supporting lines,
/// measured from `a`'s midpoint to `b`'s line.
///
/// Only meaningful for lines already accepted as parallel by
/// [`are_parallel`]; for non-parallel lines this is the distance from a
/// single point, not a constant offset.
#[must_use]
pub fn perpendicular_distance(a: &Line, b: &Line) -> f64 {
    let da = direction(a);
    let normal = DVec2::new(-da.y, da.x);
    let midpoint = (to_vec2(a.p1) + to_vec2(a.p2)) / 2.0;
    let b_p1 = to_vec2(b.p1);
    (b_p1 - midpoint).dot(normal).abs()
}

/// Longitudinal overlap between `a` and `b`, projected onto `a`'s
/// direction, expressed as a percentage of the shorter line's length.
///
/// Returns `0.0` if the projected intervals do not overlap at all, or if
/// either line is degenerate.
#[must_use]
pub fn longitudinal_overlap_percentage(a: &Line, b: &Line) -> f64 {
    let da = direction(a);
    if da == DVec2::ZERO {
        return 0.0;
    }
    let origin = to_vec2(a.p1);
    let project = |p: DVec2| (p - origin).dot(da);

    let (a_lo, a_hi) = minmax(project(to_vec2(a.p1)), project(to_vec2(a.p2)));
    let (b_lo, b_hi) = minmax(project(to_vec2(b.p1)), project(to_vec2(b.p2)));

    let overlap_lo = a_lo.max(b_lo);
    let overlap_hi = a_hi.min(b_hi);
    let overlap_len = (overlap_hi - overlap_lo).max(0.0);

    let shorter_len = a.length.min(b.length);
    if shorter_len <= f64::EPSILON {
        return 0.0;
    }
    (overlap_len / shorter_len) * 100.0
}

fn minmax(x: f64, y: f64) -> (f64, f64) {
    if x <= y { (x, y) } else { (y, x) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::{EntityId, Point};

    fn line(p1: (f64, f64), p2: (f64, f64)) -> Line {
        Line::new(EntityId::new("x"), "A-WALL", Point::new(p1.0, p1.1), Point::new(p2.0, p2.1))
    }

    #[test]
    fn parallel_horizontal_lines_detected() {
        let a = line((0.0, 0.0), (100.0, 0.0));
        let b = line((0.0, 30.0), (100.0, 30.0));
        assert!(are_parallel(&a, &b, 5.0));
        assert!((perpendicular_distance(&a, &b) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn perpendicular_lines_are_not_parallel() {
        let a = line((0.0, 0.0), (100.0, 0.0));
        let b = line((0.0, 0.0), (0.0, 100.0));
        assert!(!are_parallel(&a, &b, 5.0));
    }

    #[test]
    fn reversed_direction_still_counts_as_parallel() {
        let a = line((0.0, 0.0), (100.0, 0.0));
        let b = line((100.0, 30.0), (0.0, 30.0));
        assert!(are_parallel(&a, &b, 5.0));
    }

    #[test]
    fn full_overlap_is_100_percent() {
        let a = line((0.0, 0.0), (100.0, 0.0));
        let b = line((0.0, 30.0), (100.0, 30.0));
        assert!((longitudinal_overlap_percentage(&a, &b) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn partial_overlap_percentage() {
        let a = line((0.0, 0.0), (100.0, 0.0));
        let b = line((50.0, 30.0), (150.0, 30.0));
        // overlap [50,100] = 50, shorter length = 100 -> 50%
        assert!((longitudinal_overlap_percentage(&a, &b) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_segments_have_zero_overlap() {
        let a = line((0.0, 0.0), (50.0, 0.0));
        let b = line((100.0, 30.0), (150.0, 30.0));
        assert_eq!(longitudinal_overlap_percentage(&a, &b), 0.0);
    }
}
