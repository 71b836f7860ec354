// SPDX-License-Identifier: MIT OR Apache-2.0
//! Point-in-polygon and oriented-quad containment, used by LOGIC_D to prune
//! rectangles fully swallowed by a larger one.

use crate::to_vec2;
use wf_core::Point;

/// Ray-casting point-in-polygon test. `polygon` is a closed ring given as
/// ordered vertices (first and last need not repeat). Points exactly on an
/// edge may report either inside or outside depending on tie-breaking; use
/// [`contains_oriented_quad`]'s `tolerance_mm` to treat near-edge corners
/// as contained rather than relying on this function's edge behavior.
#[must_use]
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let vi = polygon[i];
        let vj = polygon[j];
        let crosses = (vi.y > point.y) != (vj.y > point.y);
        if crosses {
            let x_at_y = vj.x + (point.y - vj.y) * (vi.x - vj.x) / (vi.y - vj.y);
            if point.x < x_at_y {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// `true` if every corner of `inner` lies within `tolerance_mm` of being
/// inside `outer` (strictly inside, or within `tolerance_mm` of an edge).
///
/// Both quads are treated as closed polygons via [`point_in_polygon`];
/// corners near the boundary are resolved by also checking whether the
/// corner is within `tolerance_mm` of any outer edge, so tolerance-sized
/// gaps between a trimmed inner rectangle and its outer bound don't cause
/// a false negative.
#[must_use]
pub fn contains_oriented_quad(outer: &[Point; 4], inner: &[Point; 4], tolerance_mm: f64) -> bool {
    inner.iter().all(|&corner| {
        point_in_polygon(corner, outer) || distance_to_polygon_boundary(corner, outer) <= tolerance_mm
    })
}

fn distance_to_polygon_boundary(point: Point, polygon: &[Point]) -> f64 {
    let p = to_vec2(point);
    let n = polygon.len();
    let mut min_dist = f64::INFINITY;
    for i in 0..n {
        let a = to_vec2(polygon[i]);
        let b = to_vec2(polygon[(i + 1) % n]);
        let ab = b - a;
        let len_sq = ab.length_squared();
        let t = if len_sq <= f64::EPSILON { 0.0 } else { ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0) };
        let closest = a + ab * t;
        min_dist = min_dist.min((p - closest).length());
    }
    min_dist
}
