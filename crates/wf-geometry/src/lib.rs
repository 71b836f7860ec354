// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vector-math predicates shared by the detector and the band/containment
//! stages: parallelism, perpendicular distance, longitudinal overlap,
//! point-in-polygon, and oriented-quad containment.
//!
//! Internals use `glam::DVec2` for the arithmetic; the public surface stays
//! in terms of [`wf_core::Point`]/[`wf_core::Segment`] so callers never
//! import `glam` themselves.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod containment;
mod predicates;

pub use containment::{contains_oriented_quad, point_in_polygon};
pub use predicates::{
    angle_between_deg, are_parallel, longitudinal_overlap_percentage, perpendicular_distance,
};

use glam::DVec2;
use wf_core::Point;

fn to_vec2(p: Point) -> DVec2 {
    DVec2::new(p.x, p.y)
}

/// `true` if neither coordinate of `p` is `NaN` or infinite.
///
/// Malformed upstream geometry (a block transform producing `NaN`, a
/// corrupt coordinate in the source document) must be rejected before it
/// reaches a predicate that would otherwise silently propagate it.
#[must_use]
pub fn is_finite_point(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}
