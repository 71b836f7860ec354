// SPDX-License-Identifier: MIT OR Apache-2.0
//! Plain, serializable geometric value types shared by every stage.
//!
//! Vector arithmetic lives in `wf-geometry`; these are just the wire/storage
//! shapes — point, segment, axis-aligned bounding box.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A 2D point in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    /// X coordinate, millimetres.
    pub x: f64,
    /// Y coordinate, millimetres.
    pub y: f64,
}

impl Point {
    /// Construct a point from coordinates.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An ordered pair of points. Direction matters for most callers, but
/// [`Segment::length`] and [`Segment::is_degenerate`] are direction-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    /// First endpoint.
    pub p1: Point,
    /// Second endpoint.
    pub p2: Point,
}

impl Segment {
    /// Construct a segment from two endpoints.
    #[must_use]
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    /// Euclidean length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        let dx = self.p2.x - self.p1.x;
        let dy = self.p2.y - self.p1.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// A segment is degenerate once its length drops below `epsilon`.
    #[must_use]
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        self.length() < epsilon
    }

    /// The segment with endpoints swapped.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self { p1: self.p2, p2: self.p1 }
    }
}

/// Axis-aligned bounding box: `min_x <= max_x`, `min_y <= max_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BBox {
    /// Minimum X.
    pub min_x: f64,
    /// Minimum Y.
    pub min_y: f64,
    /// Maximum X.
    pub max_x: f64,
    /// Maximum Y.
    pub max_y: f64,
}

impl BBox {
    /// Build the bounding box of a single point (zero-area).
    #[must_use]
    pub fn of_point(p: Point) -> Self {
        Self { min_x: p.x, min_y: p.y, max_x: p.x, max_y: p.y }
    }

    /// Build the axis-aligned union bounding box of a set of points.
    ///
    /// # Panics
    ///
    /// Panics if `points` is empty; every caller in this crate has at least
    /// one point by construction (there is no meaningful empty bbox here).
    #[must_use]
    pub fn of_points(points: &[Point]) -> Self {
        let mut iter = points.iter();
        let first = *iter.next().expect("BBox::of_points requires at least one point");
        let mut bbox = Self::of_point(first);
        for p in iter {
            bbox = bbox.union_point(*p);
        }
        bbox
    }

    /// Extend this bbox to also cover `p`.
    #[must_use]
    pub fn union_point(&self, p: Point) -> Self {
        Self {
            min_x: self.min_x.min(p.x),
            min_y: self.min_y.min(p.y),
            max_x: self.max_x.max(p.x),
            max_y: self.max_y.max(p.y),
        }
    }

    /// The union of two bounding boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// `true` if the two bounding boxes overlap or touch.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Width (`max_x - min_x`).
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height (`max_y - min_y`).
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Centre point of the box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}
