// SPDX-License-Identifier: MIT OR Apache-2.0
//! Candidate wall pairs produced by the detector, and the rectangles derived
//! from them by LOGIC_B/C/D/E.

use crate::entity::Line;
use crate::geometry::{BBox, Segment};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An unordered pair of lines accepted by the three detector predicates
/// (parallelism, perpendicular distance, longitudinal overlap).
///
/// Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CandidatePair {
    /// Deterministic UUIDv5 derived from the sorted pair of line ids.
    pub pair_id: Uuid,
    /// First line, in original `(i, j)` index order (not canonicalized).
    pub line1: Line,
    /// Second line, in original `(i, j)` index order.
    pub line2: Line,
    /// Perpendicular distance between the two lines' supporting infinite lines.
    pub perpendicular_distance: f64,
    /// Longitudinal overlap as a percentage of the shorter line's length.
    pub overlap_percentage: f64,
    /// Angle between the two lines' directions, in degrees, `[0, 90]`.
    pub angle_difference_deg: f64,
    /// Mean of the two lines' lengths.
    pub average_length: f64,
    /// Axis-aligned bounding box over all four endpoints.
    pub bounding_rectangle: BBox,
}

/// A wall rectangle: two trim-matched parallel segments of equal length,
/// `perpendicular_distance` apart, carried from LOGIC_B through LOGIC_E.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrimmedRectangle {
    /// One long side of the rectangle.
    pub trimmed_segment_a: Segment,
    /// The other long side, trim-matched to `trimmed_segment_a`.
    pub trimmed_segment_b: Segment,
    /// Axis-aligned bounding box over the four trimmed endpoints.
    pub bounding_rectangle: BBox,
    /// Ids of the candidate pair(s) this rectangle descends from.
    ///
    /// A single id for LOGIC_B/C/D output; after LOGIC_E band-merges two or
    /// more rectangles, this becomes the sorted tuple of every contributing
    /// pair id.
    pub source_pair_ids: Vec<Uuid>,
}

impl TrimmedRectangle {
    /// Thickness of the rectangle: the (constant) distance between its two
    /// trimmed segments, measured at their shared first endpoint.
    #[must_use]
    pub fn thickness(&self) -> f64 {
        let a = self.trimmed_segment_a.p1;
        let b = self.trimmed_segment_b.p1;
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// The four corners, ordered `(A.p1, A.p2, B.p2, B.p1)` so consecutive
    /// corners share an edge (a proper quad winding, not a bowtie).
    #[must_use]
    pub fn oriented_quad(&self) -> [crate::geometry::Point; 4] {
        [
            self.trimmed_segment_a.p1,
            self.trimmed_segment_a.p2,
            self.trimmed_segment_b.p2,
            self.trimmed_segment_b.p1,
        ]
    }
}
