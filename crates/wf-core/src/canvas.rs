// SPDX-License-Identifier: MIT OR Apache-2.0
//! The Clean-Dedup stage's canvas artifact: per-layer line lists for the
//! (out-of-scope) viewer, plus drawing bounds and dedup statistics.

use crate::entity::EntityId;
use crate::geometry::{BBox, Point};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One kept line, as rendered by the canvas viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CanvasLine {
    /// Content-hash id.
    pub id: EntityId,
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
    /// Cached length.
    pub length: f64,
}

/// Per-layer canvas data: the lines on that layer plus display hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LayerCanvas {
    /// Lines kept on this layer, in clean-dedup order.
    pub lines: Vec<CanvasLine>,
    /// Deterministic per-layer colour (e.g. `"#rrggbb"`), derived from the
    /// layer name so repeated runs colour identically.
    pub color: String,
    /// Whether the layer is shown by default.
    pub visible: bool,
}

/// Aggregate statistics recorded alongside the canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DedupStatistics {
    /// Entities present before deduplication.
    pub entities_in: u64,
    /// Entities kept after deduplication.
    pub entities_out: u64,
    /// Exact-duplicate entities dropped (first occurrence kept).
    pub duplicates_removed: u64,
}

/// The per-drawing artifact produced by Clean-Dedup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CanvasArtifact {
    /// Axis-aligned union of all kept line segments.
    pub drawing_bounds: BBox,
    /// Per-layer line lists, keyed by layer name, emitted in sorted-key order.
    pub layers: BTreeMap<String, LayerCanvas>,
    /// Dedup statistics for this run.
    pub statistics: DedupStatistics,
}
