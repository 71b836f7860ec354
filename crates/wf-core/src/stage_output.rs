// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-stage output records threaded through the [`crate::bundle::Bundle`].

use crate::canvas::CanvasArtifact;
use crate::door::DoorAssignment;
use crate::entity::{Block, Entity};
use crate::geometry::BBox;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Counters for entities Extract dropped without raising an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractCounters {
    /// Entities whose `type` tag was not LINE/POLYLINE/BLOCK.
    pub unknown_type_dropped: u64,
    /// Entities missing a required field for their type.
    pub missing_field_dropped: u64,
}

/// Output of the Extract stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractOutput {
    /// Typed entities on a selected layer, in document order.
    pub entities: Vec<Entity>,
    /// Block instances on a layer matching a configured door pattern.
    pub door_blocks: Vec<Block>,
    /// Block instances on a layer matching a configured window pattern.
    pub window_blocks: Vec<Block>,
    /// Drop counters.
    pub counters: ExtractCounters,
}

/// Counters for geometry Normalize dropped as degenerate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NormalizeCounters {
    /// Raw lines that rounded to a degenerate (near-zero) length.
    pub degenerate_lines_dropped: u64,
    /// Polyline-exploded segments that rounded to a degenerate length.
    pub degenerate_segments_dropped: u64,
    /// Total line segments emitted by exploding polylines.
    pub polyline_segments_emitted: u64,
}

/// Output of the Normalize stage. No `Entity::Polyline` survives here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NormalizeOutput {
    /// Rounded, exploded entities (Line and Block only).
    pub entities: Vec<Entity>,
    /// Drop/explosion counters.
    pub counters: NormalizeCounters,
}

/// Output of the Clean-Dedup stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CleanDedupOutput {
    /// Deduplicated entities, first-occurrence order.
    pub entities: Vec<Entity>,
    /// The per-drawing canvas artifact.
    pub canvas: CanvasArtifact,
}

/// One layer's grouped entities and bounding box, as produced by Parallel-Naive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LayerGroup {
    /// Layer name.
    pub name: String,
    /// Entities on this layer, in clean-dedup order.
    pub entities: Vec<Entity>,
    /// Axis-aligned bounding box over every entity on the layer.
    pub bbox: BBox,
}

/// Output of the Parallel-Naive stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParallelNaiveOutput {
    /// Per-layer groups, in first-seen layer order.
    pub layers: Vec<LayerGroup>,
    /// All entities flattened back out, clean-dedup order preserved.
    pub flat_entities: Vec<Entity>,
}

/// Counters for doors that could not be snapped to any wall.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DoorAssignmentCounters {
    /// Door blocks with no qualifying wall rectangle.
    pub unassigned: u64,
}

/// Output of the Door Rectangle Assignment stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DoorAssignmentOutput {
    /// One assignment per door block, in Extract order.
    pub assignments: Vec<DoorAssignment>,
    /// Unassigned-door counter.
    pub counters: DoorAssignmentCounters,
}
