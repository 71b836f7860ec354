// SPDX-License-Identifier: MIT OR Apache-2.0
//! Door-to-wall assignment and the bridge rectangles that close openings.

use crate::entity::EntityId;
use crate::geometry::BBox;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which trimmed segment of the assigned wall rectangle the door's long
/// axis aligns with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Orientation {
    /// Aligned with `trimmed_segment_a`.
    AlongA,
    /// Aligned with `trimmed_segment_b`.
    AlongB,
}

/// The result of snapping one door block onto the nearest wall rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DoorAssignment {
    /// Id of the door block.
    pub door_block_id: EntityId,
    /// Index into the LOGIC_E rectangle list, or `None` if no wall qualified.
    pub wall_rect_index: Option<usize>,
    /// World-space AABB of the door block after rotation and translation.
    pub snapped_bbox: BBox,
    /// Orientation relative to the assigned wall, if assigned.
    pub orientation: Option<Orientation>,
}

/// One bridge rectangle filling a door opening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Bridge {
    /// The rectangle spanning the wall's thickness across the opening.
    pub bridge_rectangle: BBox,
    /// Free-form metadata (wall index, orientation, extension applied, ...).
    pub meta: BTreeMap<String, serde_json::Value>,
}

/// All bridges produced for a single door.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DoorBridge {
    /// Id of the door block this bridge set belongs to.
    pub door_id: EntityId,
    /// One rectangle per opening (normally exactly one).
    pub bridges: Vec<Bridge>,
}
