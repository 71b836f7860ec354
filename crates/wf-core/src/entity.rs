// SPDX-License-Identifier: MIT OR Apache-2.0
//! Entity types extracted from the input document: lines, polylines, blocks.

use crate::geometry::{BBox, Point};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content-hash identifier: 64 lowercase hex characters (SHA-256).
///
/// Two entities with identical `(layer, entity_type, canonical_geometry)`
/// MUST share an id — see `wf-hash` for the canonicalization rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Wrap a raw hex digest string.
    #[must_use]
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Borrow the underlying hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A straight line segment entity on a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Line {
    /// Content-hash id.
    pub id: EntityId,
    /// Owning layer name (non-empty, case-sensitive).
    pub layer: String,
    /// First endpoint.
    pub p1: Point,
    /// Second endpoint.
    pub p2: Point,
    /// Cached Euclidean length (`|p2 - p1|`).
    pub length: f64,
}

impl Line {
    /// Construct a line, computing its cached length.
    #[must_use]
    pub fn new(id: EntityId, layer: impl Into<String>, p1: Point, p2: Point) -> Self {
        let dx = p2.x - p1.x;
        let dy = p2.y - p1.y;
        let length = (dx * dx + dy * dy).sqrt();
        Self { id, layer: layer.into(), p1, p2, length }
    }
}

/// A polyline entity. Present only before Normalize explodes it into lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PolylineEntity {
    /// Content-hash id.
    pub id: EntityId,
    /// Owning layer name.
    pub layer: String,
    /// Vertices in order, at least two.
    pub vertices: Vec<Point>,
    /// Whether the polyline closes back to its first vertex.
    pub closed: bool,
}

/// A block (symbol) instance: door, window, furniture, etc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Block {
    /// Content-hash id.
    pub id: EntityId,
    /// Owning layer name.
    pub layer: String,
    /// Block definition name.
    pub name: String,
    /// World-space insertion point.
    pub position: Point,
    /// Rotation in degrees, normalized into `[0, 360)`.
    pub rotation_deg: f64,
    /// Local (un-rotated, un-translated) bounding box of the block definition.
    pub bbox_local: BBox,
}

/// A typed entity, tagged by kind on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    /// Straight line segment.
    Line(Line),
    /// Polyline, pre-Normalize only.
    Polyline(PolylineEntity),
    /// Block instance.
    Block(Block),
}

impl Entity {
    /// The entity's content-hash id, regardless of variant.
    #[must_use]
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Line(l) => &l.id,
            Self::Polyline(p) => &p.id,
            Self::Block(b) => &b.id,
        }
    }

    /// The entity's owning layer, regardless of variant.
    #[must_use]
    pub fn layer(&self) -> &str {
        match self {
            Self::Line(l) => &l.layer,
            Self::Polyline(p) => &p.layer,
            Self::Block(b) => &b.layer,
        }
    }

    /// Borrow the inner [`Line`], if this entity is one.
    #[must_use]
    pub fn as_line(&self) -> Option<&Line> {
        match self {
            Self::Line(l) => Some(l),
            _ => None,
        }
    }

    /// Borrow the inner [`Block`], if this entity is one.
    #[must_use]
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Self::Block(b) => Some(b),
            _ => None,
        }
    }
}
