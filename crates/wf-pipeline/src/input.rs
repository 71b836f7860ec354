// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parsing of the raw JSON input document into Extract's internal
//! representation of one raw entity.
//!
//! `{ layers: { layer_name: { entities: [ { type, ... } ] } } }`, per entity
//! type: `LINE { start, end }`, `POLYLINE { vertices, closed? }`,
//! `BLOCK { name, position, Rotation?, BoundingBox }`.

use serde_json::Value;
use wf_core::Point;

/// One raw entity as read straight off the wire, before hashing or rounding.
pub enum RawEntity {
    /// A line with its two endpoints.
    Line { p1: Point, p2: Point },
    /// A polyline with its ordered vertices and closure flag.
    Polyline { vertices: Vec<Point>, closed: bool },
    /// A block instance.
    Block { name: String, position: Point, rotation_deg: f64, bbox_local: wf_core::BBox },
    /// An entity type Extract doesn't recognise.
    Unknown,
    /// A recognised type missing a field it requires.
    MissingField,
}

fn point_from_xy(v: &Value, x_key: &str, y_key: &str) -> Option<Point> {
    let x = v.get(x_key)?.as_f64()?;
    let y = v.get(y_key)?.as_f64()?;
    Some(Point::new(x, y))
}

/// Parse one JSON entity object into a [`RawEntity`].
#[must_use]
pub fn parse_entity(value: &Value) -> RawEntity {
    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        return RawEntity::Unknown;
    };
    match kind {
        "LINE" => {
            let (Some(start), Some(end)) =
                (value.get("start"), value.get("end"))
            else {
                return RawEntity::MissingField;
            };
            let (Some(p1), Some(p2)) =
                (point_from_xy(start, "x", "y"), point_from_xy(end, "x", "y"))
            else {
                return RawEntity::MissingField;
            };
            RawEntity::Line { p1, p2 }
        }
        "POLYLINE" => {
            let Some(raw_vertices) = value.get("vertices").and_then(Value::as_array) else {
                return RawEntity::MissingField;
            };
            let mut vertices = Vec::with_capacity(raw_vertices.len());
            for v in raw_vertices {
                match point_from_xy(v, "x", "y") {
                    Some(p) => vertices.push(p),
                    None => return RawEntity::MissingField,
                }
            }
            if vertices.len() < 2 {
                return RawEntity::MissingField;
            }
            let closed = value.get("closed").and_then(Value::as_bool).unwrap_or(false);
            RawEntity::Polyline { vertices, closed }
        }
        "BLOCK" => {
            let Some(name) = value.get("name").and_then(Value::as_str) else {
                return RawEntity::MissingField;
            };
            let Some(position) = value.get("position").and_then(|p| point_from_xy(p, "X", "Y")) else {
                return RawEntity::MissingField;
            };
            let rotation_deg = value.get("Rotation").and_then(Value::as_f64).unwrap_or(0.0);
            let Some(bbox) = value.get("BoundingBox") else {
                return RawEntity::MissingField;
            };
            let (Some(min), Some(max)) = (bbox.get("MinPoint"), bbox.get("MaxPoint")) else {
                return RawEntity::MissingField;
            };
            let (Some(min), Some(max)) = (point_from_xy(min, "X", "Y"), point_from_xy(max, "X", "Y")) else {
                return RawEntity::MissingField;
            };
            RawEntity::Block {
                name: name.to_string(),
                position,
                rotation_deg,
                bbox_local: wf_core::BBox { min_x: min.x, min_y: min.y, max_x: max.x, max_y: max.y },
            }
        }
        _ => RawEntity::Unknown,
    }
}

/// Iterate `(layer_name, entity_value)` pairs across every layer in the
/// document, in the order layers and entities appear in the source JSON.
pub fn iter_document_entities(document: &Value) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    let Some(layers) = document.get("layers").and_then(Value::as_object) else {
        return out;
    };
    for (layer_name, layer_value) in layers {
        let Some(entities) = layer_value.get("entities").and_then(Value::as_array) else {
            continue;
        };
        for entity in entities {
            out.push((layer_name.clone(), entity));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_line() {
        let v = json!({"type": "LINE", "start": {"x": 0.0, "y": 0.0}, "end": {"x": 10.0, "y": 0.0}});
        match parse_entity(&v) {
            RawEntity::Line { p1, p2 } => {
                assert_eq!(p1, Point::new(0.0, 0.0));
                assert_eq!(p2, Point::new(10.0, 0.0));
            }
            _ => panic!("expected line"),
        }
    }

    #[test]
    fn unknown_type_is_unknown() {
        let v = json!({"type": "CIRCLE"});
        assert!(matches!(parse_entity(&v), RawEntity::Unknown));
    }

    #[test]
    fn line_missing_end_is_missing_field() {
        let v = json!({"type": "LINE", "start": {"x": 0.0, "y": 0.0}});
        assert!(matches!(parse_entity(&v), RawEntity::MissingField));
    }

    #[test]
    fn parses_block_with_bounding_box() {
        let v = json!({
            "type": "BLOCK",
            "name": "door-01",
            "position": {"X": 5.0, "Y": 5.0},
            "Rotation": 90.0,
            "BoundingBox": {"MinPoint": {"X": -10.0, "Y": -5.0}, "MaxPoint": {"X": 10.0, "Y": 5.0}}
        });
        match parse_entity(&v) {
            RawEntity::Block { name, rotation_deg, .. } => {
                assert_eq!(name, "door-01");
                assert_eq!(rotation_deg, 90.0);
            }
            _ => panic!("expected block"),
        }
    }

    #[test]
    fn iter_document_entities_walks_all_layers() {
        let doc = json!({
            "layers": {
                "A-WALL": {"entities": [{"type": "LINE", "start": {"x":0.0,"y":0.0}, "end": {"x":1.0,"y":0.0}}]},
                "A-DOOR": {"entities": []}
            }
        });
        let entries = iter_document_entities(&doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "A-WALL");
    }
}
