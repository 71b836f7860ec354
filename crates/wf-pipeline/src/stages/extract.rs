// SPDX-License-Identifier: MIT OR Apache-2.0
//! Extract: walk the input document, emit typed entities for selected
//! layers, and separately collect door/window blocks from every layer.

use crate::input::{iter_document_entities, parse_entity, RawEntity};
use wf_config::AlgorithmConfig;
use wf_core::{Block, Entity, EntityId, ExtractCounters, ExtractOutput, Line, PolylineEntity};
use wf_error::{ErrorCode, PipelineError, PipelineResult};

/// Run Extract against the raw input document and selected-layer set.
///
/// # Errors
///
/// Returns [`ErrorCode::InvalidInput`] if the document has no `layers`
/// object or the selected-layer set is empty.
pub fn run(
    input_document: &serde_json::Value,
    selected_layers: &std::collections::BTreeSet<String>,
    config: &AlgorithmConfig,
) -> PipelineResult<ExtractOutput> {
    if selected_layers.is_empty() {
        return Err(PipelineError::new(ErrorCode::InvalidInput, "selected-layer set is empty")
            .in_stage("extract"));
    }
    if input_document.get("layers").and_then(serde_json::Value::as_object).is_none() {
        return Err(PipelineError::new(ErrorCode::InvalidInput, "input document has no `layers` object")
            .in_stage("extract"));
    }

    let mut entities = Vec::new();
    let mut door_blocks = Vec::new();
    let mut window_blocks = Vec::new();
    let mut counters = ExtractCounters::default();

    for (layer, raw) in iter_document_entities(input_document) {
        let selected = selected_layers.contains(&layer);
        let is_door_layer = config.is_door_layer(&layer);
        let is_window_layer = config.is_window_layer(&layer);
        if !selected && !is_door_layer && !is_window_layer {
            continue;
        }

        match parse_entity(raw) {
            RawEntity::Line { p1, p2 } => {
                if selected {
                    let id = wf_hash::hash_line(&layer, p1, p2);
                    entities.push(Entity::Line(Line::new(id, layer.clone(), p1, p2)));
                }
            }
            RawEntity::Polyline { vertices, closed } => {
                if selected {
                    let id = wf_hash::hash_polyline(&layer, &vertices, closed);
                    entities.push(Entity::Polyline(PolylineEntity {
                        id,
                        layer: layer.clone(),
                        vertices,
                        closed,
                    }));
                }
            }
            RawEntity::Block { name, position, rotation_deg, bbox_local } => {
                let id = wf_hash::hash_block(&layer, &name, position, rotation_deg);
                let block = Block {
                    id: id.clone(),
                    layer: layer.clone(),
                    name: name.clone(),
                    position,
                    rotation_deg: normalize_rotation(rotation_deg),
                    bbox_local,
                };
                if is_door_layer {
                    door_blocks.push(block.clone());
                }
                if is_window_layer {
                    window_blocks.push(block.clone());
                }
                if selected {
                    entities.push(Entity::Block(block));
                }
            }
            RawEntity::Unknown => counters.unknown_type_dropped += 1,
            RawEntity::MissingField => counters.missing_field_dropped += 1,
        }
    }

    Ok(ExtractOutput { entities, door_blocks, window_blocks, counters })
}

fn normalize_rotation(deg: f64) -> f64 {
    let r = deg % 360.0;
    if r < 0.0 { r + 360.0 } else { r }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn layers_only(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rejects_empty_selected_layers() {
        let doc = json!({"layers": {}});
        let err = run(&doc, &BTreeSet::new(), &AlgorithmConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn rejects_missing_layers_key() {
        let doc = json!({});
        let err = run(&doc, &layers_only(&["A-WALL"]), &AlgorithmConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn extracts_selected_layer_lines() {
        let doc = json!({
            "layers": {
                "A-WALL": {"entities": [{"type": "LINE", "start": {"x":0.0,"y":0.0}, "end": {"x":10.0,"y":0.0}}]},
                "A-FURN": {"entities": [{"type": "LINE", "start": {"x":0.0,"y":0.0}, "end": {"x":1.0,"y":0.0}}]}
            }
        });
        let out = run(&doc, &layers_only(&["A-WALL"]), &AlgorithmConfig::default()).unwrap();
        assert_eq!(out.entities.len(), 1);
    }

    #[test]
    fn collects_door_blocks_regardless_of_selection() {
        let doc = json!({
            "layers": {
                "A-DOOR": {"entities": [{
                    "type": "BLOCK", "name": "D1",
                    "position": {"X": 0.0, "Y": 0.0},
                    "BoundingBox": {"MinPoint": {"X": -5.0, "Y": -5.0}, "MaxPoint": {"X": 5.0, "Y": 5.0}}
                }]}
            }
        });
        let out = run(&doc, &layers_only(&["A-WALL"]), &AlgorithmConfig::default()).unwrap();
        assert_eq!(out.door_blocks.len(), 1);
        assert!(out.entities.is_empty());
    }

    #[test]
    fn unknown_type_increments_counter() {
        let doc = json!({"layers": {"A-WALL": {"entities": [{"type": "CIRCLE"}]}}});
        let out = run(&doc, &layers_only(&["A-WALL"]), &AlgorithmConfig::default()).unwrap();
        assert_eq!(out.counters.unknown_type_dropped, 1);
    }

    #[test]
    fn rotation_is_normalized_into_0_360() {
        let doc = json!({
            "layers": {
                "A-DOOR": {"entities": [{
                    "type": "BLOCK", "name": "D1", "Rotation": -90.0,
                    "position": {"X": 0.0, "Y": 0.0},
                    "BoundingBox": {"MinPoint": {"X": -5.0, "Y": -5.0}, "MaxPoint": {"X": 5.0, "Y": 5.0}}
                }]}
            }
        });
        let out = run(&doc, &layers_only(&["A-WALL"]), &AlgorithmConfig::default()).unwrap();
        assert_eq!(out.door_blocks[0].rotation_deg, 270.0);
    }
}
