// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parallel-Naive: group entities by layer and compute each layer's bounding
//! box, using bounded internal parallelism for the bbox reduction.

use rayon::prelude::*;
use wf_core::{BBox, Entity, LayerGroup, ParallelNaiveOutput, Point};

fn entity_points(entity: &Entity) -> Vec<Point> {
    match entity {
        Entity::Line(l) => vec![l.p1, l.p2],
        Entity::Block(b) => {
            let c = b.bbox_local;
            vec![
                Point::new(c.min_x, c.min_y),
                Point::new(c.max_x, c.min_y),
                Point::new(c.max_x, c.max_y),
                Point::new(c.min_x, c.max_y),
            ]
            .into_iter()
            .map(|p| Point::new(p.x + b.position.x, p.y + b.position.y))
            .collect()
        }
        // Normalize has already exploded every polyline into lines.
        Entity::Polyline(p) => p.vertices.clone(),
    }
}

fn layer_bbox(entities: &[Entity]) -> BBox {
    let mut points = Vec::new();
    for e in entities {
        points.extend(entity_points(e));
    }
    BBox::of_points(&points)
}

/// Run Parallel-Naive over Clean-Dedup's kept entities.
///
/// Entities are grouped by layer in first-seen order (stable regardless of
/// how the bbox reduction below is scheduled). The per-layer bbox reduction
/// itself runs through `rayon`'s indexed parallel iterator, which preserves
/// output order identically to a sequential `map` — parallelism here buys
/// throughput on wide layer sets without affecting the artifact's bytes.
#[must_use]
pub fn run(entities: &[Entity]) -> ParallelNaiveOutput {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: std::collections::HashMap<String, Vec<Entity>> = std::collections::HashMap::new();

    for entity in entities {
        let layer = entity.layer().to_string();
        if !grouped.contains_key(&layer) {
            order.push(layer.clone());
        }
        grouped.entry(layer).or_default().push(entity.clone());
    }

    let layers: Vec<LayerGroup> = order
        .into_par_iter()
        .map(|name| {
            let group_entities = grouped.get(&name).cloned().unwrap_or_default();
            let bbox = layer_bbox(&group_entities);
            LayerGroup { name, entities: group_entities, bbox }
        })
        .collect();

    ParallelNaiveOutput { layers, flat_entities: entities.to_vec() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::{EntityId, Line};

    fn line(layer: &str, p1: (f64, f64), p2: (f64, f64)) -> Entity {
        Entity::Line(Line::new(EntityId::new("x"), layer, Point::new(p1.0, p1.1), Point::new(p2.0, p2.1)))
    }

    #[test]
    fn groups_by_layer_in_first_seen_order() {
        let entities = vec![
            line("A-DOOR", (0.0, 0.0), (1.0, 0.0)),
            line("A-WALL", (0.0, 0.0), (10.0, 0.0)),
            line("A-DOOR", (0.0, 0.0), (2.0, 0.0)),
        ];
        let out = run(&entities);
        assert_eq!(out.layers.len(), 2);
        assert_eq!(out.layers[0].name, "A-DOOR");
        assert_eq!(out.layers[1].name, "A-WALL");
    }

    #[test]
    fn layer_bbox_covers_all_its_lines() {
        let entities = vec![
            line("A-WALL", (0.0, 0.0), (10.0, 0.0)),
            line("A-WALL", (5.0, -5.0), (5.0, 5.0)),
        ];
        let out = run(&entities);
        let wall = &out.layers[0];
        assert_eq!(wall.bbox.min_y, -5.0);
        assert_eq!(wall.bbox.max_x, 10.0);
    }

    #[test]
    fn flat_entities_preserves_input_order() {
        let entities = vec![
            line("A-WALL", (0.0, 0.0), (10.0, 0.0)),
            line("A-DOOR", (0.0, 0.0), (1.0, 0.0)),
        ];
        let out = run(&entities);
        assert_eq!(out.flat_entities, entities);
    }
}
