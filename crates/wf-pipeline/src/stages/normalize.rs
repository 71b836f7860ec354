// SPDX-License-Identifier: MIT OR Apache-2.0
//! Normalize: round coordinates to the configured epsilon, explode
//! polylines into line segments, drop geometry that rounds to degenerate.

use wf_config::AlgorithmConfig;
use wf_core::{Entity, Line, NormalizeCounters, NormalizeOutput, Point};

/// Round a single coordinate to the nearest multiple of `epsilon`.
#[must_use]
pub fn round_to_epsilon(v: f64, epsilon: f64) -> f64 {
    (v / epsilon).round() * epsilon
}

fn round_point(p: Point, epsilon: f64) -> Point {
    Point::new(round_to_epsilon(p.x, epsilon), round_to_epsilon(p.y, epsilon))
}

fn segment_length(p1: Point, p2: Point) -> f64 {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    (dx * dx + dy * dy).sqrt()
}

fn normalize_rotation(deg: f64) -> f64 {
    let r = deg % 360.0;
    if r < 0.0 { r + 360.0 } else { r }
}

/// Run Normalize over Extract's output entities.
///
/// No `Entity::Polyline` survives into the returned [`NormalizeOutput`]: each
/// polyline contributes `N-1` (or `N`, if closed) rounded line segments,
/// minus whichever of those round to degenerate.
#[must_use]
pub fn run(entities: &[Entity], config: &AlgorithmConfig) -> NormalizeOutput {
    let epsilon = config.epsilon_mm;
    let mut out = Vec::with_capacity(entities.len());
    let mut counters = NormalizeCounters::default();

    for entity in entities {
        match entity {
            Entity::Line(line) => {
                let p1 = round_point(line.p1, epsilon);
                let p2 = round_point(line.p2, epsilon);
                if segment_length(p1, p2) < epsilon {
                    counters.degenerate_lines_dropped += 1;
                    continue;
                }
                let id = wf_hash::hash_line(&line.layer, p1, p2);
                out.push(Entity::Line(Line::new(id, line.layer.clone(), p1, p2)));
            }
            Entity::Polyline(poly) => {
                let rounded: Vec<Point> = poly.vertices.iter().map(|v| round_point(*v, epsilon)).collect();
                let n = rounded.len();
                let mut pairs: Vec<(Point, Point)> = Vec::with_capacity(n);
                for i in 0..n.saturating_sub(1) {
                    pairs.push((rounded[i], rounded[i + 1]));
                }
                if poly.closed && n >= 2 {
                    pairs.push((rounded[n - 1], rounded[0]));
                }
                for (p1, p2) in pairs {
                    if segment_length(p1, p2) < epsilon {
                        counters.degenerate_segments_dropped += 1;
                        continue;
                    }
                    let id = wf_hash::hash_line(&poly.layer, p1, p2);
                    out.push(Entity::Line(Line::new(id, poly.layer.clone(), p1, p2)));
                    counters.polyline_segments_emitted += 1;
                }
            }
            Entity::Block(block) => {
                let position = round_point(block.position, epsilon);
                let rotation_deg = normalize_rotation(block.rotation_deg);
                let id = wf_hash::hash_block(&block.layer, &block.name, position, rotation_deg);
                out.push(Entity::Block(wf_core::Block {
                    id,
                    layer: block.layer.clone(),
                    name: block.name.clone(),
                    position,
                    rotation_deg,
                    bbox_local: block.bbox_local,
                }));
            }
        }
    }

    NormalizeOutput { entities: out, counters }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::{EntityId, PolylineEntity};

    fn line(p1: (f64, f64), p2: (f64, f64)) -> Entity {
        Entity::Line(Line::new(EntityId::new("x"), "A-WALL", Point::new(p1.0, p1.1), Point::new(p2.0, p2.1)))
    }

    #[test]
    fn rounds_coordinates_to_epsilon() {
        let config = AlgorithmConfig::default();
        let input = vec![line((0.0000001, 0.0), (1000.0000004, 0.0))];
        let out = run(&input, &config);
        let Entity::Line(l) = &out.entities[0] else { panic!("expected line") };
        assert_eq!(l.p1.x, 0.0);
        assert!((l.p2.x - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn drops_degenerate_line() {
        let config = AlgorithmConfig::default();
        let input = vec![line((0.0, 0.0), (0.0000001, 0.0))];
        let out = run(&input, &config);
        assert!(out.entities.is_empty());
        assert_eq!(out.counters.degenerate_lines_dropped, 1);
    }

    #[test]
    fn explodes_open_polyline_into_n_minus_one_segments() {
        let config = AlgorithmConfig::default();
        let poly = Entity::Polyline(PolylineEntity {
            id: EntityId::new("p"),
            layer: "A-WALL".to_string(),
            vertices: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
            closed: false,
        });
        let out = run(&[poly], &config);
        assert_eq!(out.entities.len(), 2);
        assert_eq!(out.counters.polyline_segments_emitted, 2);
    }

    #[test]
    fn closed_polyline_emits_n_segments() {
        let config = AlgorithmConfig::default();
        let poly = Entity::Polyline(PolylineEntity {
            id: EntityId::new("p"),
            layer: "A-WALL".to_string(),
            vertices: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
            closed: true,
        });
        let out = run(&[poly], &config);
        assert_eq!(out.entities.len(), 3);
    }

    #[test]
    fn degenerate_exploded_segment_is_dropped_and_counted() {
        let config = AlgorithmConfig::default();
        let poly = Entity::Polyline(PolylineEntity {
            id: EntityId::new("p"),
            layer: "A-WALL".to_string(),
            vertices: vec![Point::new(0.0, 0.0), Point::new(0.0000001, 0.0), Point::new(10.0, 0.0)],
            closed: false,
        });
        let out = run(&[poly], &config);
        assert_eq!(out.entities.len(), 1);
        assert_eq!(out.counters.degenerate_segments_dropped, 1);
        assert_eq!(out.counters.polyline_segments_emitted, 1);
    }

    #[test]
    fn rotation_normalizes_into_0_360_again() {
        let config = AlgorithmConfig::default();
        let block = Entity::Block(wf_core::Block {
            id: EntityId::new("b"),
            layer: "A-DOOR".to_string(),
            name: "D1".to_string(),
            position: Point::new(0.0, 0.0),
            rotation_deg: -30.0,
            bbox_local: wf_core::BBox { min_x: -5.0, min_y: -5.0, max_x: 5.0, max_y: 5.0 },
        });
        let out = run(&[block], &config);
        let Entity::Block(b) = &out.entities[0] else { panic!("expected block") };
        assert_eq!(b.rotation_deg, 330.0);
    }
}
