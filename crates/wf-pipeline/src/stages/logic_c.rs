// SPDX-License-Identifier: MIT OR Apache-2.0
//! LOGIC_C: drop rectangles whose corridor contains a third, intervening
//! line that isn't one of the pair's own source lines.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use wf_core::{BBox, CandidatePair, EntityId, Line, Point, TrimmedRectangle};
use wf_geometry::point_in_polygon;

fn midpoint(line: &Line) -> Point {
    Point::new((line.p1.x + line.p2.x) / 2.0, (line.p1.y + line.p2.y) / 2.0)
}

fn line_bbox(line: &Line) -> BBox {
    BBox::of_points(&[line.p1, line.p2])
}

/// Run LOGIC_C over LOGIC_B's rectangles.
///
/// `pairs` is the detector's candidate-pair list, used only to recover each
/// rectangle's own source line ids (so a rectangle's corridor test never
/// rejects itself against the very lines that produced it). `lines` is
/// every line entity visible to the stage (Parallel-Naive's flattened set).
#[must_use]
pub fn run(rectangles: &[TrimmedRectangle], pairs: &[CandidatePair], lines: &[Line]) -> Vec<TrimmedRectangle> {
    let pair_lookup: HashMap<Uuid, (&EntityId, &EntityId)> =
        pairs.iter().map(|p| (p.pair_id, (&p.line1.id, &p.line2.id))).collect();

    rectangles
        .iter()
        .filter(|rect| !has_intervening_line(rect, &pair_lookup, lines))
        .cloned()
        .collect()
}

fn has_intervening_line(
    rect: &TrimmedRectangle,
    pair_lookup: &HashMap<Uuid, (&EntityId, &EntityId)>,
    lines: &[Line],
) -> bool {
    let mut own_ids: HashSet<&EntityId> = HashSet::new();
    for pair_id in &rect.source_pair_ids {
        if let Some((id1, id2)) = pair_lookup.get(pair_id) {
            own_ids.insert(id1);
            own_ids.insert(id2);
        }
    }

    let quad = rect.oriented_quad();
    for line in lines {
        if own_ids.contains(&line.id) {
            continue;
        }
        if !line_bbox(line).intersects(&rect.bounding_rectangle) {
            continue;
        }
        if point_in_polygon(midpoint(line), &quad) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::{BBox as CoreBBox, EntityId, Segment};

    fn line(id: &str, p1: (f64, f64), p2: (f64, f64)) -> Line {
        Line::new(EntityId::new(id), "A-WALL", Point::new(p1.0, p1.1), Point::new(p2.0, p2.1))
    }

    fn rect(a: Line, b: Line, pair_id: Uuid) -> (TrimmedRectangle, CandidatePair) {
        let bbox = CoreBBox::of_points(&[a.p1, a.p2, b.p1, b.p2]);
        let rectangle = TrimmedRectangle {
            trimmed_segment_a: Segment::new(a.p1, a.p2),
            trimmed_segment_b: Segment::new(b.p1, b.p2),
            bounding_rectangle: bbox,
            source_pair_ids: vec![pair_id],
        };
        let pair = CandidatePair {
            pair_id,
            line1: a,
            line2: b,
            perpendicular_distance: 0.0,
            overlap_percentage: 0.0,
            angle_difference_deg: 0.0,
            average_length: 0.0,
            bounding_rectangle: bbox,
        };
        (rectangle, pair)
    }

    #[test]
    fn e4_intervening_line_removes_rectangle() {
        let a = line("a", (0.0, 0.0), (1000.0, 0.0));
        let b = line("b", (0.0, 100.0), (1000.0, 100.0));
        let (rectangle, pair) = rect(a, b, Uuid::nil());
        let intervening = line("c", (100.0, 50.0), (900.0, 50.0));
        let out = run(&[rectangle], &[pair], &[intervening]);
        assert!(out.is_empty());
    }

    #[test]
    fn no_intervening_line_keeps_rectangle() {
        let a = line("a", (0.0, 0.0), (1000.0, 0.0));
        let b = line("b", (0.0, 100.0), (1000.0, 100.0));
        let (rectangle, pair) = rect(a.clone(), b.clone(), Uuid::nil());
        let out = run(&[rectangle], &[pair], &[a, b]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn line_outside_corridor_bbox_is_ignored() {
        let a = line("a", (0.0, 0.0), (1000.0, 0.0));
        let b = line("b", (0.0, 100.0), (1000.0, 100.0));
        let (rectangle, pair) = rect(a, b, Uuid::nil());
        let far = line("d", (5000.0, 5000.0), (6000.0, 5000.0));
        let out = run(&[rectangle], &[pair], &[far]);
        assert_eq!(out.len(), 1);
    }
}
