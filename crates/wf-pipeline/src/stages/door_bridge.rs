// SPDX-License-Identifier: MIT OR Apache-2.0
//! Door Bridge: for each assigned door, build the rectangle that spans the
//! wall's full thickness across the door's opening.

use crate::stages::geom_util::{canonical_direction, line_direction, point_on_axis, project_onto_line_at_param, project_scalar};
use serde_json::json;
use wf_config::AlgorithmConfig;
use wf_core::{BBox, Bridge, DoorAssignment, DoorBridge, Point, TrimmedRectangle};

/// Build one bridge rectangle per assigned door; doors with no
/// `wall_rect_index` produce no bridge (there is no wall to span).
#[must_use]
pub fn run(assignments: &[DoorAssignment], rectangles: &[TrimmedRectangle], config: &AlgorithmConfig) -> Vec<DoorBridge> {
    let mut out = Vec::new();

    for assignment in assignments {
        let Some(idx) = assignment.wall_rect_index else { continue };
        let Some(rect) = rectangles.get(idx) else { continue };

        let origin = rect.trimmed_segment_a.p1;
        let dir = canonical_direction(line_direction(rect.trimmed_segment_a.p1, rect.trimmed_segment_a.p2));
        let dir_b = line_direction(rect.trimmed_segment_b.p1, rect.trimmed_segment_b.p2);

        let corners = [
            Point::new(assignment.snapped_bbox.min_x, assignment.snapped_bbox.min_y),
            Point::new(assignment.snapped_bbox.max_x, assignment.snapped_bbox.min_y),
            Point::new(assignment.snapped_bbox.max_x, assignment.snapped_bbox.max_y),
            Point::new(assignment.snapped_bbox.min_x, assignment.snapped_bbox.max_y),
        ];
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for c in corners {
            let t = project_scalar(c, origin, dir);
            lo = lo.min(t);
            hi = hi.max(t);
        }
        let lo = lo - config.bridge_end_cap_mm;
        let hi = hi + config.bridge_end_cap_mm;

        let a_lo = point_on_axis(origin, dir, lo);
        let a_hi = point_on_axis(origin, dir, hi);
        let b_lo = project_onto_line_at_param(rect.trimmed_segment_b.p1, dir_b, origin, dir, lo);
        let b_hi = project_onto_line_at_param(rect.trimmed_segment_b.p1, dir_b, origin, dir, hi);

        let bridge_rectangle = BBox::of_points(&[a_lo, a_hi, b_lo, b_hi]);

        let mut meta = std::collections::BTreeMap::new();
        meta.insert("wall_rect_index".to_string(), json!(idx));
        meta.insert("orientation".to_string(), json!(assignment.orientation));
        meta.insert("end_cap_mm".to_string(), json!(config.bridge_end_cap_mm));

        out.push(DoorBridge {
            door_id: assignment.door_block_id.clone(),
            bridges: vec![Bridge { bridge_rectangle, meta }],
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use wf_core::{EntityId, Orientation, Segment};

    fn wall(min_x: f64, max_x: f64, y: f64, thickness: f64) -> TrimmedRectangle {
        TrimmedRectangle {
            trimmed_segment_a: Segment::new(Point::new(min_x, y), Point::new(max_x, y)),
            trimmed_segment_b: Segment::new(Point::new(min_x, y + thickness), Point::new(max_x, y + thickness)),
            bounding_rectangle: BBox { min_x, min_y: y, max_x, max_y: y + thickness },
            source_pair_ids: vec![Uuid::nil()],
        }
    }

    fn assignment(wall_rect_index: Option<usize>) -> DoorAssignment {
        DoorAssignment {
            door_block_id: EntityId::new("door-1"),
            wall_rect_index,
            snapped_bbox: BBox { min_x: 900.0, min_y: 0.0, max_x: 1000.0, max_y: 200.0 },
            orientation: wall_rect_index.map(|_| Orientation::AlongA),
        }
    }

    #[test]
    fn bridge_spans_wall_thickness_and_end_cap() {
        let rects = vec![wall(0.0, 2000.0, 0.0, 200.0)];
        let assignments = vec![assignment(Some(0))];
        let config = AlgorithmConfig::default();
        let out = run(&assignments, &rects, &config);
        assert_eq!(out.len(), 1);
        let bridge = &out[0].bridges[0];
        assert!((bridge.bridge_rectangle.min_x - (900.0 - config.bridge_end_cap_mm)).abs() < 1e-6);
        assert!((bridge.bridge_rectangle.max_x - (1000.0 + config.bridge_end_cap_mm)).abs() < 1e-6);
        assert!((bridge.bridge_rectangle.min_y - 0.0).abs() < 1e-6);
        assert!((bridge.bridge_rectangle.max_y - 200.0).abs() < 1e-6);
    }

    #[test]
    fn unassigned_door_produces_no_bridge() {
        let rects = vec![wall(0.0, 2000.0, 0.0, 200.0)];
        let assignments = vec![assignment(None)];
        let out = run(&assignments, &rects, &AlgorithmConfig::default());
        assert!(out.is_empty());
    }
}
