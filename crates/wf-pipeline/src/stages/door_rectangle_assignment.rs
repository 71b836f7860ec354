// SPDX-License-Identifier: MIT OR Apache-2.0
//! Door Rectangle Assignment: snap each door block's world-space AABB onto
//! the nearest qualifying LOGIC_E wall rectangle.

use crate::stages::geom_util::{canonical_direction, dot2, line_direction, project_scalar};
use wf_config::AlgorithmConfig;
use wf_core::{Block, BBox, DoorAssignment, DoorAssignmentCounters, DoorAssignmentOutput, Orientation, Point, TrimmedRectangle};

fn rotate_around(p: Point, center: Point, degrees: f64) -> Point {
    let rad = degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
}

/// World-space AABB of a block: its local bbox rotated by `rotation_deg`
/// around the bbox's own centre, then translated by `position`.
fn world_bbox(block: &Block) -> BBox {
    let local = block.bbox_local;
    let center = local.center();
    let corners = [
        Point::new(local.min_x, local.min_y),
        Point::new(local.max_x, local.min_y),
        Point::new(local.max_x, local.max_y),
        Point::new(local.min_x, local.max_y),
    ];
    let world_corners = corners.map(|c| {
        let rotated = rotate_around(c, center, block.rotation_deg);
        Point::new(rotated.x + block.position.x, rotated.y + block.position.y)
    });
    BBox::of_points(&world_corners)
}

/// The block's long-axis direction in world space: the local bbox's longer
/// dimension, rotated by `rotation_deg`.
fn long_axis_direction(block: &Block) -> (f64, f64) {
    let local = block.bbox_local;
    let local_dir = if local.width() >= local.height() { (1.0, 0.0) } else { (0.0, 1.0) };
    let rad = block.rotation_deg.to_radians();
    let (sin, cos) = rad.sin_cos();
    (local_dir.0 * cos - local_dir.1 * sin, local_dir.0 * sin + local_dir.1 * cos)
}

fn rect_axis(rect: &TrimmedRectangle) -> (Point, (f64, f64)) {
    (rect.trimmed_segment_a.p1, canonical_direction(line_direction(rect.trimmed_segment_a.p1, rect.trimmed_segment_a.p2)))
}

/// `true` if `door_center` falls within `config.door_snap_tol_mm` of `rect`'s
/// band (measured beyond the band's own half-thickness) and the rectangle's
/// longitudinal extent intersects `door_bbox`'s projection onto the axis.
fn qualifies(rect: &TrimmedRectangle, door_bbox: &BBox, config: &AlgorithmConfig) -> bool {
    let (origin, dir) = rect_axis(rect);
    let normal = (-dir.1, dir.0);

    let offset_a = project_scalar(rect.trimmed_segment_a.p1, origin, normal);
    let offset_b = project_scalar(rect.trimmed_segment_b.p1, origin, normal);
    let center_offset = (offset_a + offset_b) / 2.0;
    let half_thickness = (offset_a - offset_b).abs() / 2.0;

    let door_center = door_bbox.center();
    let door_offset = project_scalar(door_center, origin, normal);
    if (door_offset - center_offset).abs() > half_thickness + config.door_snap_tol_mm {
        return false;
    }

    let rect_lo = project_scalar(rect.trimmed_segment_a.p1, origin, dir).min(project_scalar(rect.trimmed_segment_a.p2, origin, dir));
    let rect_hi = project_scalar(rect.trimmed_segment_a.p1, origin, dir).max(project_scalar(rect.trimmed_segment_a.p2, origin, dir));

    let door_corners = [
        Point::new(door_bbox.min_x, door_bbox.min_y),
        Point::new(door_bbox.max_x, door_bbox.min_y),
        Point::new(door_bbox.max_x, door_bbox.max_y),
        Point::new(door_bbox.min_x, door_bbox.max_y),
    ];
    let mut door_lo = f64::INFINITY;
    let mut door_hi = f64::NEG_INFINITY;
    for c in door_corners {
        let t = project_scalar(c, origin, dir);
        door_lo = door_lo.min(t);
        door_hi = door_hi.max(t);
    }

    rect_lo <= door_hi && rect_hi >= door_lo
}

fn orientation_for(rect: &TrimmedRectangle, door_axis: (f64, f64)) -> Orientation {
    let dir_a = line_direction(rect.trimmed_segment_a.p1, rect.trimmed_segment_a.p2);
    let dir_b = line_direction(rect.trimmed_segment_b.p1, rect.trimmed_segment_b.p2);
    let score_a = dot2(door_axis, dir_a).abs();
    let score_b = dot2(door_axis, dir_b).abs();
    if score_a >= score_b { Orientation::AlongA } else { Orientation::AlongB }
}

/// Snap every door block onto the nearest qualifying wall rectangle, in
/// Extract order.
#[must_use]
pub fn run(rectangles: &[TrimmedRectangle], door_blocks: &[Block], config: &AlgorithmConfig) -> DoorAssignmentOutput {
    let mut assignments = Vec::with_capacity(door_blocks.len());
    let mut counters = DoorAssignmentCounters::default();

    for block in door_blocks {
        let snapped_bbox = world_bbox(block);
        let door_center = snapped_bbox.center();
        let door_axis = long_axis_direction(block);

        let mut best: Option<(usize, f64)> = None;
        for (idx, rect) in rectangles.iter().enumerate() {
            if !qualifies(rect, &snapped_bbox, config) {
                continue;
            }
            let rect_center = rect.bounding_rectangle.center();
            let dx = rect_center.x - door_center.x;
            let dy = rect_center.y - door_center.y;
            let distance = (dx * dx + dy * dy).sqrt();
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((idx, distance));
            }
        }

        match best {
            Some((idx, _)) => {
                let orientation = orientation_for(&rectangles[idx], door_axis);
                assignments.push(DoorAssignment {
                    door_block_id: block.id.clone(),
                    wall_rect_index: Some(idx),
                    snapped_bbox,
                    orientation: Some(orientation),
                });
            }
            None => {
                counters.unassigned += 1;
                assignments.push(DoorAssignment {
                    door_block_id: block.id.clone(),
                    wall_rect_index: None,
                    snapped_bbox,
                    orientation: None,
                });
            }
        }
    }

    DoorAssignmentOutput { assignments, counters }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use wf_core::{EntityId, Segment};

    fn wall(min_x: f64, max_x: f64, y: f64, thickness: f64) -> TrimmedRectangle {
        TrimmedRectangle {
            trimmed_segment_a: Segment::new(Point::new(min_x, y), Point::new(max_x, y)),
            trimmed_segment_b: Segment::new(Point::new(min_x, y + thickness), Point::new(max_x, y + thickness)),
            bounding_rectangle: BBox { min_x, min_y: y, max_x, max_y: y + thickness },
            source_pair_ids: vec![Uuid::nil()],
        }
    }

    fn door_block(position: Point, rotation_deg: f64) -> Block {
        Block {
            id: EntityId::new("door-1"),
            layer: "A-DOOR".to_string(),
            name: "DOOR".to_string(),
            position,
            rotation_deg,
            bbox_local: BBox { min_x: -450.0, min_y: -50.0, max_x: 450.0, max_y: 50.0 },
        }
    }

    #[test]
    fn snaps_door_centred_on_wall_band() {
        let rects = vec![wall(0.0, 2000.0, 0.0, 200.0)];
        let door = door_block(Point::new(1000.0, 100.0), 0.0);
        let out = run(&rects, &[door], &AlgorithmConfig::default());
        assert_eq!(out.assignments.len(), 1);
        assert_eq!(out.assignments[0].wall_rect_index, Some(0));
        assert_eq!(out.counters.unassigned, 0);
    }

    #[test]
    fn unassigned_when_no_wall_within_tolerance() {
        let rects = vec![wall(0.0, 2000.0, 0.0, 200.0)];
        let door = door_block(Point::new(1000.0, 5000.0), 0.0);
        let out = run(&rects, &[door], &AlgorithmConfig::default());
        assert_eq!(out.assignments[0].wall_rect_index, None);
        assert_eq!(out.counters.unassigned, 1);
    }

    #[test]
    fn picks_nearest_of_two_qualifying_walls() {
        let rects = vec![wall(0.0, 2000.0, 0.0, 200.0), wall(0.0, 2000.0, 5000.0, 200.0)];
        let door = door_block(Point::new(1000.0, 100.0), 0.0);
        let out = run(&rects, &[door], &AlgorithmConfig::default());
        assert_eq!(out.assignments[0].wall_rect_index, Some(0));
    }

    #[test]
    fn no_longitudinal_overlap_is_unassigned() {
        let rects = vec![wall(0.0, 500.0, 0.0, 200.0)];
        let door = door_block(Point::new(5000.0, 100.0), 0.0);
        let out = run(&rects, &[door], &AlgorithmConfig::default());
        assert_eq!(out.assignments[0].wall_rect_index, None);
    }
}
