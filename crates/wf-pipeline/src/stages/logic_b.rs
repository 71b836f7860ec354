// SPDX-License-Identifier: MIT OR Apache-2.0
//! LOGIC_B: trim each candidate pair to its shared longitudinal overlap,
//! producing two trim-matched segments of equal length.

use crate::stages::geom_util::{line_direction, point_on_axis, project_onto_line_at_param, project_scalar};
use wf_core::{BBox, CandidatePair, Segment, TrimmedRectangle};

/// Run LOGIC_B over the detector's candidate pairs, preserving order.
#[must_use]
pub fn run(pairs: &[CandidatePair]) -> Vec<TrimmedRectangle> {
    pairs.iter().map(trim_pair).collect()
}

fn trim_pair(pair: &CandidatePair) -> TrimmedRectangle {
    let a = &pair.line1;
    let b = &pair.line2;
    let u = line_direction(a.p1, a.p2);

    let a_origin = a.p1;
    let (a_lo, a_hi) = minmax(project_scalar(a.p1, a_origin, u), project_scalar(a.p2, a_origin, u));
    let (b_lo, b_hi) = minmax(project_scalar(b.p1, a_origin, u), project_scalar(b.p2, a_origin, u));

    let t_lo = a_lo.max(b_lo);
    let t_hi = a_hi.min(b_hi);

    let a_p1 = point_on_axis(a_origin, u, t_lo);
    let a_p2 = point_on_axis(a_origin, u, t_hi);

    let b_dir = line_direction(b.p1, b.p2);
    let b_p1 = project_onto_line_at_param(b.p1, b_dir, a_origin, u, t_lo);
    let b_p2 = project_onto_line_at_param(b.p1, b_dir, a_origin, u, t_hi);

    let trimmed_segment_a = Segment::new(a_p1, a_p2);
    let trimmed_segment_b = Segment::new(b_p1, b_p2);
    let bounding_rectangle = BBox::of_points(&[a_p1, a_p2, b_p1, b_p2]);

    TrimmedRectangle {
        trimmed_segment_a,
        trimmed_segment_b,
        bounding_rectangle,
        source_pair_ids: vec![pair.pair_id],
    }
}

fn minmax(x: f64, y: f64) -> (f64, f64) {
    if x <= y { (x, y) } else { (y, x) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::{EntityId, Line, Point};
    use uuid::Uuid;

    fn line(id: &str, p1: (f64, f64), p2: (f64, f64)) -> Line {
        Line::new(EntityId::new(id), "A-WALL", Point::new(p1.0, p1.1), Point::new(p2.0, p2.1))
    }

    fn pair(line1: Line, line2: Line) -> CandidatePair {
        CandidatePair {
            pair_id: Uuid::nil(),
            line1,
            line2,
            perpendicular_distance: 0.0,
            overlap_percentage: 0.0,
            angle_difference_deg: 0.0,
            average_length: 0.0,
            bounding_rectangle: BBox { min_x: 0.0, min_y: 0.0, max_x: 0.0, max_y: 0.0 },
        }
    }

    #[test]
    fn e1_exact_overlap_trims_to_full_length() {
        let p = pair(line("a", (0.0, 0.0), (1000.0, 0.0)), line("b", (0.0, 100.0), (1000.0, 100.0)));
        let out = run(&[p]);
        assert_eq!(out.len(), 1);
        let r = &out[0];
        assert!((r.trimmed_segment_a.p1.x - 0.0).abs() < 1e-6);
        assert!((r.trimmed_segment_a.p2.x - 1000.0).abs() < 1e-6);
        assert!((r.trimmed_segment_b.p1.x - 0.0).abs() < 1e-6);
        assert!((r.trimmed_segment_b.p2.x - 1000.0).abs() < 1e-6);
        assert!((r.trimmed_segment_b.p1.y - 100.0).abs() < 1e-6);
    }

    #[test]
    fn trimmed_segments_have_equal_length() {
        let p = pair(line("a", (0.0, 0.0), (1000.0, 0.0)), line("b", (200.0, 100.0), (1400.0, 100.0)));
        let out = run(&[p]);
        let r = &out[0];
        let len_a = r.trimmed_segment_a.length();
        let len_b = r.trimmed_segment_b.length();
        assert!((len_a - len_b).abs() < 1e-9);
    }

    #[test]
    fn antiparallel_second_line_still_trims_correctly() {
        // b runs from (1000,100) to (0,100): direction opposite a.
        let p = pair(line("a", (0.0, 0.0), (1000.0, 0.0)), line("b", (1000.0, 100.0), (0.0, 100.0)));
        let out = run(&[p]);
        let r = &out[0];
        assert!((r.trimmed_segment_a.p1.x - 0.0).abs() < 1e-6);
        assert!((r.trimmed_segment_a.p2.x - 1000.0).abs() < 1e-6);
        assert!((r.trimmed_segment_b.p1.x - 0.0).abs() < 1e-6);
        assert!((r.trimmed_segment_b.p2.x - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn order_is_preserved_and_source_pair_id_is_singleton() {
        let p = pair(line("a", (0.0, 0.0), (1000.0, 0.0)), line("b", (0.0, 100.0), (1000.0, 100.0)));
        let out = run(&[p.clone()]);
        assert_eq!(out[0].source_pair_ids, vec![p.pair_id]);
    }
}
