// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wall Candidates Placeholder: echoes the detector's output verbatim into
//! the final wall-candidates artifact. A stand-in slot for a future
//! replacement stage; carries no detection logic of its own.

use wf_core::CandidatePair;

/// Copy the detector's candidate pairs unchanged.
#[must_use]
pub fn run(wall_candidates: &[CandidatePair]) -> Vec<CandidatePair> {
    wall_candidates.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use wf_core::{BBox, EntityId, Line, Point};

    #[test]
    fn echoes_detector_output_verbatim() {
        let line1 = Line::new(EntityId::new("a"), "A-WALL", Point::new(0.0, 0.0), Point::new(1000.0, 0.0));
        let line2 = Line::new(EntityId::new("b"), "A-WALL", Point::new(0.0, 100.0), Point::new(1000.0, 100.0));
        let pair = CandidatePair {
            pair_id: Uuid::nil(),
            line1,
            line2,
            perpendicular_distance: 100.0,
            overlap_percentage: 100.0,
            angle_difference_deg: 0.0,
            average_length: 1000.0,
            bounding_rectangle: BBox { min_x: 0.0, min_y: 0.0, max_x: 1000.0, max_y: 100.0 },
        };
        let out = run(&[pair.clone()]);
        assert_eq!(out, vec![pair]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(run(&[]).is_empty());
    }
}
