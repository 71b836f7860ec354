// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wall-Candidate Detector: the O(n²) pairwise test over lines, with three
//! geometric predicates (parallelism, perpendicular distance, longitudinal
//! overlap).

use wf_config::AlgorithmConfig;
use wf_core::{BBox, CandidatePair, Line};
use wf_error::{ErrorCode, PipelineError, PipelineResult};
use wf_geometry::{angle_between_deg, are_parallel, is_finite_point, longitudinal_overlap_percentage, perpendicular_distance};

/// Run the detector over every line in `flat_entities`, in `(i, j)`
/// index order with `i < j`. No pair is emitted twice.
///
/// # Errors
///
/// Returns [`ErrorCode::OversizedInput`] if the line count exceeds
/// `config.max_lines_for_detector`, and [`ErrorCode::CorruptUpstream`] if
/// any line endpoint is non-finite (`NaN`/infinite coordinates must never
/// silently propagate into a geometric predicate).
pub fn run(lines: &[Line], config: &AlgorithmConfig) -> PipelineResult<Vec<CandidatePair>> {
    if lines.len() > config.max_lines_for_detector {
        return Err(PipelineError::new(
            ErrorCode::OversizedInput,
            format!("{} lines exceeds the configured safety cap of {}", lines.len(), config.max_lines_for_detector),
        )
        .in_stage("wall_candidate_detector")
        .with_context("line_count", lines.len()));
    }

    for line in lines {
        if !is_finite_point(line.p1) || !is_finite_point(line.p2) {
            return Err(PipelineError::new(ErrorCode::CorruptUpstream, "line endpoint is not finite")
                .in_stage("wall_candidate_detector")
                .with_context("line_id", line.id.as_str()));
        }
    }

    let mut pairs = Vec::new();
    for i in 0..lines.len() {
        for j in (i + 1)..lines.len() {
            let (a, b) = (&lines[i], &lines[j]);
            if !are_parallel(a, b, config.angular_tolerance_deg) {
                continue;
            }
            let distance = perpendicular_distance(a, b);
            if distance < config.min_distance_mm || distance > config.max_distance_mm {
                continue;
            }
            let overlap = longitudinal_overlap_percentage(a, b);
            if overlap < config.min_overlap_percentage {
                continue;
            }

            let pair_id = wf_hash::derive_pair_id(&a.id, &b.id);
            let angle_difference_deg = angle_between_deg(a, b);
            let average_length = (a.length + b.length) / 2.0;
            let bounding_rectangle = BBox::of_points(&[a.p1, a.p2, b.p1, b.p2]);

            pairs.push(CandidatePair {
                pair_id,
                line1: a.clone(),
                line2: b.clone(),
                perpendicular_distance: distance,
                overlap_percentage: overlap,
                angle_difference_deg,
                average_length,
                bounding_rectangle,
            });
        }
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::{EntityId, Point};

    fn line(id: &str, p1: (f64, f64), p2: (f64, f64)) -> Line {
        Line::new(EntityId::new(id), "A-WALL", Point::new(p1.0, p1.1), Point::new(p2.0, p2.1))
    }

    #[test]
    fn e1_single_pair_clean() {
        let lines = vec![line("a", (0.0, 0.0), (1000.0, 0.0)), line("b", (0.0, 100.0), (1000.0, 100.0))];
        let pairs = run(&lines, &AlgorithmConfig::default()).unwrap();
        assert_eq!(pairs.len(), 1);
        let p = &pairs[0];
        assert_eq!(p.perpendicular_distance, 100.0);
        assert_eq!(p.overlap_percentage, 100.0);
        assert_eq!(p.angle_difference_deg, 0.0);
        assert_eq!(p.bounding_rectangle, BBox { min_x: 0.0, min_y: 0.0, max_x: 1000.0, max_y: 100.0 });
    }

    #[test]
    fn e2_rejected_by_distance() {
        let lines = vec![line("a", (0.0, 0.0), (1000.0, 0.0)), line("b", (0.0, 10.0), (1000.0, 10.0))];
        let pairs = run(&lines, &AlgorithmConfig::default()).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn e3_rejected_by_overlap() {
        let lines = vec![line("a", (0.0, 0.0), (1000.0, 0.0)), line("b", (800.0, 100.0), (1800.0, 100.0))];
        let pairs = run(&lines, &AlgorithmConfig::default()).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn detector_symmetry_index_order_does_not_change_membership() {
        let forward = vec![line("a", (0.0, 0.0), (1000.0, 0.0)), line("b", (0.0, 100.0), (1000.0, 100.0))];
        let backward = vec![line("b", (0.0, 100.0), (1000.0, 100.0)), line("a", (0.0, 0.0), (1000.0, 0.0))];
        let p1 = run(&forward, &AlgorithmConfig::default()).unwrap();
        let p2 = run(&backward, &AlgorithmConfig::default()).unwrap();
        assert_eq!(p1.len(), 1);
        assert_eq!(p2.len(), 1);
        assert_eq!(p1[0].pair_id, p2[0].pair_id);
    }

    #[test]
    fn oversized_input_fails_fast() {
        let mut config = AlgorithmConfig::default();
        config.max_lines_for_detector = 1;
        let lines = vec![line("a", (0.0, 0.0), (1.0, 0.0)), line("b", (0.0, 1.0), (1.0, 1.0))];
        let err = run(&lines, &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::OversizedInput);
    }

    #[test]
    fn non_finite_coordinate_is_corrupt_upstream() {
        let lines = vec![line("a", (0.0, 0.0), (f64::NAN, 0.0)), line("b", (0.0, 1.0), (1.0, 1.0))];
        let err = run(&lines, &AlgorithmConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CorruptUpstream);
    }
}
