// SPDX-License-Identifier: MIT OR Apache-2.0
//! LOGIC_D: drop rectangles fully contained within a larger rectangle.

use wf_config::AlgorithmConfig;
use wf_core::TrimmedRectangle;
use wf_geometry::contains_oriented_quad;

fn rect_area(rect: &TrimmedRectangle) -> f64 {
    rect.trimmed_segment_a.length() * rect.thickness()
}

/// `true` if `candidate` should be dropped in favour of `other`: `other`
/// contains `candidate`, and `other` wins the area/lexicographic tie-break.
fn loses_to(candidate: &TrimmedRectangle, other: &TrimmedRectangle, tolerance_mm: f64) -> bool {
    if !contains_oriented_quad(&other.oriented_quad(), &candidate.oriented_quad(), tolerance_mm) {
        return false;
    }
    let area_candidate = rect_area(candidate);
    let area_other = rect_area(other);
    if area_other > area_candidate {
        return true;
    }
    if area_other < area_candidate {
        return false;
    }
    other.source_pair_ids < candidate.source_pair_ids
}

/// Run LOGIC_D over LOGIC_C's rectangles, preserving order among survivors.
#[must_use]
pub fn run(rectangles: &[TrimmedRectangle], config: &AlgorithmConfig) -> Vec<TrimmedRectangle> {
    let tolerance = config.containment_tolerance_mm;
    rectangles
        .iter()
        .enumerate()
        .filter(|(i, rect)| {
            !rectangles
                .iter()
                .enumerate()
                .any(|(j, other)| j != *i && loses_to(rect, other, tolerance))
        })
        .map(|(_, rect)| rect.clone())
        .collect()
}
