// SPDX-License-Identifier: MIT OR Apache-2.0
//! The typed, append-only bundle threaded through the pipeline executor.
//!
//! This replaces a free-form `stage_name -> serde_json::Value` dictionary
//! with one concrete field per stage. There is no map to index into, so a
//! stage reaching for an upstream key that was never produced is a compile
//! error, not a runtime lookup failure. The executor is the sole mutator:
//! every stage receives `&Bundle` and returns its own output value, which
//! the executor appends via the matching `set_*` method.

use crate::candidate::{CandidatePair, TrimmedRectangle};
use crate::door::DoorBridge;
use crate::stage_output::{
    CleanDedupOutput, DoorAssignmentOutput, ExtractOutput, NormalizeOutput, ParallelNaiveOutput,
};
use std::collections::BTreeSet;

/// The ten pipeline stages, in their fixed execution order.
///
/// `WALL_CANDIDATES_PLACEHOLDER` is last and carries no detection logic of
/// its own; it exists for pipeline-slot completeness (spec §4.13).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageName {
    /// Walk the input document, emit typed entities for selected layers.
    Extract,
    /// Round coordinates, explode polylines, drop degenerate geometry.
    Normalize,
    /// Content-hash entities, drop exact duplicates, emit the canvas artifact.
    CleanDedup,
    /// Group by layer, compute per-layer bounding boxes, flatten.
    ParallelNaive,
    /// O(n²) pairwise test over lines; emit candidate wall pairs.
    WallCandidateDetector,
    /// Trim each pair to its shared longitudinal overlap.
    LogicB,
    /// Drop pairs whose corridor contains a third, intervening line.
    LogicC,
    /// Drop rectangles fully contained within a larger rectangle.
    LogicD,
    /// Band-merge collinear, co-thickness rectangles end-to-end.
    LogicE,
    /// Snap door blocks onto the nearest qualifying wall rectangle.
    DoorRectangleAssignment,
    /// Build bridge rectangles that close each assigned door's opening.
    DoorBridge,
    /// Echo the detector output into the final wall-candidates artifact.
    WallCandidatesPlaceholder,
}

impl StageName {
    /// The fixed execution order of all ten (eleven, including the
    /// placeholder) stages.
    pub const ORDER: [StageName; 11] = [
        StageName::Extract,
        StageName::Normalize,
        StageName::CleanDedup,
        StageName::ParallelNaive,
        StageName::WallCandidateDetector,
        StageName::LogicB,
        StageName::LogicC,
        StageName::LogicD,
        StageName::LogicE,
        StageName::DoorRectangleAssignment,
        StageName::DoorBridge,
        StageName::WallCandidatesPlaceholder,
    ];

    /// Stable lower_snake_case name, used in logs, metrics, and artifact keys.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Normalize => "normalize",
            Self::CleanDedup => "clean_dedup",
            Self::ParallelNaive => "parallel_naive",
            Self::WallCandidateDetector => "wall_candidate_detector",
            Self::LogicB => "logic_b",
            Self::LogicC => "logic_c",
            Self::LogicD => "logic_d",
            Self::LogicE => "logic_e",
            Self::DoorRectangleAssignment => "door_rectangle_assignment",
            Self::DoorBridge => "door_bridge",
            Self::WallCandidatesPlaceholder => "wall_candidates_placeholder",
        }
    }

    /// The fixed artifact file name this stage's result is persisted under.
    #[must_use]
    pub fn artifact_name(&self) -> &'static str {
        match self {
            Self::Extract => "extract_step_results.json",
            Self::Normalize => "normalize_step_results.json",
            Self::CleanDedup => "canvas_data.json",
            Self::ParallelNaive => "parallel_naive_step_results.json",
            Self::WallCandidateDetector => "wall_candidate_pairs.json",
            Self::LogicB => "logic_b_pairs.json",
            Self::LogicC => "logic_c_pairs.json",
            Self::LogicD => "logic_d_rectangles.json",
            Self::LogicE => "logic_e_rectangles.json",
            Self::DoorRectangleAssignment => "door_rectangle_assignments.json",
            Self::DoorBridge => "door_bridges.json",
            Self::WallCandidatesPlaceholder => "wall_candidates_placeholder_results.json",
        }
    }
}

/// Outcome of a single stage invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// The stage ran to completion and its output was persisted.
    Completed,
    /// The stage raised a fatal error; the executor stopped the run.
    Failed,
    /// The stage never ran because an earlier stage failed or was cancelled.
    Skipped,
    /// Cooperative shutdown was requested before this stage started.
    Cancelled,
}

/// The append-only data bundle. Seeded with the input document and the
/// selected-layer set; every subsequent field is written exactly once, by
/// the executor, after the matching stage completes.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    /// Raw input document, as given to Extract.
    pub input_document: serde_json::Value,
    /// Layer names selected for processing.
    pub selected_layers: BTreeSet<String>,

    extract: Option<ExtractOutput>,
    normalize: Option<NormalizeOutput>,
    clean_dedup: Option<CleanDedupOutput>,
    parallel_naive: Option<ParallelNaiveOutput>,
    wall_candidates: Option<Vec<CandidatePair>>,
    logic_b: Option<Vec<TrimmedRectangle>>,
    logic_c: Option<Vec<TrimmedRectangle>>,
    logic_d: Option<Vec<TrimmedRectangle>>,
    logic_e: Option<Vec<TrimmedRectangle>>,
    door_assignment: Option<DoorAssignmentOutput>,
    door_bridge: Option<Vec<DoorBridge>>,
    wall_candidates_placeholder: Option<Vec<CandidatePair>>,
}

macro_rules! bundle_field {
    ($field:ident, $ty:ty, $getter:ident, $setter:ident) => {
        #[doc = concat!("Read the `", stringify!($field), "` stage output, if it has run.")]
        #[must_use]
        pub fn $getter(&self) -> Option<&$ty> {
            self.$field.as_ref()
        }

        #[doc = concat!("Append the `", stringify!($field), "` stage output. Exclusively called by the executor.")]
        pub fn $setter(&mut self, value: $ty) {
            debug_assert!(
                self.$field.is_none(),
                concat!(stringify!($field), " was already set on this bundle")
            );
            self.$field = Some(value);
        }
    };
}

impl Bundle {
    /// Create a fresh bundle seeded with the input document and selected layers.
    #[must_use]
    pub fn new(input_document: serde_json::Value, selected_layers: BTreeSet<String>) -> Self {
        Self { input_document, selected_layers, ..Default::default() }
    }

    bundle_field!(extract, ExtractOutput, extract, set_extract);
    bundle_field!(normalize, NormalizeOutput, normalize, set_normalize);
    bundle_field!(clean_dedup, CleanDedupOutput, clean_dedup, set_clean_dedup);
    bundle_field!(parallel_naive, ParallelNaiveOutput, parallel_naive, set_parallel_naive);
    bundle_field!(wall_candidates, Vec<CandidatePair>, wall_candidates, set_wall_candidates);
    bundle_field!(logic_b, Vec<TrimmedRectangle>, logic_b, set_logic_b);
    bundle_field!(logic_c, Vec<TrimmedRectangle>, logic_c, set_logic_c);
    bundle_field!(logic_d, Vec<TrimmedRectangle>, logic_d, set_logic_d);
    bundle_field!(logic_e, Vec<TrimmedRectangle>, logic_e, set_logic_e);
    bundle_field!(door_assignment, DoorAssignmentOutput, door_assignment, set_door_assignment);
    bundle_field!(door_bridge, Vec<DoorBridge>, door_bridge, set_door_bridge);
    bundle_field!(
        wall_candidates_placeholder,
        Vec<CandidatePair>,
        wall_candidates_placeholder,
        set_wall_candidates_placeholder
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_matches_spec() {
        let names: Vec<&str> = StageName::ORDER.iter().map(StageName::as_str).collect();
        assert_eq!(
            names,
            vec![
                "extract",
                "normalize",
                "clean_dedup",
                "parallel_naive",
                "wall_candidate_detector",
                "logic_b",
                "logic_c",
                "logic_d",
                "logic_e",
                "door_rectangle_assignment",
                "door_bridge",
                "wall_candidates_placeholder",
            ]
        );
    }

    #[test]
    fn unset_field_reads_as_none() {
        let bundle = Bundle::new(serde_json::json!({}), BTreeSet::new());
        assert!(bundle.extract().is_none());
    }

    #[test]
    #[should_panic(expected = "already set")]
    fn double_set_panics_in_debug() {
        let mut bundle = Bundle::new(serde_json::json!({}), BTreeSet::new());
        bundle.set_wall_candidates(Vec::new());
        bundle.set_wall_candidates(Vec::new());
    }
}
