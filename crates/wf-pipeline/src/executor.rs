// SPDX-License-Identifier: MIT OR Apache-2.0
//! The pipeline executor: runs the eleven stages in order against a shared
//! [`Bundle`], persisting each stage's artifact and recording its metrics.
//!
//! Cancellation is a plain `AtomicBool` polled between stages (spec §5) —
//! there is no async runtime here, so there is nothing to select against.

use crate::stages;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use wf_config::AlgorithmConfig;
use wf_core::{Bundle, Entity, StageName, StageStatus};
use wf_error::{ErrorCode, PipelineError, PipelineResult};
use wf_sink::{Artifact, ArtifactSink};
use wf_telemetry::{MetricsCollector, StageMetrics};

/// Artifact name the run's aggregated stage metrics are persisted under.
/// Not named in spec §6's per-stage table; `wallforge inspect` reads it.
pub const STEP_METRICS_ARTIFACT: &str = "step_metrics.json";

/// Outcome of one executor run: the final bundle (partial, on failure) and
/// the per-stage status each stage in `StageName::ORDER` ended in.
#[derive(Debug)]
pub struct RunReport {
    /// The bundle as of the last stage that ran, successfully or not.
    pub bundle: Bundle,
    /// `(stage, status)` for every stage, in execution order.
    pub statuses: Vec<(StageName, StageStatus)>,
}

fn required<'a, T>(value: Option<&'a T>, stage: StageName, field: &str) -> PipelineResult<&'a T> {
    value.ok_or_else(|| {
        PipelineError::new(ErrorCode::CorruptUpstream, format!("required upstream field `{field}` was not set"))
            .in_stage(stage.as_str())
            .with_context("missing_field", field)
    })
}

/// Runs the eleven-stage pipeline against a single artifact sink, under a
/// single [`AlgorithmConfig`].
pub struct Executor<'a> {
    config: AlgorithmConfig,
    sink: &'a dyn ArtifactSink,
    metrics: MetricsCollector,
}

impl<'a> Executor<'a> {
    /// Build an executor against `sink`, using `config` for every stage.
    #[must_use]
    pub fn new(config: AlgorithmConfig, sink: &'a dyn ArtifactSink) -> Self {
        Self { config, sink, metrics: MetricsCollector::new() }
    }

    /// The metrics collector this executor records into. Shared across the
    /// run; inspect it after [`Executor::run`] returns (on success or
    /// failure) to get every stage invocation recorded so far.
    #[must_use]
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    fn artifact_body<T: serde::Serialize>(&self, primary_key: &str, items: &T, mut totals: BTreeMap<String, serde_json::Value>) -> serde_json::Value {
        totals.entry("count".to_string()).or_insert_with(|| serde_json::json!(0));
        let mut map = serde_json::Map::new();
        map.insert(primary_key.to_string(), serde_json::to_value(items).unwrap_or(serde_json::Value::Array(Vec::new())));
        map.insert("algorithm_config".to_string(), serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null));
        map.insert("totals".to_string(), serde_json::Value::Object(totals.into_iter().collect()));
        serde_json::Value::Object(map)
    }

    fn canvas_body(&self, canvas: &wf_core::CanvasArtifact, totals: BTreeMap<String, serde_json::Value>) -> serde_json::Value {
        let mut map = match serde_json::to_value(canvas).unwrap_or(serde_json::Value::Null) {
            serde_json::Value::Object(m) => m,
            _ => serde_json::Map::new(),
        };
        map.insert("algorithm_config".to_string(), serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null));
        map.insert("totals".to_string(), serde_json::Value::Object(totals.into_iter().collect()));
        serde_json::Value::Object(map)
    }

    fn persist(&self, job_id: uuid::Uuid, name: &str, body: &serde_json::Value) -> PipelineResult<()> {
        let bytes = serde_json::to_vec_pretty(body).map_err(|e| {
            PipelineError::new(ErrorCode::CorruptUpstream, "failed to serialize artifact body").with_source(e)
        })?;
        let artifact = Artifact { name: name.to_string(), content_type: "application/json".to_string(), bytes };
        self.sink.put(job_id, &artifact)
    }

    fn record(&self, stage: StageName, started: Instant, input_count: u64, output_count: u64, succeeded: bool) {
        self.metrics.record(StageMetrics {
            stage: stage.as_str().to_string(),
            duration_ms: started.elapsed().as_millis() as u64,
            input_count,
            output_count,
            succeeded,
        });
    }

    fn persist_metrics_snapshot(&self, job_id: uuid::Uuid) {
        let body = serde_json::json!({
            "stages": self.metrics.runs(),
            "summary": self.metrics.summary(),
        });
        // Best-effort: a failure to persist metrics must not mask the run's
        // actual outcome, so errors here are swallowed after a warn log.
        if let Err(err) = self.persist(job_id, STEP_METRICS_ARTIFACT, &body) {
            tracing::warn!(%err, "failed to persist step metrics snapshot");
        }
    }

    /// Run every stage in [`StageName::ORDER`] against a freshly seeded
    /// bundle, persisting each completed stage's artifact via the sink.
    ///
    /// On the first failed stage, every later stage is marked
    /// [`StageStatus::Skipped`], the partial bundle and status list are
    /// still returned in the error's companion [`RunReport`] is not
    /// produced; callers that need the partial bundle should call
    /// [`Executor::run_reporting`] instead.
    ///
    /// # Errors
    ///
    /// Returns the first stage's [`PipelineError`] (Extract's
    /// `INVALID_INPUT`, the detector's `OVERSIZED_INPUT`/`CORRUPT_UPSTREAM`,
    /// or `SINK_UNAVAILABLE` once the sink's own retries are exhausted).
    pub fn run(
        &self,
        job_id: uuid::Uuid,
        input_document: serde_json::Value,
        selected_layers: BTreeSet<String>,
        cancel: &AtomicBool,
    ) -> PipelineResult<Bundle> {
        self.run_reporting(job_id, input_document, selected_layers, cancel).map(|report| report.bundle)
    }

    /// As [`Executor::run`], but always returns a [`RunReport`] describing
    /// the final status of every stage, even on failure or cancellation.
    ///
    /// # Errors
    ///
    /// Same as [`Executor::run`]; the partial [`RunReport`] is attached to
    /// neither `Ok` nor `Err` on failure (the error is still the sole
    /// signal), but is fully populated in the `Ok` case.
    pub fn run_reporting(
        &self,
        job_id: uuid::Uuid,
        input_document: serde_json::Value,
        selected_layers: BTreeSet<String>,
        cancel: &AtomicBool,
    ) -> PipelineResult<RunReport> {
        let mut bundle = Bundle::new(input_document, selected_layers);
        let mut statuses = Vec::with_capacity(StageName::ORDER.len());

        for (index, &stage) in StageName::ORDER.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                for &remaining in &StageName::ORDER[index..] {
                    statuses.push((remaining, StageStatus::Cancelled));
                }
                self.persist_metrics_snapshot(job_id);
                return Err(PipelineError::new(ErrorCode::Cancelled, "run cancelled before stage start")
                    .in_stage(stage.as_str()));
            }

            let started = Instant::now();
            let outcome = self.run_stage(job_id, stage, &mut bundle);

            match outcome {
                Ok(()) => {
                    statuses.push((stage, StageStatus::Completed));
                }
                Err(err) => {
                    self.record(stage, started, 0, 0, false);
                    statuses.push((stage, StageStatus::Failed));
                    for &remaining in &StageName::ORDER[(index + 1)..] {
                        statuses.push((remaining, StageStatus::Skipped));
                    }
                    self.persist_metrics_snapshot(job_id);
                    tracing::error!(%err, stage = stage.as_str(), "stage failed, skipping remaining stages");
                    return Err(err);
                }
            }
        }

        self.persist_metrics_snapshot(job_id);
        Ok(RunReport { bundle, statuses })
    }

    /// Run a single stage, writing its output into `bundle` and persisting
    /// its artifact. Metrics for the successful case are recorded here;
    /// the caller records the failure case (it already has `started`).
    fn run_stage(&self, job_id: uuid::Uuid, stage: StageName, bundle: &mut Bundle) -> PipelineResult<()> {
        let started = Instant::now();

        match stage {
            StageName::Extract => {
                let out = stages::extract::run(&bundle.input_document, &bundle.selected_layers, &self.config)?;
                let totals = BTreeMap::from([
                    ("count".to_string(), serde_json::json!(out.entities.len())),
                    ("door_blocks".to_string(), serde_json::json!(out.door_blocks.len())),
                    ("window_blocks".to_string(), serde_json::json!(out.window_blocks.len())),
                ]);
                let body = self.artifact_body("entities", &out.entities, totals);
                self.persist(job_id, stage.artifact_name(), &body)?;
                let output_count = out.entities.len() as u64;
                bundle.set_extract(out);
                self.record(stage, started, 0, output_count, true);
            }
            StageName::Normalize => {
                let input = required(bundle.extract(), stage, "extract")?;
                let input_count = input.entities.len() as u64;
                let out = stages::normalize::run(&input.entities, &self.config);
                let totals = BTreeMap::from([
                    ("count".to_string(), serde_json::json!(out.entities.len())),
                    ("degenerate_lines_dropped".to_string(), serde_json::json!(out.counters.degenerate_lines_dropped)),
                    ("degenerate_segments_dropped".to_string(), serde_json::json!(out.counters.degenerate_segments_dropped)),
                    ("polyline_segments_emitted".to_string(), serde_json::json!(out.counters.polyline_segments_emitted)),
                ]);
                let body = self.artifact_body("entities", &out.entities, totals);
                self.persist(job_id, stage.artifact_name(), &body)?;
                let output_count = out.entities.len() as u64;
                bundle.set_normalize(out);
                self.record(stage, started, input_count, output_count, true);
            }
            StageName::CleanDedup => {
                let input = required(bundle.normalize(), stage, "normalize")?;
                let input_count = input.entities.len() as u64;
                let out = stages::clean_dedup::run(&input.entities);
                let totals = BTreeMap::from([
                    ("entities_in".to_string(), serde_json::json!(out.canvas.statistics.entities_in)),
                    ("entities_out".to_string(), serde_json::json!(out.canvas.statistics.entities_out)),
                    ("duplicates_removed".to_string(), serde_json::json!(out.canvas.statistics.duplicates_removed)),
                ]);
                let body = self.canvas_body(&out.canvas, totals);
                self.persist(job_id, stage.artifact_name(), &body)?;
                let output_count = out.entities.len() as u64;
                bundle.set_clean_dedup(out);
                self.record(stage, started, input_count, output_count, true);
            }
            StageName::ParallelNaive => {
                let input = required(bundle.clean_dedup(), stage, "clean_dedup")?;
                let input_count = input.entities.len() as u64;
                let out = stages::parallel_naive::run(&input.entities);
                let totals = BTreeMap::from([
                    ("count".to_string(), serde_json::json!(out.flat_entities.len())),
                    ("layers".to_string(), serde_json::json!(out.layers.len())),
                ]);
                let body = self.artifact_body("layers", &out.layers, totals);
                self.persist(job_id, stage.artifact_name(), &body)?;
                let output_count = out.flat_entities.len() as u64;
                bundle.set_parallel_naive(out);
                self.record(stage, started, input_count, output_count, true);
            }
            StageName::WallCandidateDetector => {
                let input = required(bundle.parallel_naive(), stage, "parallel_naive")?;
                let lines = flat_lines(&input.flat_entities);
                let input_count = lines.len() as u64;
                let out = stages::detector::run(&lines, &self.config)?;
                let totals = BTreeMap::from([("count".to_string(), serde_json::json!(out.len()))]);
                let body = self.artifact_body("candidates", &out, totals);
                self.persist(job_id, stage.artifact_name(), &body)?;
                let output_count = out.len() as u64;
                bundle.set_wall_candidates(out);
                self.record(stage, started, input_count, output_count, true);
            }
            StageName::LogicB => {
                let pairs = required(bundle.wall_candidates(), stage, "wall_candidates")?;
                let input_count = pairs.len() as u64;
                let out = stages::logic_b::run(pairs);
                let totals = BTreeMap::from([("count".to_string(), serde_json::json!(out.len()))]);
                let body = self.artifact_body("rectangles", &out, totals);
                self.persist(job_id, stage.artifact_name(), &body)?;
                let output_count = out.len() as u64;
                bundle.set_logic_b(out);
                self.record(stage, started, input_count, output_count, true);
            }
            StageName::LogicC => {
                let rectangles = required(bundle.logic_b(), stage, "logic_b")?;
                let pairs = required(bundle.wall_candidates(), stage, "wall_candidates")?;
                let parallel_naive = required(bundle.parallel_naive(), stage, "parallel_naive")?;
                let lines = flat_lines(&parallel_naive.flat_entities);
                let input_count = rectangles.len() as u64;
                let out = stages::logic_c::run(rectangles, pairs, &lines);
                let totals = BTreeMap::from([("count".to_string(), serde_json::json!(out.len()))]);
                let body = self.artifact_body("rectangles", &out, totals);
                self.persist(job_id, stage.artifact_name(), &body)?;
                let output_count = out.len() as u64;
                bundle.set_logic_c(out);
                self.record(stage, started, input_count, output_count, true);
            }
            StageName::LogicD => {
                let rectangles = required(bundle.logic_c(), stage, "logic_c")?;
                let input_count = rectangles.len() as u64;
                let out = stages::logic_d::run(rectangles, &self.config);
                let totals = BTreeMap::from([("count".to_string(), serde_json::json!(out.len()))]);
                let body = self.artifact_body("rectangles", &out, totals);
                self.persist(job_id, stage.artifact_name(), &body)?;
                let output_count = out.len() as u64;
                bundle.set_logic_d(out);
                self.record(stage, started, input_count, output_count, true);
            }
            StageName::LogicE => {
                let rectangles = required(bundle.logic_d(), stage, "logic_d")?;
                let input_count = rectangles.len() as u64;
                let out = stages::logic_e::run(rectangles, &self.config);
                let totals = BTreeMap::from([("count".to_string(), serde_json::json!(out.len()))]);
                let body = self.artifact_body("rectangles", &out, totals);
                self.persist(job_id, stage.artifact_name(), &body)?;
                let output_count = out.len() as u64;
                bundle.set_logic_e(out);
                self.record(stage, started, input_count, output_count, true);
            }
            StageName::DoorRectangleAssignment => {
                let rectangles = required(bundle.logic_e(), stage, "logic_e")?;
                let extract = required(bundle.extract(), stage, "extract")?;
                let input_count = extract.door_blocks.len() as u64;
                let out = stages::door_rectangle_assignment::run(rectangles, &extract.door_blocks, &self.config);
                let totals = BTreeMap::from([
                    ("count".to_string(), serde_json::json!(out.assignments.len())),
                    ("unassigned".to_string(), serde_json::json!(out.counters.unassigned)),
                ]);
                let body = self.artifact_body("assignments", &out.assignments, totals);
                self.persist(job_id, stage.artifact_name(), &body)?;
                let output_count = out.assignments.len() as u64;
                bundle.set_door_assignment(out);
                self.record(stage, started, input_count, output_count, true);
            }
            StageName::DoorBridge => {
                let assignments = required(bundle.door_assignment(), stage, "door_assignment")?;
                let rectangles = required(bundle.logic_e(), stage, "logic_e")?;
                let input_count = assignments.assignments.len() as u64;
                let out = stages::door_bridge::run(&assignments.assignments, rectangles, &self.config);
                let totals = BTreeMap::from([("count".to_string(), serde_json::json!(out.len()))]);
                let body = self.artifact_body("bridges", &out, totals);
                self.persist(job_id, stage.artifact_name(), &body)?;
                let output_count = out.len() as u64;
                bundle.set_door_bridge(out);
                self.record(stage, started, input_count, output_count, true);
            }
            StageName::WallCandidatesPlaceholder => {
                let candidates = required(bundle.wall_candidates(), stage, "wall_candidates")?;
                let input_count = candidates.len() as u64;
                let out = stages::wall_candidates_placeholder::run(candidates);
                let totals = BTreeMap::from([("count".to_string(), serde_json::json!(out.len()))]);
                let body = self.artifact_body("candidates", &out, totals);
                self.persist(job_id, stage.artifact_name(), &body)?;
                let output_count = out.len() as u64;
                bundle.set_wall_candidates_placeholder(out);
                self.record(stage, started, input_count, output_count, true);
            }
        }

        Ok(())
    }
}

fn flat_lines(entities: &[Entity]) -> Vec<wf_core::Line> {
    entities.iter().filter_map(Entity::as_line).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_sink::InMemoryArtifactSink;

    fn sample_document() -> serde_json::Value {
        serde_json::json!({
            "layers": {
                "A-WALL": {
                    "entities": [
                        {"type": "LINE", "start": {"x": 0.0, "y": 0.0}, "end": {"x": 1000.0, "y": 0.0}},
                        {"type": "LINE", "start": {"x": 0.0, "y": 100.0}, "end": {"x": 1000.0, "y": 100.0}}
                    ]
                }
            }
        })
    }

    #[test]
    fn full_run_completes_every_stage() {
        let sink = InMemoryArtifactSink::new();
        let executor = Executor::new(AlgorithmConfig::default(), &sink);
        let job_id = uuid::Uuid::new_v4();
        let mut layers = BTreeSet::new();
        layers.insert("A-WALL".to_string());
        let report = executor.run_reporting(job_id, sample_document(), layers, &AtomicBool::new(false)).unwrap();
        assert!(report.statuses.iter().all(|(_, status)| *status == StageStatus::Completed));
        assert_eq!(report.bundle.logic_e().unwrap().len(), 1);
    }

    #[test]
    fn invalid_input_stops_at_extract_and_skips_the_rest() {
        let sink = InMemoryArtifactSink::new();
        let executor = Executor::new(AlgorithmConfig::default(), &sink);
        let job_id = uuid::Uuid::new_v4();
        let err = executor.run(job_id, sample_document(), BTreeSet::new(), &AtomicBool::new(false)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn cancellation_before_first_stage_is_reported() {
        let sink = InMemoryArtifactSink::new();
        let executor = Executor::new(AlgorithmConfig::default(), &sink);
        let job_id = uuid::Uuid::new_v4();
        let mut layers = BTreeSet::new();
        layers.insert("A-WALL".to_string());
        let err = executor.run(job_id, sample_document(), layers, &AtomicBool::new(true)).unwrap_err();
        assert_eq!(err.code, ErrorCode::Cancelled);
    }

    #[test]
    fn metrics_are_recorded_for_every_completed_stage() {
        let sink = InMemoryArtifactSink::new();
        let executor = Executor::new(AlgorithmConfig::default(), &sink);
        let job_id = uuid::Uuid::new_v4();
        let mut layers = BTreeSet::new();
        layers.insert("A-WALL".to_string());
        executor.run(job_id, sample_document(), layers, &AtomicBool::new(false)).unwrap();
        assert_eq!(executor.metrics().len(), StageName::ORDER.len());
    }
}
