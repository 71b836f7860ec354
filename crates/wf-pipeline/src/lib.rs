// SPDX-License-Identifier: MIT OR Apache-2.0
//! The ten/eleven-stage deterministic wall-geometry pipeline.
//!
//! [`executor::Executor`] runs the stages in [`wf_core::StageName::ORDER`]
//! against a freshly seeded [`wf_core::Bundle`], persisting each stage's
//! artifact via an [`wf_sink::ArtifactSink`] and recording
//! [`wf_telemetry::StageMetrics`] along the way. [`input`] parses the raw
//! JSON input document described in spec §6; [`stages`] holds one module
//! per stage, each a pure `fn(..) -> Output` (or `-> PipelineResult<Output>`
//! for the two stages that can fail).
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// The pipeline executor and its run report.
pub mod executor;
/// Parsing of the raw JSON input document.
pub mod input;
/// One module per pipeline stage, in execution order.
pub mod stages;

pub use executor::{Executor, RunReport, STEP_METRICS_ARTIFACT};
