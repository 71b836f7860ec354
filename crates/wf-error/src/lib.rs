// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Unified error taxonomy for the wall-geometry pipeline.
//!
//! Every error a stage can surface carries an [`ErrorCode`] (a stable,
//! machine-readable tag), a human-readable message, an optional source, and
//! a structured context map. Only four kinds ever reach the executor:
//! [`ErrorCode::InvalidInput`], [`ErrorCode::OversizedInput`],
//! [`ErrorCode::CorruptUpstream`], and [`ErrorCode::SinkUnavailable`] after
//! retries are exhausted. Per-entity drops (degenerate geometry, unhashable
//! blocks) are counted in stage metrics, never raised here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code.
///
/// Serialises to `SCREAMING_SNAKE_CASE`, matching spec's error-kind names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input document could not be parsed, or the selected-layer set is empty.
    InvalidInput,
    /// Line count at the detector stage exceeded the configured safety cap.
    OversizedInput,
    /// A required upstream bundle field was missing or of the wrong shape.
    CorruptUpstream,
    /// The artifact sink failed after the configured number of retries.
    SinkUnavailable,
    /// Cooperative shutdown requested between stages.
    Cancelled,
}

impl ErrorCode {
    /// Broad family this code belongs to, for log grouping and dashboards.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidInput => "input",
            Self::OversizedInput => "input",
            Self::CorruptUpstream => "internal",
            Self::SinkUnavailable => "io",
            Self::Cancelled => "lifecycle",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::OversizedInput => "OVERSIZED_INPUT",
            Self::CorruptUpstream => "CORRUPT_UPSTREAM",
            Self::SinkUnavailable => "SINK_UNAVAILABLE",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// A classified pipeline error: stable code, message, cause, and context.
///
/// The user-visible failure surface is terse by design (code + stage name);
/// full diagnostic detail belongs in the context map and the step-metrics
/// artifact, not in the error message shown to a caller.
pub struct PipelineError {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Name of the stage that raised this error, if any.
    pub stage: Option<String>,
    /// Optional underlying cause.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Arbitrary structured context for diagnostics (entity ids, counts, ...).
    pub context: BTreeMap<String, serde_json::Value>,
}

impl PipelineError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            stage: None,
            source: None,
            context: BTreeMap::new(),
        }
    }

    /// Record the stage that raised this error.
    #[must_use]
    pub fn in_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Attach a key-value pair to the diagnostic context.
    ///
    /// The value is converted via [`serde_json::to_value`]; if serialisation
    /// fails, the entry is silently skipped (diagnostics must never panic).
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Shorthand for `self.code.category()`.
    #[must_use]
    pub fn category(&self) -> &'static str {
        self.code.category()
    }
}

impl fmt::Debug for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("PipelineError");
        d.field("code", &self.code);
        d.field("message", &self.message);
        if let Some(ref stage) = self.stage {
            d.field("stage", stage);
        }
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        if !self.context.is_empty() {
            d.field("context", &self.context);
        }
        d.finish()
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stage {
            Some(stage) => write!(f, "[{}] {stage}: {}", self.code, self.message),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Serializable view of a [`PipelineError`] for embedding in step-metrics
/// artifacts (the non-serializable `dyn Error` source is flattened to text).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineErrorDto {
    /// Error code.
    pub code: ErrorCode,
    /// Stage that raised the error, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Structured context.
    pub context: BTreeMap<String, serde_json::Value>,
    /// String representation of the source error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_message: Option<String>,
}

impl From<&PipelineError> for PipelineErrorDto {
    fn from(err: &PipelineError) -> Self {
        Self {
            code: err.code,
            stage: err.stage.clone(),
            message: err.message.clone(),
            context: err.context.clone(),
            source_message: err.source.as_ref().map(|s| s.to_string()),
        }
    }
}

/// Convenience alias used throughout stage implementations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_stage() {
        let err = PipelineError::new(ErrorCode::OversizedInput, "too many lines")
            .in_stage("wall_candidate_detector")
            .with_context("line_count", 123_456usize);
        let rendered = err.to_string();
        assert!(rendered.contains("OVERSIZED_INPUT"));
        assert!(rendered.contains("wall_candidate_detector"));
        assert_eq!(err.context["line_count"], serde_json::json!(123_456));
    }

    #[test]
    fn dto_flattens_source_to_text() {
        let io_err = std::io::Error::other("disk full");
        let err = PipelineError::new(ErrorCode::SinkUnavailable, "put failed").with_source(io_err);
        let dto = PipelineErrorDto::from(&err);
        assert_eq!(dto.code, ErrorCode::SinkUnavailable);
        assert!(dto.source_message.unwrap().contains("disk full"));
    }

    #[test]
    fn category_groups_codes() {
        assert_eq!(ErrorCode::InvalidInput.category(), "input");
        assert_eq!(ErrorCode::OversizedInput.category(), "input");
        assert_eq!(ErrorCode::CorruptUpstream.category(), "internal");
        assert_eq!(ErrorCode::SinkUnavailable.category(), "io");
        assert_eq!(ErrorCode::Cancelled.category(), "lifecycle");
    }
}
