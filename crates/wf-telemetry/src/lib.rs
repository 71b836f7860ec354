// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structured telemetry and metrics collection for pipeline runs.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::info;

// ---------------------------------------------------------------------------
// StageMetrics
// ---------------------------------------------------------------------------

/// Metrics captured for a single stage invocation within a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StageMetrics {
    /// Stable stage name (`StageName::as_str`).
    pub stage: String,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Number of items the stage consumed (meaning is stage-specific).
    pub input_count: u64,
    /// Number of items the stage emitted.
    pub output_count: u64,
    /// `true` if the stage completed without error.
    pub succeeded: bool,
}

// ---------------------------------------------------------------------------
// RunMetricsSummary
// ---------------------------------------------------------------------------

/// Aggregated statistics across every stage invocation recorded for a run
/// (or across many runs, if the same collector is reused).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunMetricsSummary {
    /// Number of stage invocations recorded.
    pub count: usize,
    /// Mean stage duration in milliseconds.
    pub mean_duration_ms: f64,
    /// Median (p50) stage duration in milliseconds.
    pub p50_duration_ms: f64,
    /// 99th-percentile stage duration in milliseconds.
    pub p99_duration_ms: f64,
    /// Count of failed stage invocations.
    pub failures: usize,
    /// Per-stage invocation counts (deterministic ordering).
    pub stage_counts: BTreeMap<String, usize>,
}

impl Default for RunMetricsSummary {
    fn default() -> Self {
        Self {
            count: 0,
            mean_duration_ms: 0.0,
            p50_duration_ms: 0.0,
            p99_duration_ms: 0.0,
            failures: 0,
            stage_counts: BTreeMap::new(),
        }
    }
}

/// Compute a percentile value from a **sorted** slice.
fn percentile(sorted: &[u64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0] as f64;
    }
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] as f64 * (1.0 - frac) + sorted[upper] as f64 * frac
}

// ---------------------------------------------------------------------------
// MetricsCollector
// ---------------------------------------------------------------------------

/// Thread-safe collector for stage metrics.
///
/// Wrap in an `Arc` to share across threads (the inner storage is already
/// behind a `Mutex`); the executor records one [`StageMetrics`] per stage
/// invocation as the run progresses.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<Vec<StageMetrics>>>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// Create a new, empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Record a completed stage invocation.
    pub fn record(&self, metrics: StageMetrics) {
        let mut data = self.inner.lock().expect("metrics lock poisoned");
        data.push(metrics);
    }

    /// Return all recorded stage metrics, in recording order.
    #[must_use]
    pub fn runs(&self) -> Vec<StageMetrics> {
        let data = self.inner.lock().expect("metrics lock poisoned");
        data.clone()
    }

    /// Number of stage invocations recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        let data = self.inner.lock().expect("metrics lock poisoned");
        data.len()
    }

    /// Whether the collector has no recorded invocations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compute an aggregated summary of all recorded invocations.
    #[must_use]
    pub fn summary(&self) -> RunMetricsSummary {
        let data = self.inner.lock().expect("metrics lock poisoned");
        if data.is_empty() {
            return RunMetricsSummary::default();
        }

        let count = data.len();
        let mut durations: Vec<u64> = data.iter().map(|m| m.duration_ms).collect();
        durations.sort_unstable();

        let total_duration: u64 = durations.iter().sum();
        let mean_duration_ms = total_duration as f64 / count as f64;
        let p50_duration_ms = percentile(&durations, 50.0);
        let p99_duration_ms = percentile(&durations, 99.0);

        let failures = data.iter().filter(|m| !m.succeeded).count();

        let mut stage_counts: BTreeMap<String, usize> = BTreeMap::new();
        for m in data.iter() {
            *stage_counts.entry(m.stage.clone()).or_insert(0) += 1;
        }

        RunMetricsSummary {
            count,
            mean_duration_ms,
            p50_duration_ms,
            p99_duration_ms,
            failures,
            stage_counts,
        }
    }

    /// Clear all recorded metrics.
    pub fn clear(&self) {
        let mut data = self.inner.lock().expect("metrics lock poisoned");
        data.clear();
    }
}

// ---------------------------------------------------------------------------
// TelemetrySpan
// ---------------------------------------------------------------------------

/// A structured span emitted through `tracing` for external log collectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySpan {
    /// Span name (typically the stage name).
    pub name: String,
    /// Arbitrary key-value attributes (deterministic ordering).
    pub attributes: BTreeMap<String, String>,
}

impl TelemetrySpan {
    /// Create a new span with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), attributes: BTreeMap::new() }
    }

    /// Insert an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Emit the span via `tracing::info!`.
    pub fn emit(&self) {
        info!(span_name = %self.name, attributes = ?self.attributes, "stage_span");
    }
}
