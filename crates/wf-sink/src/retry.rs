// SPDX-License-Identifier: MIT OR Apache-2.0
//! Synchronous exponential backoff with jitter, wrapping an [`ArtifactSink`]
//! so a transient write failure retries before surfacing
//! [`ErrorCode::SinkUnavailable`] to the executor.

use crate::{Artifact, ArtifactSink};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;
use wf_error::{ErrorCode, PipelineError, PipelineResult};

/// Backoff configuration for [`RetryingSink`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial attempt.
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Maximum delay cap for exponential backoff.
    pub max_delay: Duration,
    /// Jitter factor in `[0.0, 1.0]`; `0` disables jitter.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
            jitter_factor: 0.5,
        }
    }
}

/// Diagnostic record of how many attempts a `put` took.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetryMetadata {
    /// Total attempts made, including the successful (or final failing) one.
    pub total_attempts: u32,
    /// Wall-clock time spanning all attempts.
    pub total_duration: Duration,
}

fn compute_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exp = 2u64.saturating_pow(attempt);
    let nominal_ms = (config.base_delay.as_millis() as u64).saturating_mul(exp);
    let capped_ms = nominal_ms.min(config.max_delay.as_millis() as u64);

    let jitter_factor = config.jitter_factor.clamp(0.0, 1.0);
    if jitter_factor <= 0.0 || capped_ms == 0 {
        return Duration::from_millis(capped_ms);
    }
    let jitter_range = (capped_ms as f64 * jitter_factor) as u64;
    let jitter = if jitter_range > 0 { rand::thread_rng().gen_range(0..=jitter_range) } else { 0 };
    Duration::from_millis(capped_ms.saturating_sub(jitter))
}

/// Decorates an [`ArtifactSink`] with synchronous retry-with-backoff on
/// `put`. `get` is passed through unmodified: a missing or unreadable
/// artifact on read is not a condition retrying can fix.
pub struct RetryingSink<S> {
    inner: S,
    config: RetryConfig,
}

impl<S: ArtifactSink> RetryingSink<S> {
    /// Wrap `inner` with the given retry configuration.
    #[must_use]
    pub fn new(inner: S, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// `put`, retrying on [`ErrorCode::SinkUnavailable`] up to
    /// `config.max_retries` additional times, and report how many attempts
    /// it took.
    ///
    /// # Errors
    ///
    /// Returns the last [`PipelineError`] once retries are exhausted.
    pub fn put_with_metadata(&self, job_id: Uuid, artifact: &Artifact) -> PipelineResult<RetryMetadata> {
        let start = Instant::now();
        let max_attempts = self.config.max_retries + 1;

        for attempt in 0..max_attempts {
            match self.inner.put(job_id, artifact) {
                Ok(()) => {
                    return Ok(RetryMetadata { total_attempts: attempt + 1, total_duration: start.elapsed() });
                }
                Err(err) if err.code == ErrorCode::SinkUnavailable => {
                    let is_last = attempt + 1 >= max_attempts;
                    if is_last {
                        warn!(target: "wf_sink.retry", %err, attempt, "max retries exhausted");
                        return Err(err);
                    }
                    let delay = compute_delay(&self.config, attempt);
                    debug!(target: "wf_sink.retry", %err, attempt, delay_ms = delay.as_millis() as u64, "retrying");
                    std::thread::sleep(delay);
                }
                Err(err) => return Err(err),
            }
        }
        Err(PipelineError::new(ErrorCode::SinkUnavailable, "retry loop exited without a result"))
    }
}

impl<S: ArtifactSink> ArtifactSink for RetryingSink<S> {
    fn put(&self, job_id: Uuid, artifact: &Artifact) -> PipelineResult<()> {
        self.put_with_metadata(job_id, artifact).map(|_| ())
    }

    fn get(&self, job_id: Uuid, name: &str) -> PipelineResult<Option<Vec<u8>>> {
        self.inner.get(job_id, name)
    }
}
