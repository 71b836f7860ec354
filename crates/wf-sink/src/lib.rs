// SPDX-License-Identifier: MIT OR Apache-2.0
//! Artifact persistence for the pipeline executor.
//!
//! [`ArtifactSink`] is the single abstraction every stage's output is
//! written through; [`FsArtifactSink`] and [`InMemoryArtifactSink`] are the
//! two concrete implementations, and [`RetryingSink`] wraps either one with
//! exponential backoff so a transient write failure doesn't fail the whole
//! run. The pipeline runs synchronously, so retries block the calling
//! thread rather than awaiting — there is no async runtime in this crate.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod retry;

pub use retry::{RetryConfig, RetryMetadata, RetryingSink};

use std::collections::BTreeMap;
use std::sync::Mutex;
use uuid::Uuid;
use wf_error::{ErrorCode, PipelineError, PipelineResult};

/// A named, typed byte blob produced by a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Logical artifact name (e.g. `wall_candidate_pairs.json`).
    pub name: String,
    /// MIME-ish content type (always `application/json` today).
    pub content_type: String,
    /// Serialized bytes.
    pub bytes: Vec<u8>,
}

/// Destination for persisted run artifacts.
///
/// `put` must be idempotent: writing the same `(job_id, name)` twice with
/// the same bytes must not be observably different from writing it once,
/// since a retried stage after a sink hiccup may re-attempt a write whose
/// first attempt actually landed.
pub trait ArtifactSink: Send + Sync {
    /// Persist `artifact` under `job_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::SinkUnavailable`] if the underlying storage
    /// could not be written to.
    fn put(&self, job_id: Uuid, artifact: &Artifact) -> PipelineResult<()>;

    /// Retrieve a previously persisted artifact's bytes, if present.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::SinkUnavailable`] if the underlying storage
    /// could not be read.
    fn get(&self, job_id: Uuid, name: &str) -> PipelineResult<Option<Vec<u8>>>;
}

// ---------------------------------------------------------------------------
// FsArtifactSink
// ---------------------------------------------------------------------------

/// Filesystem-backed sink: one directory per job under `root`.
#[derive(Debug)]
pub struct FsArtifactSink {
    root: std::path::PathBuf,
}

impl FsArtifactSink {
    /// Create a sink rooted at the given directory. The directory need not
    /// exist yet; it is created on first write.
    #[must_use]
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn job_dir(&self, job_id: Uuid) -> std::path::PathBuf {
        self.root.join(job_id.to_string())
    }
}

impl ArtifactSink for FsArtifactSink {
    fn put(&self, job_id: Uuid, artifact: &Artifact) -> PipelineResult<()> {
        let dir = self.job_dir(job_id);
        std::fs::create_dir_all(&dir)
            .map_err(|e| {
                PipelineError::new(ErrorCode::SinkUnavailable, "failed to create artifact directory")
                    .with_context("path", dir.display().to_string())
                    .with_source(e)
            })?;
        let path = dir.join(&artifact.name);
        std::fs::write(&path, &artifact.bytes).map_err(|e| {
            PipelineError::new(ErrorCode::SinkUnavailable, "failed to write artifact")
                .with_context("path", path.display().to_string())
                .with_source(e)
        })
    }

    fn get(&self, job_id: Uuid, name: &str) -> PipelineResult<Option<Vec<u8>>> {
        let path = self.job_dir(job_id).join(name);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PipelineError::new(ErrorCode::SinkUnavailable, "failed to read artifact")
                .with_context("path", path.display().to_string())
                .with_source(e)),
        }
    }
}

// ---------------------------------------------------------------------------
// InMemoryArtifactSink
// ---------------------------------------------------------------------------

/// In-memory sink for tests and dry-run `inspect` invocations.
#[derive(Debug, Default)]
pub struct InMemoryArtifactSink {
    store: Mutex<BTreeMap<(Uuid, String), Vec<u8>>>,
}

impl InMemoryArtifactSink {
    /// Create an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactSink for InMemoryArtifactSink {
    fn put(&self, job_id: Uuid, artifact: &Artifact) -> PipelineResult<()> {
        let mut store = self.store.lock().expect("artifact store lock poisoned");
        store.insert((job_id, artifact.name.clone()), artifact.bytes.clone());
        Ok(())
    }

    fn get(&self, job_id: Uuid, name: &str) -> PipelineResult<Option<Vec<u8>>> {
        let store = self.store.lock().expect("artifact store lock poisoned");
        Ok(store.get(&(job_id, name.to_string())).cloned())
    }
}
