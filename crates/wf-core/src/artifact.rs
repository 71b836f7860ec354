// SPDX-License-Identifier: MIT OR Apache-2.0
//! The common top-level skeleton every persisted artifact shares:
//! `{ <primary_key>: [...], algorithm_config: {...}, totals: {...} }`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generic envelope wrapping a stage's primary list under a named key,
/// alongside the algorithm configuration used to produce it and a totals map.
///
/// `primary_key` is not itself serialized as a map key — callers flatten
/// this into the concrete per-artifact struct via `#[serde(flatten)]estyle
/// usage in `wf-pipeline`; this type documents the shared shape and is used
/// directly wherever an artifact has no fields beyond the skeleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEnvelope<T> {
    /// The stage's primary output list.
    pub items: Vec<T>,
    /// The [`wf_config`](../wf_config/index.html)-shaped configuration used
    /// for this run, embedded verbatim for traceability. Opaque here to
    /// avoid a dependency cycle; `wf-pipeline` fills it via
    /// `serde_json::to_value`.
    pub algorithm_config: serde_json::Value,
    /// Stage-specific totals, always including at least `count`.
    pub totals: BTreeMap<String, serde_json::Value>,
}

impl<T> ArtifactEnvelope<T> {
    /// Build an envelope, seeding `totals` with `count = items.len()`.
    #[must_use]
    pub fn new(items: Vec<T>, algorithm_config: serde_json::Value) -> Self {
        let mut totals = BTreeMap::new();
        totals.insert("count".to_string(), serde_json::json!(items.len()));
        Self { items, algorithm_config, totals }
    }

    /// Add a stage-specific total (e.g. `duplicates_removed`, `unassigned`).
    #[must_use]
    pub fn with_total(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.totals.insert(key.into(), v);
        }
        self
    }
}
