// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and merging for the wall-geometry
//! pipeline.
//!
//! This crate provides [`AlgorithmConfig`] — every numeric threshold and
//! layer-name pattern named in the specification, made runtime-overridable
//! — together with a TOML loader, an overlay merge, and advisory
//! [`ConfigWarning`]s.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or validating an [`AlgorithmConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `max_distance_mm` is unusually large for an interior wall scan.
    LargeMaxDistance {
        /// The configured value, millimetres.
        mm: u64,
    },
    /// `min_overlap_percentage` is below a sane detection threshold.
    LowMinOverlap {
        /// The configured percentage.
        percent: u64,
    },
    /// A layer-name pattern is empty and will match every layer.
    EmptyLayerPattern {
        /// Which pattern list (`"door"` or `"window"`) contained it.
        list: String,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LargeMaxDistance { mm } => {
                write!(f, "max_distance_mm={mm} is unusually large for an interior scan")
            }
            Self::LowMinOverlap { percent } => {
                write!(f, "min_overlap_percentage={percent} may accept spurious pairs")
            }
            Self::EmptyLayerPattern { list } => {
                write!(f, "{list} layer pattern list contains an empty string (matches everything)")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// AlgorithmConfig
// ---------------------------------------------------------------------------

/// Every tunable constant named in the specification, collected into one
/// structure that is serialised verbatim into every artifact's
/// `algorithm_config` field for traceability.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct AlgorithmConfig {
    /// Rounding quantum applied to every coordinate in Normalize, millimetres.
    pub epsilon_mm: f64,
    /// Detector: max angle between two lines' directions to count as parallel.
    pub angular_tolerance_deg: f64,
    /// Detector: minimum perpendicular distance between candidate lines.
    pub min_distance_mm: f64,
    /// Detector: maximum perpendicular distance between candidate lines.
    pub max_distance_mm: f64,
    /// Detector: minimum longitudinal overlap, as a percentage of the
    /// shorter line's length.
    pub min_overlap_percentage: f64,
    /// LOGIC_D: corner-containment tolerance, millimetres.
    pub containment_tolerance_mm: f64,
    /// LOGIC_E: direction tolerance for two rectangles to share a band, degrees.
    pub band_angle_tolerance_deg: f64,
    /// LOGIC_E: normal-offset tolerance for two rectangles to share a band,
    /// millimetres.
    pub band_offset_tolerance_mm: f64,
    /// LOGIC_E: max gap between adjacent same-band rectangles that still merges.
    pub band_join_gap_mm: f64,
    /// LOGIC_E: max thickness difference between adjacent rectangles that
    /// still merges.
    pub band_thickness_tolerance_mm: f64,
    /// Door assignment: max normal-direction distance from a door's centre
    /// to a wall band for it to qualify.
    pub door_snap_tol_mm: f64,
    /// Door bridge: extension applied to each side of the door's
    /// longitudinal interval.
    pub bridge_end_cap_mm: f64,
    /// Detector safety cap: line count above this fails the stage with
    /// `OVERSIZED_INPUT` rather than silently sampling.
    pub max_lines_for_detector: usize,
    /// Case-insensitive substring patterns identifying door layers.
    pub door_layer_patterns: Vec<String>,
    /// Case-insensitive substring patterns identifying window layers.
    pub window_layer_patterns: Vec<String>,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            epsilon_mm: 1e-6,
            angular_tolerance_deg: 5.0,
            min_distance_mm: 20.0,
            max_distance_mm: 450.0,
            min_overlap_percentage: 60.0,
            containment_tolerance_mm: 1.0,
            band_angle_tolerance_deg: 1.0,
            band_offset_tolerance_mm: 2.0,
            band_join_gap_mm: 5.0,
            band_thickness_tolerance_mm: 5.0,
            door_snap_tol_mm: 300.0,
            bridge_end_cap_mm: 10.0,
            max_lines_for_detector: 20_000,
            door_layer_patterns: vec!["door".to_string(), "דלת".to_string()],
            window_layer_patterns: vec!["window".to_string(), "חלון".to_string()],
        }
    }
}

impl AlgorithmConfig {
    /// Validate the configuration, returning advisory warnings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any threshold is
    /// structurally invalid (negative, or `min > max`).
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        let mut reasons = Vec::new();
        if self.min_distance_mm < 0.0 || self.max_distance_mm < 0.0 {
            reasons.push("distance thresholds must be non-negative".to_string());
        }
        if self.min_distance_mm > self.max_distance_mm {
            reasons.push("min_distance_mm must not exceed max_distance_mm".to_string());
        }
        if !(0.0..=100.0).contains(&self.min_overlap_percentage) {
            reasons.push("min_overlap_percentage must be within [0, 100]".to_string());
        }
        if self.epsilon_mm <= 0.0 {
            reasons.push("epsilon_mm must be positive".to_string());
        }
        if self.max_lines_for_detector == 0 {
            reasons.push("max_lines_for_detector must be positive".to_string());
        }
        if !reasons.is_empty() {
            return Err(ConfigError::ValidationError { reasons });
        }

        let mut warnings = Vec::new();
        if self.max_distance_mm > 2000.0 {
            warnings.push(ConfigWarning::LargeMaxDistance { mm: self.max_distance_mm as u64 });
        }
        if self.min_overlap_percentage < 30.0 {
            warnings.push(ConfigWarning::LowMinOverlap { percent: self.min_overlap_percentage as u64 });
        }
        if self.door_layer_patterns.iter().any(|p| p.is_empty()) {
            warnings.push(ConfigWarning::EmptyLayerPattern { list: "door".to_string() });
        }
        if self.window_layer_patterns.iter().any(|p| p.is_empty()) {
            warnings.push(ConfigWarning::EmptyLayerPattern { list: "window".to_string() });
        }
        Ok(warnings)
    }

    /// `true` if `layer` looks like a door layer (case-insensitive substring
    /// match against [`Self::door_layer_patterns`]).
    #[must_use]
    pub fn is_door_layer(&self, layer: &str) -> bool {
        matches_any_pattern(layer, &self.door_layer_patterns)
    }

    /// `true` if `layer` looks like a window layer.
    #[must_use]
    pub fn is_window_layer(&self, layer: &str) -> bool {
        matches_any_pattern(layer, &self.window_layer_patterns)
    }
}

fn matches_any_pattern(layer: &str, patterns: &[String]) -> bool {
    let lower = layer.to_lowercase();
    patterns.iter().any(|p| !p.is_empty() && lower.contains(&p.to_lowercase()))
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load an [`AlgorithmConfig`] from an optional TOML overlay file.
///
/// * If `path` is `Some`, reads and parses the file, merging its fields over
///   [`AlgorithmConfig::default()`] (any field absent from the file keeps
///   its default value, since the struct itself carries `#[serde(default)]`).
/// * If `path` is `None`, returns [`AlgorithmConfig::default()`].
///
/// # Errors
///
/// Returns [`ConfigError::FileNotFound`] if `path` is given but missing, or
/// [`ConfigError::ParseError`] if the file is not valid TOML for this shape.
pub fn load_config(path: Option<&Path>) -> Result<AlgorithmConfig, ConfigError> {
    match path {
        None => Ok(AlgorithmConfig::default()),
        Some(p) => {
            let content = std::fs::read_to_string(p)
                .map_err(|_| ConfigError::FileNotFound { path: p.display().to_string() })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError { reason: e.to_string() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_specification_constants() {
        let cfg = AlgorithmConfig::default();
        assert_eq!(cfg.angular_tolerance_deg, 5.0);
        assert_eq!(cfg.min_distance_mm, 20.0);
        assert_eq!(cfg.max_distance_mm, 450.0);
        assert_eq!(cfg.min_overlap_percentage, 60.0);
        assert_eq!(cfg.band_join_gap_mm, 5.0);
        assert_eq!(cfg.door_snap_tol_mm, 300.0);
        assert_eq!(cfg.bridge_end_cap_mm, 10.0);
        assert!(cfg.validate().unwrap().is_empty());
    }

    #[test]
    fn rejects_inverted_distance_bounds() {
        let mut cfg = AlgorithmConfig::default();
        cfg.min_distance_mm = 500.0;
        cfg.max_distance_mm = 100.0;
        let err = cfg.validate().unwrap_err();
        match err {
            ConfigError::ValidationError { reasons } => {
                assert!(reasons.iter().any(|r| r.contains("min_distance_mm")));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn door_pattern_matching_is_case_insensitive() {
        let cfg = AlgorithmConfig::default();
        assert!(cfg.is_door_layer("A-DOOR-01"));
        assert!(cfg.is_door_layer("a_door_frame"));
        assert!(!cfg.is_door_layer("A-WALL-EXT"));
    }

    #[test]
    fn missing_overlay_file_errors() {
        let err = load_config(Some(Path::new("/nonexistent/wallforge.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
