//! Matching parameters, defaults, and validation.
//!
//! All parameters are externally supplied; `MatchParams::validate` is
//! called once on entry to the engine. Defaults mirror the production
//! tuning of the insertion planner.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum cosine similarity for a (segment, clip) pair to be a candidate.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.72;

/// Minimum number of clip insertions the selector aims for.
pub const DEFAULT_MIN_INSERTIONS: usize = 3;

/// Maximum number of clip insertions.
pub const DEFAULT_MAX_INSERTIONS: usize = 6;

/// Minimum spacing between insertion anchors in the strict pass.
pub const DEFAULT_PRIMARY_MIN_GAP_SECONDS: f64 = 5.0;

/// Minimum spacing once the relaxed pass is needed.
pub const DEFAULT_RELAXED_MIN_GAP_SECONDS: f64 = 3.0;

/// How many insertions may reuse the same clip.
pub const DEFAULT_MAX_USES_PER_CLIP: usize = 2;

/// Placeholder duration for a clip-insertion timeline segment. The engine
/// does not know real clip lengths; the rendering collaborator reconciles
/// this against the actual clip duration.
pub const DEFAULT_CLIP_DURATION_SECONDS: f64 = 4.0;

// ---------------------------------------------------------------------------
// Shared validation helpers
// ---------------------------------------------------------------------------

/// Validate that a value falls within `[0.0, 1.0]`.
pub fn validate_unit_range(value: f64, name: &str) -> Result<(), CoreError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0.0 and 1.0, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a duration/gap value is finite and non-negative.
pub fn validate_non_negative(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must be finite and >= 0, got {value}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// MatchParams
// ---------------------------------------------------------------------------

/// Tuning parameters for candidate filtering, selection, and assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParams {
    pub similarity_threshold: f64,
    pub min_insertions: usize,
    pub max_insertions: usize,
    pub primary_min_gap_seconds: f64,
    pub relaxed_min_gap_seconds: f64,
    pub max_uses_per_clip: usize,
    pub clip_duration_seconds: f64,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            min_insertions: DEFAULT_MIN_INSERTIONS,
            max_insertions: DEFAULT_MAX_INSERTIONS,
            primary_min_gap_seconds: DEFAULT_PRIMARY_MIN_GAP_SECONDS,
            relaxed_min_gap_seconds: DEFAULT_RELAXED_MIN_GAP_SECONDS,
            max_uses_per_clip: DEFAULT_MAX_USES_PER_CLIP,
            clip_duration_seconds: DEFAULT_CLIP_DURATION_SECONDS,
        }
    }
}

impl MatchParams {
    /// Validate all parameter ranges and cross-field relationships.
    ///
    /// Checks:
    /// - `similarity_threshold` in `[0.0, 1.0]`
    /// - `max_insertions >= min_insertions` and `max_insertions >= 1`
    /// - gaps finite and non-negative, `relaxed <= primary`
    /// - `max_uses_per_clip >= 1`
    /// - `clip_duration_seconds > 0`
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_unit_range(self.similarity_threshold, "Similarity threshold")?;

        if self.max_insertions == 0 {
            return Err(CoreError::Validation(
                "max_insertions must be at least 1".to_string(),
            ));
        }
        if self.max_insertions < self.min_insertions {
            return Err(CoreError::Validation(format!(
                "max_insertions ({}) must be >= min_insertions ({})",
                self.max_insertions, self.min_insertions
            )));
        }

        validate_non_negative(self.primary_min_gap_seconds, "Primary minimum gap")?;
        validate_non_negative(self.relaxed_min_gap_seconds, "Relaxed minimum gap")?;
        if self.relaxed_min_gap_seconds > self.primary_min_gap_seconds {
            return Err(CoreError::Validation(format!(
                "Relaxed gap ({}) must be <= primary gap ({})",
                self.relaxed_min_gap_seconds, self.primary_min_gap_seconds
            )));
        }

        if self.max_uses_per_clip == 0 {
            return Err(CoreError::Validation(
                "max_uses_per_clip must be at least 1".to_string(),
            ));
        }

        if !self.clip_duration_seconds.is_finite() || self.clip_duration_seconds <= 0.0 {
            return Err(CoreError::Validation(format!(
                "clip_duration_seconds must be positive, got {}",
                self.clip_duration_seconds
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
