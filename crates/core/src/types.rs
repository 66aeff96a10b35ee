//! Domain types for narration/clip matching and timeline planning.
//!
//! Inputs ([`NarrationSegment`], [`ClipCandidate`]) are produced by external
//! collaborators and immutable once handed to the engine. The output
//! [`TimelinePlan`] is the contract downstream rendering/presentation
//! consumers depend on; its field names are stable.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A timestamped span of primary-speaker transcript with its embedding.
///
/// Segments are non-overlapping and sorted by `start`; callers must hold
/// that invariant, and the engine re-checks it via [`validate_segments`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationSegment {
    /// Position of this segment in the transcript (0-based).
    pub index: usize,
    /// Start time in seconds from the beginning of the narration.
    pub start: f64,
    /// End time in seconds. Always greater than `start`.
    pub end: f64,
    /// Transcript text for this span.
    pub text: String,
    /// Semantic embedding of `text`, produced by an external model.
    pub embedding: Vec<f32>,
}

/// A supplementary clip, represented only by its description embedding.
///
/// The `id` is opaque — it is never used for semantic inference, only for
/// identity and deterministic tie-breaking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipCandidate {
    pub id: String,
    pub embedding: Vec<f32>,
}

// ---------------------------------------------------------------------------
// Derived types
// ---------------------------------------------------------------------------

/// One (segment, clip) similarity score, derived from the embeddings.
///
/// `score` is cosine similarity floored at 0.0 (negative cosine indicates
/// semantic opposition, not a weak match) and capped at 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEntry {
    pub segment_index: usize,
    pub clip_id: String,
    pub score: f64,
}

/// Which selector pass accepted an insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPass {
    /// Strict spacing: the primary minimum gap applied.
    Primary,
    /// Relaxed spacing: the relaxed minimum gap applied because the
    /// primary pass fell short of the minimum insertion count.
    Relaxed,
}

/// A selected (segment, clip) pairing anchored at the segment's end time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insertion {
    /// Where the clip is proposed to play: the end of the matched segment.
    pub anchor_time: f64,
    /// Index of the narration segment this insertion is anchored to.
    pub segment_index: usize,
    pub clip_id: String,
    /// Similarity score of the chosen pairing.
    pub score: f64,
    /// Deterministic summary of why this candidate was accepted. Derived
    /// purely from score, threshold, and pass — never model-generated.
    pub rank_reason: String,
    /// Pass in which the candidate was accepted.
    pub pass: SelectionPass,
}

// ---------------------------------------------------------------------------
// Timeline output
// ---------------------------------------------------------------------------

/// One entry in the final ordered timeline.
///
/// Clip insertions sit logically "on top of" the narration timeline: they
/// never alter the underlying narration spans. Reconciling playback offsets
/// against real clip durations is the rendering collaborator's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineSegment {
    Narration {
        start: f64,
        end: f64,
        segment_index: usize,
        text: String,
    },
    ClipInsertion {
        start: f64,
        end: f64,
        clip_id: String,
        score: f64,
        reason: String,
    },
}

impl TimelineSegment {
    pub fn start(&self) -> f64 {
        match self {
            Self::Narration { start, .. } | Self::ClipInsertion { start, .. } => *start,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            Self::Narration { start, end, .. } | Self::ClipInsertion { start, end, .. } => {
                end - start
            }
        }
    }
}

/// Summary statistics for a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStatistics {
    /// Number of insertions selected.
    pub insertion_count: usize,
    /// Mean similarity score over the selected insertions (0.0 when none).
    pub average_score: f64,
    /// Similarity threshold the plan was built with.
    pub threshold_used: f64,
    /// Effective minimum gap: the relaxed gap if the relaxed pass ran,
    /// otherwise the primary gap.
    pub gap_used: f64,
    /// How many insertions short of `min_insertions` the plan is. A
    /// shortfall is reported, never padded with sub-threshold matches.
    pub insertion_shortfall: usize,
    /// Total narration time covered by the input segments.
    pub narration_duration: f64,
    /// Total clip-insertion time added on top of the narration.
    pub clip_duration: f64,
    /// Narration plus clip time.
    pub total_duration: f64,
    /// Clip time as a percentage of the total.
    pub clip_coverage_percent: f64,
}

/// Final outcome for one filtered candidate, for auditability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOutcome {
    AcceptedPrimary,
    AcceptedRelaxed,
    /// The candidate's segment was already claimed by a better match.
    RejectedSegmentClaimed,
    /// The clip hit its per-clip usage cap.
    RejectedClipExhausted,
    /// Too close in time to an already-selected insertion.
    RejectedGap,
    /// The maximum insertion count was already reached.
    RejectedCapReached,
}

/// One row of the selector's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateDecision {
    pub segment_index: usize,
    pub clip_id: String,
    pub score: f64,
    pub outcome: CandidateOutcome,
}

/// Debug block embedded in every plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDebug {
    /// Every candidate that passed the similarity filter, in the
    /// deterministic scan order, with its final selector outcome.
    pub candidates: Vec<CandidateDecision>,
    /// Whether the relaxed-gap pass was needed.
    pub relaxation_used: bool,
    /// Segment indices whose embeddings had zero norm (upstream problem;
    /// their pair scores are defined as 0.0, not an error).
    pub zero_norm_segments: Vec<usize>,
    /// Clip ids whose embeddings had zero norm.
    pub zero_norm_clips: Vec<String>,
}

/// The engine's sole output artifact.
///
/// Produced fresh on every invocation; contains no generated ids or
/// timestamps so that identical inputs yield field-for-field identical
/// plans. Persistence, if any, is an external collaborator's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePlan {
    /// Ordered narration/clip segments covering the full narration span.
    pub segments: Vec<TimelineSegment>,
    /// Selected insertions in chronological (anchor time) order.
    pub insertions: Vec<Insertion>,
    pub statistics: PlanStatistics,
    pub debug: PlanDebug,
}

// ---------------------------------------------------------------------------
// Segment validation
// ---------------------------------------------------------------------------

/// Validate the transcript-segment input invariants.
///
/// Checks, per segment: `start >= 0`, `end > start`, `index` matches the
/// position in the list. Across segments: sorted by `start` with no
/// overlaps.
pub fn validate_segments(segments: &[NarrationSegment]) -> Result<(), CoreError> {
    if segments.is_empty() {
        return Err(CoreError::Validation(
            "Narration segment list is empty".to_string(),
        ));
    }

    for (pos, seg) in segments.iter().enumerate() {
        if seg.index != pos {
            return Err(CoreError::Validation(format!(
                "Segment at position {pos} has index {}, expected {pos}",
                seg.index
            )));
        }
        if seg.start < 0.0 || !seg.start.is_finite() {
            return Err(CoreError::Validation(format!(
                "Segment {pos} start must be finite and >= 0, got {}",
                seg.start
            )));
        }
        if !(seg.end > seg.start) || !seg.end.is_finite() {
            return Err(CoreError::Validation(format!(
                "Segment {pos} end ({}) must be finite and greater than start ({})",
                seg.end, seg.start
            )));
        }
    }

    for pair in segments.windows(2) {
        if pair[1].start < pair[0].end {
            return Err(CoreError::Validation(format!(
                "Segments {} and {} overlap or are out of order ({} < {})",
                pair[0].index, pair[1].index, pair[1].start, pair[0].end
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn seg(index: usize, start: f64, end: f64) -> NarrationSegment {
        NarrationSegment {
            index,
            start,
            end,
            text: format!("segment {index}"),
            embedding: vec![1.0, 0.0],
        }
    }

    // -- validate_segments ---------------------------------------------------

    #[test]
    fn accepts_sorted_non_overlapping_segments() {
        let segments = vec![seg(0, 0.0, 5.0), seg(1, 5.0, 10.0), seg(2, 12.0, 15.0)];
        assert!(validate_segments(&segments).is_ok());
    }

    #[test]
    fn rejects_empty_segment_list() {
        assert_matches!(validate_segments(&[]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_negative_start() {
        let segments = vec![seg(0, -1.0, 5.0)];
        assert_matches!(
            validate_segments(&segments),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_end_not_after_start() {
        let segments = vec![seg(0, 5.0, 5.0)];
        assert_matches!(
            validate_segments(&segments),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_overlapping_segments() {
        let segments = vec![seg(0, 0.0, 6.0), seg(1, 5.0, 10.0)];
        assert_matches!(
            validate_segments(&segments),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_unsorted_segments() {
        let mut segments = vec![seg(0, 10.0, 15.0), seg(1, 0.0, 5.0)];
        segments[0].index = 0;
        segments[1].index = 1;
        assert_matches!(
            validate_segments(&segments),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_mismatched_index() {
        let segments = vec![seg(0, 0.0, 5.0), seg(5, 6.0, 10.0)];
        assert_matches!(
            validate_segments(&segments),
            Err(CoreError::Validation(_))
        );
    }

    // -- TimelineSegment serde -----------------------------------------------

    #[test]
    fn narration_segment_serializes_with_kind_tag() {
        let ts = TimelineSegment::Narration {
            start: 0.0,
            end: 4.5,
            segment_index: 0,
            text: "hello".to_string(),
        };
        let json = serde_json::to_value(&ts).unwrap();
        assert_eq!(json["kind"], "narration");
        assert_eq!(json["end"], 4.5);
    }

    #[test]
    fn clip_insertion_serializes_with_kind_tag() {
        let ts = TimelineSegment::ClipInsertion {
            start: 4.5,
            end: 8.5,
            clip_id: "clip_1".to_string(),
            score: 0.91,
            reason: "test".to_string(),
        };
        let json = serde_json::to_value(&ts).unwrap();
        assert_eq!(json["kind"], "clip_insertion");
        assert_eq!(json["clip_id"], "clip_1");
    }

    #[test]
    fn timeline_segment_duration() {
        let ts = TimelineSegment::Narration {
            start: 2.0,
            end: 7.5,
            segment_index: 0,
            text: String::new(),
        };
        assert!((ts.duration() - 5.5).abs() < 1e-9);
    }
}
