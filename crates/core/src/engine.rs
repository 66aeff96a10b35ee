//! The engine's single entry point: validate, score, filter, select,
//! assemble.
//!
//! `match_and_plan` is synchronous and side-effect free; every call is a
//! pure function of its explicit inputs. Data flows strictly forward
//! through the stages and never re-enters an earlier one.

use crate::candidates::filter_candidates;
use crate::error::CoreError;
use crate::params::MatchParams;
use crate::selector::select_insertions;
use crate::similarity::build_similarity_matrix;
use crate::timeline::assemble_timeline;
use crate::types::{validate_segments, ClipCandidate, NarrationSegment, TimelinePlan};

/// Produce a timeline plan for the given narration segments and clip set.
///
/// Fails with `Validation` on malformed parameters, unsorted/overlapping
/// segments, an empty segment list, or an empty clip set while
/// `min_insertions > 0`; with `ShapeMismatch` on any embedding
/// dimensionality inconsistency. Too few qualifying candidates is not an
/// error — the shortfall is reported in the plan statistics.
pub fn match_and_plan(
    segments: &[NarrationSegment],
    clips: &[ClipCandidate],
    params: &MatchParams,
) -> Result<TimelinePlan, CoreError> {
    params.validate()?;
    validate_segments(segments)?;

    if clips.is_empty() && params.min_insertions > 0 {
        return Err(CoreError::Validation(
            "Clip candidate set is empty but min_insertions > 0".to_string(),
        ));
    }

    let matrix = build_similarity_matrix(segments, clips)?;
    tracing::debug!(
        segments = segments.len(),
        clips = clips.len(),
        pairs = matrix.entries.len(),
        "Similarity matrix built"
    );

    let candidates = filter_candidates(&matrix.entries, params.similarity_threshold)?;
    tracing::debug!(
        candidates = candidates.len(),
        threshold = params.similarity_threshold,
        "Candidates above threshold"
    );

    let outcome = select_insertions(&candidates, segments, params)?;
    tracing::info!(
        insertions = outcome.insertions.len(),
        relaxation_used = outcome.relaxation_used,
        shortfall = outcome.shortfall,
        "Insertion selection complete"
    );

    Ok(assemble_timeline(segments, outcome, &matrix, params))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
