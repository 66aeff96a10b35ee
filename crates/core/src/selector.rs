//! Constrained greedy insertion selection with adaptive gap relaxation.
//!
//! Walks the filtered candidates in their deterministic order and accepts
//! each one only if its segment is unclaimed, its clip is below the usage
//! cap, and its anchor keeps the minimum gap to every already-accepted
//! insertion. When the strict pass falls short of `min_insertions`, a
//! second pass re-scans the remaining candidates with the relaxed gap:
//! widely-spaced insertions are preferred whenever the pool allows it, and
//! spacing quality is sacrificed only to meet the minimum count. The
//! selector never reaches below the similarity threshold to pad the count —
//! a wrong insertion is worse than a missing one.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::CoreError;
use crate::params::MatchParams;
use crate::types::{
    CandidateDecision, CandidateOutcome, Insertion, NarrationSegment, SelectionPass,
    SimilarityEntry,
};

// ---------------------------------------------------------------------------
// Selection outcome
// ---------------------------------------------------------------------------

/// Result of the two-pass scan.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    /// Accepted insertions in acceptance order (descending score within
    /// each pass; strict-pass acceptances first).
    pub insertions: Vec<Insertion>,
    /// Final decision for every filtered candidate, in scan order. A
    /// candidate rejected in the strict pass but accepted in the relaxed
    /// pass is reported with its relaxed acceptance.
    pub audit: Vec<CandidateDecision>,
    /// Whether the relaxed-gap pass ran.
    pub relaxation_used: bool,
    /// `min_insertions - len(insertions)` when positive, else 0. Reported,
    /// never papered over with sub-threshold matches.
    pub shortfall: usize,
}

// ---------------------------------------------------------------------------
// Selector state
// ---------------------------------------------------------------------------

/// Accumulator threaded through the scan. Explicit rather than shared so
/// the algorithm stays sequential, testable, and thread-confinable.
#[derive(Debug, Default)]
struct SelectorState {
    selected: Vec<Insertion>,
    clip_usage: BTreeMap<String, usize>,
    claimed_segments: BTreeSet<usize>,
}

impl SelectorState {
    /// Apply the acceptance rule for one candidate under the given gap.
    ///
    /// Returns the rejection reason, or `None` when the candidate is
    /// acceptable. Check order matters only for which reason gets
    /// reported; the rule itself is a conjunction.
    fn check(
        &self,
        candidate: &SimilarityEntry,
        anchor_time: f64,
        min_gap: f64,
        max_insertions: usize,
        max_uses_per_clip: usize,
    ) -> Option<CandidateOutcome> {
        if self.selected.len() >= max_insertions {
            return Some(CandidateOutcome::RejectedCapReached);
        }
        if self.claimed_segments.contains(&candidate.segment_index) {
            return Some(CandidateOutcome::RejectedSegmentClaimed);
        }
        if self.clip_usage.get(&candidate.clip_id).copied().unwrap_or(0) >= max_uses_per_clip {
            return Some(CandidateOutcome::RejectedClipExhausted);
        }
        if self
            .selected
            .iter()
            .any(|s| (anchor_time - s.anchor_time).abs() < min_gap)
        {
            return Some(CandidateOutcome::RejectedGap);
        }
        None
    }

    fn accept(
        &mut self,
        candidate: &SimilarityEntry,
        anchor_time: f64,
        threshold: f64,
        pass: SelectionPass,
    ) {
        self.selected.push(Insertion {
            anchor_time,
            segment_index: candidate.segment_index,
            clip_id: candidate.clip_id.clone(),
            score: candidate.score,
            rank_reason: rank_reason(candidate.score, threshold, pass),
            pass,
        });
        self.claimed_segments.insert(candidate.segment_index);
        *self.clip_usage.entry(candidate.clip_id.clone()).or_insert(0) += 1;
    }
}

/// Deterministic acceptance summary: derived purely from score, threshold,
/// and pass.
fn rank_reason(score: f64, threshold: f64, pass: SelectionPass) -> String {
    let pass_label = match pass {
        SelectionPass::Primary => "primary spacing pass",
        SelectionPass::Relaxed => "relaxed spacing pass",
    };
    format!(
        "similarity {score:.3} >= threshold {threshold:.2}; highest-ranked eligible candidate ({pass_label})"
    )
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Resolve a candidate's anchor: the end of its narration segment.
///
/// A candidate referencing a segment index outside `segments` is a
/// caller-side inconsistency, reported as `Validation` rather than a panic.
fn anchor_for(
    candidate: &SimilarityEntry,
    segments: &[NarrationSegment],
) -> Result<f64, CoreError> {
    segments
        .get(candidate.segment_index)
        .map(|s| s.end)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Candidate references segment {} but only {} segments were provided",
                candidate.segment_index,
                segments.len()
            ))
        })
}

/// Select insertions from the filtered candidate list.
///
/// `candidates` must already be threshold-filtered and in the deterministic
/// scan order produced by [`filter_candidates`](crate::candidates::filter_candidates),
/// and every `segment_index` must resolve within `segments` — an
/// out-of-range index fails with `Validation`. The anchor for a candidate
/// is the end of its narration segment.
///
/// Pass 1 applies `primary_min_gap_seconds`; pass 2 runs only when pass 1
/// accepted fewer than `min_insertions`, re-scans the remaining candidates
/// with `relaxed_min_gap_seconds`, and stops as soon as the minimum is met
/// (or the pool is exhausted).
pub fn select_insertions(
    candidates: &[SimilarityEntry],
    segments: &[NarrationSegment],
    params: &MatchParams,
) -> Result<SelectionOutcome, CoreError> {
    let mut state = SelectorState::default();
    let mut outcomes: Vec<CandidateOutcome> = Vec::with_capacity(candidates.len());

    // Pass 1: strict gap.
    for candidate in candidates {
        let anchor = anchor_for(candidate, segments)?;
        match state.check(
            candidate,
            anchor,
            params.primary_min_gap_seconds,
            params.max_insertions,
            params.max_uses_per_clip,
        ) {
            Some(rejection) => outcomes.push(rejection),
            None => {
                state.accept(
                    candidate,
                    anchor,
                    params.similarity_threshold,
                    SelectionPass::Primary,
                );
                outcomes.push(CandidateOutcome::AcceptedPrimary);
            }
        }
    }

    // Pass 2: relaxed gap, only to reach the minimum insertion count.
    let relaxation_used = state.selected.len() < params.min_insertions;
    if relaxation_used {
        tracing::debug!(
            selected = state.selected.len(),
            min_insertions = params.min_insertions,
            relaxed_gap = params.relaxed_min_gap_seconds,
            "Strict pass fell short; re-scanning with relaxed gap"
        );
        for (idx, candidate) in candidates.iter().enumerate() {
            if state.selected.len() >= params.min_insertions {
                break;
            }
            if matches!(outcomes[idx], CandidateOutcome::AcceptedPrimary) {
                continue;
            }
            let anchor = anchor_for(candidate, segments)?;
            match state.check(
                candidate,
                anchor,
                params.relaxed_min_gap_seconds,
                params.max_insertions,
                params.max_uses_per_clip,
            ) {
                Some(rejection) => outcomes[idx] = rejection,
                None => {
                    state.accept(
                        candidate,
                        anchor,
                        params.similarity_threshold,
                        SelectionPass::Relaxed,
                    );
                    outcomes[idx] = CandidateOutcome::AcceptedRelaxed;
                }
            }
        }
    }

    let shortfall = params.min_insertions.saturating_sub(state.selected.len());
    if shortfall > 0 {
        tracing::warn!(
            selected = state.selected.len(),
            min_insertions = params.min_insertions,
            shortfall,
            "Fewer qualifying candidates than the minimum insertion count"
        );
    }

    let audit = candidates
        .iter()
        .zip(outcomes)
        .map(|(candidate, outcome)| CandidateDecision {
            segment_index: candidate.segment_index,
            clip_id: candidate.clip_id.clone(),
            score: candidate.score,
            outcome,
        })
        .collect();

    Ok(SelectionOutcome {
        insertions: state.selected,
        audit,
        relaxation_used,
        shortfall,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
