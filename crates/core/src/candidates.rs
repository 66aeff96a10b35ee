//! Candidate filtering: threshold cut plus a deterministic total order.
//!
//! The selector walks candidates in exactly the order produced here, so the
//! sort must be a total order with no reliance on input ordering: score
//! descending, then segment index ascending, then clip id lexicographic.

use std::cmp::Ordering;

use crate::error::CoreError;
use crate::params::validate_unit_range;
use crate::types::SimilarityEntry;

/// Reduce the full matrix to the entries at or above `threshold`, sorted
/// into the deterministic scan order.
///
/// An empty result is not an error — the selector surfaces it as a
/// zero-insertion plan.
pub fn filter_candidates(
    entries: &[SimilarityEntry],
    threshold: f64,
) -> Result<Vec<SimilarityEntry>, CoreError> {
    validate_unit_range(threshold, "Similarity threshold")?;

    let mut candidates: Vec<SimilarityEntry> = entries
        .iter()
        .filter(|e| e.score >= threshold)
        .cloned()
        .collect();

    candidates.sort_by(compare_candidates);
    Ok(candidates)
}

/// Deterministic candidate ordering: best score first, ties broken by
/// earlier segment, then lexicographic clip id.
fn compare_candidates(a: &SimilarityEntry, b: &SimilarityEntry) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then(a.segment_index.cmp(&b.segment_index))
        .then(a.clip_id.cmp(&b.clip_id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
