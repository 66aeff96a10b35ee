//! Pairwise cosine similarity between narration and clip embeddings.
//!
//! Pure and side-effect free. Each pair is computed independently, so the
//! result does not depend on computation order and the stage may be
//! parallelized by callers if they ever need to.

use crate::error::CoreError;
use crate::types::{ClipCandidate, NarrationSegment, SimilarityEntry};

/// Full N×M similarity matrix plus the zero-norm flags for the debug block.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    /// One entry per (segment, clip) pair, segment-major order.
    pub entries: Vec<SimilarityEntry>,
    /// Segments whose embedding had zero norm. Their pair scores are 0.0
    /// by definition; a null embedding is an upstream transcript problem,
    /// not a matching failure.
    pub zero_norm_segments: Vec<usize>,
    /// Clips whose embedding had zero norm.
    pub zero_norm_clips: Vec<String>,
}

/// Compute cosine similarity between two equal-length vectors.
///
/// Accumulates in `f64`. Returns a value in `[-1.0, 1.0]`, or `0.0` when
/// either vector has zero magnitude. Fails with `ShapeMismatch` when the
/// lengths differ or either vector is empty — a dimensionality mismatch
/// indicates a systemic upstream inconsistency, so it aborts rather than
/// being skipped.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, CoreError> {
    if a.len() != b.len() || a.is_empty() {
        return Err(CoreError::ShapeMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a * norm_b))
}

/// Build the full similarity matrix between every segment and every clip.
///
/// Dimensionality is checked once on entry against the first segment's
/// embedding; any deviating vector fails the whole match with
/// `ShapeMismatch`. Scores are clipped to `[0.0, 1.0]` — negative cosine
/// means semantic opposition and is floored to zero rather than kept as a
/// "weakly relevant" value.
pub fn build_similarity_matrix(
    segments: &[NarrationSegment],
    clips: &[ClipCandidate],
) -> Result<SimilarityMatrix, CoreError> {
    let dimension = segments
        .first()
        .map(|s| s.embedding.len())
        .unwrap_or_default();
    if dimension == 0 {
        return Err(CoreError::ShapeMismatch {
            expected: 1,
            actual: 0,
        });
    }

    for seg in segments {
        if seg.embedding.len() != dimension {
            return Err(CoreError::ShapeMismatch {
                expected: dimension,
                actual: seg.embedding.len(),
            });
        }
    }
    for clip in clips {
        if clip.embedding.len() != dimension {
            return Err(CoreError::ShapeMismatch {
                expected: dimension,
                actual: clip.embedding.len(),
            });
        }
    }

    let zero_norm_segments: Vec<usize> = segments
        .iter()
        .filter(|s| has_zero_norm(&s.embedding))
        .map(|s| s.index)
        .collect();
    let zero_norm_clips: Vec<String> = clips
        .iter()
        .filter(|c| has_zero_norm(&c.embedding))
        .map(|c| c.id.clone())
        .collect();

    let mut entries = Vec::with_capacity(segments.len() * clips.len());
    for seg in segments {
        for clip in clips {
            let raw = cosine_similarity(&seg.embedding, &clip.embedding)?;
            entries.push(SimilarityEntry {
                segment_index: seg.index,
                clip_id: clip.id.clone(),
                score: raw.clamp(0.0, 1.0),
            });
        }
    }

    Ok(SimilarityMatrix {
        entries,
        zero_norm_segments,
        zero_norm_clips,
    })
}

fn has_zero_norm(v: &[f32]) -> bool {
    v.iter().all(|x| *x == 0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
