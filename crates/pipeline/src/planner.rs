//! Orchestration: transcript text + clip descriptions → timeline plan.
//!
//! Bridges the async collaborators and the synchronous core: embeds the
//! narration segments and clip descriptions (concurrently, one batch
//! each), assembles the core's input types, and delegates the decision
//! logic to `match_and_plan`.

use std::collections::BTreeMap;

use cutaway_core::{match_and_plan, ClipCandidate, MatchParams, NarrationSegment, TimelinePlan};
use cutaway_providers::metadata::flatten_metadata_map;
use cutaway_providers::{EmbeddingProvider, TranscriptSegment};
use serde_json::Value;

use crate::error::PipelineError;

/// Plans clip insertions for a narration transcript.
pub struct BrollPlanner<E> {
    embeddings: E,
    params: MatchParams,
}

impl<E: EmbeddingProvider> BrollPlanner<E> {
    /// Create a planner with default matching parameters.
    pub fn new(embeddings: E) -> Self {
        Self {
            embeddings,
            params: MatchParams::default(),
        }
    }

    /// Replace the matching parameters.
    pub fn with_params(mut self, params: MatchParams) -> Self {
        self.params = params;
        self
    }

    /// Plan insertions from transcript segments and per-clip descriptions.
    ///
    /// Clip descriptions are keyed by clip id; the `BTreeMap` keeps the
    /// embedding batch order deterministic. Provider failures and core
    /// validation errors surface unchanged through [`PipelineError`].
    pub async fn plan(
        &self,
        transcript: &[TranscriptSegment],
        clip_descriptions: &BTreeMap<String, String>,
    ) -> Result<TimelinePlan, PipelineError> {
        let segment_texts: Vec<String> = transcript.iter().map(|s| s.text.clone()).collect();
        let clip_ids: Vec<&String> = clip_descriptions.keys().collect();
        let clip_texts: Vec<String> = clip_descriptions.values().cloned().collect();

        tracing::info!(
            segments = segment_texts.len(),
            clips = clip_texts.len(),
            "Embedding narration segments and clip descriptions"
        );
        let (segment_vectors, clip_vectors) = futures::future::try_join(
            self.embeddings.embed(&segment_texts),
            self.embeddings.embed(&clip_texts),
        )
        .await?;

        let segments: Vec<NarrationSegment> = transcript
            .iter()
            .zip(segment_vectors)
            .enumerate()
            .map(|(index, (seg, embedding))| NarrationSegment {
                index,
                start: seg.start,
                end: seg.end,
                text: seg.text.clone(),
                embedding,
            })
            .collect();
        let clips: Vec<ClipCandidate> = clip_ids
            .into_iter()
            .zip(clip_vectors)
            .map(|(id, embedding)| ClipCandidate {
                id: id.clone(),
                embedding,
            })
            .collect();

        Ok(match_and_plan(&segments, &clips, &self.params)?)
    }

    /// Plan insertions from raw clip metadata, flattening each entry into
    /// a description string first.
    pub async fn plan_from_metadata(
        &self,
        transcript: &[TranscriptSegment],
        clip_metadata: &BTreeMap<String, Value>,
    ) -> Result<TimelinePlan, PipelineError> {
        let descriptions = flatten_metadata_map(clip_metadata);
        self.plan(transcript, &descriptions).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use cutaway_providers::ProviderError;

    /// Embeds by lookup table; unknown text is an upstream failure.
    struct FixedEmbeddings(BTreeMap<String, Vec<f32>>);

    #[async_trait]
    impl EmbeddingProvider for FixedEmbeddings {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
            texts
                .iter()
                .map(|t| {
                    self.0
                        .get(t)
                        .cloned()
                        .ok_or_else(|| ProviderError::Upstream(format!("unknown text: {t}")))
                })
                .collect()
        }
    }

    fn transcript_segment(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn plans_from_texts_end_to_end() {
        let mut table = BTreeMap::new();
        table.insert("talking about the product".to_string(), vec![1.0, 0.0]);
        table.insert("closing remarks".to_string(), vec![0.0, 1.0]);
        table.insert("product demo on screen".to_string(), vec![1.0, 0.0]);
        let planner = BrollPlanner::new(FixedEmbeddings(table)).with_params(MatchParams {
            min_insertions: 0,
            ..Default::default()
        });

        let transcript = vec![
            transcript_segment(0.0, 10.0, "talking about the product"),
            transcript_segment(10.0, 20.0, "closing remarks"),
        ];
        let mut descriptions = BTreeMap::new();
        descriptions.insert(
            "demo_clip".to_string(),
            "product demo on screen".to_string(),
        );

        let plan = planner.plan(&transcript, &descriptions).await.unwrap();
        assert_eq!(plan.statistics.insertion_count, 1);
        assert_eq!(plan.insertions[0].clip_id, "demo_clip");
        assert_eq!(plan.insertions[0].anchor_time, 10.0);
    }

    #[tokio::test]
    async fn provider_failure_passes_through_unchanged() {
        let planner = BrollPlanner::new(FixedEmbeddings(BTreeMap::new()));
        let transcript = vec![transcript_segment(0.0, 5.0, "unseen text")];
        let mut descriptions = BTreeMap::new();
        descriptions.insert("clip".to_string(), "also unseen".to_string());

        let result = planner.plan(&transcript, &descriptions).await;
        assert_matches!(
            result,
            Err(PipelineError::Provider(ProviderError::Upstream(_)))
        );
    }

    #[tokio::test]
    async fn core_validation_errors_surface() {
        let mut table = BTreeMap::new();
        table.insert("hello".to_string(), vec![1.0, 0.0]);
        let planner = BrollPlanner::new(FixedEmbeddings(table));

        // Empty clip set with the default min_insertions of 3.
        let transcript = vec![transcript_segment(0.0, 5.0, "hello")];
        let result = planner.plan(&transcript, &BTreeMap::new()).await;
        assert_matches!(
            result,
            Err(PipelineError::Core(cutaway_core::CoreError::Validation(_)))
        );
    }
}
