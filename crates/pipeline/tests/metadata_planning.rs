//! End-to-end planning from raw clip metadata.
//!
//! Exercises metadata flattening feeding the embedding provider and the
//! core engine through `plan_from_metadata`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use cutaway_core::MatchParams;
use cutaway_pipeline::BrollPlanner;
use cutaway_providers::{EmbeddingProvider, ProviderError, TranscriptSegment};
use serde_json::json;

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

/// Metadata objects are flattened to descriptions before embedding, and
/// the resulting plan anchors the matching clip after its segment.
#[tokio::test]
async fn plans_from_flattened_metadata() {
    let mut table = BTreeMap::new();
    table.insert(
        "walking through the new office space".to_string(),
        vec![0.9f32, 0.1],
    );
    table.insert("wrapping up the tour".to_string(), vec![0.0, 1.0]);
    // "Office tour shows people walking" is the flattened form of the
    // metadata below.
    table.insert(
        "Office tour shows people walking".to_string(),
        vec![0.9, 0.1],
    );

    let planner = BrollPlanner::new(FixedEmbeddings(table)).with_params(MatchParams {
        min_insertions: 0,
        ..Default::default()
    });

    let transcript = vec![
        TranscriptSegment {
            start: 0.0,
            end: 12.0,
            text: "walking through the new office space".to_string(),
        },
        TranscriptSegment {
            start: 12.0,
            end: 20.0,
            text: "wrapping up the tour".to_string(),
        },
    ];
    let mut metadata = BTreeMap::new();
    metadata.insert(
        "office_broll".to_string(),
        json!({"title": "Office tour", "action": "people walking"}),
    );

    let plan = planner
        .plan_from_metadata(&transcript, &metadata)
        .await
        .unwrap();

    assert_eq!(plan.statistics.insertion_count, 1);
    assert_eq!(plan.insertions[0].clip_id, "office_broll");
    assert_eq!(plan.insertions[0].anchor_time, 12.0);
    assert_eq!(plan.segments.len(), 3);
}
