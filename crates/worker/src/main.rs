//! File-driven planning worker.
//!
//! Reads a transcript JSON and a clip-metadata JSON, embeds both through
//! the OpenAI collaborator, and writes the resulting timeline plan:
//!
//! ```text
//! cutaway-worker <transcript.json> <clip_metadata.json> [output.json]
//! ```
//!
//! The transcript file carries `{"segments": [{"start", "end", "text"}]}`;
//! the clip-metadata file maps clip id to a free-form metadata object.
//! Requires `OPENAI_API_KEY` in the environment (or a `.env` file).
//! Matching parameters default to the production tuning; set
//! `CUTAWAY_PARAMS` to the path of a JSON file to override any subset of
//! them.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cutaway_core::MatchParams;
use cutaway_pipeline::BrollPlanner;
use cutaway_providers::{OpenAiEmbeddingClient, TranscriptSegment};

/// Environment variable naming an optional match-parameter JSON file.
const PARAMS_ENV_VAR: &str = "CUTAWAY_PARAMS";

#[derive(Deserialize)]
struct TranscriptFile {
    segments: Vec<TranscriptSegment>,
}

/// Parse a match-parameter override file. Missing fields keep their
/// defaults; invalid combinations are rejected up front rather than deep
/// inside the planning call.
fn parse_params(raw: &str) -> anyhow::Result<MatchParams> {
    let params: MatchParams =
        serde_json::from_str(raw).context("Parsing match params JSON")?;
    params.validate().context("Invalid match params")?;
    Ok(params)
}

fn load_params() -> anyhow::Result<MatchParams> {
    match std::env::var(PARAMS_ENV_VAR) {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Reading match params from {path}"))?;
            let params = parse_params(&raw)?;
            tracing::info!(
                path = %path,
                threshold = params.similarity_threshold,
                min_insertions = params.min_insertions,
                max_insertions = params.max_insertions,
                "Loaded match parameter overrides"
            );
            Ok(params)
        }
        Err(_) => Ok(MatchParams::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cutaway=info,cutaway_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let (transcript_path, metadata_path) = match (args.next(), args.next()) {
        (Some(t), Some(m)) => (PathBuf::from(t), PathBuf::from(m)),
        _ => {
            eprintln!("Usage: cutaway-worker <transcript.json> <clip_metadata.json> [output.json]");
            std::process::exit(2);
        }
    };
    let output_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("timeline_plan.json"));

    let transcript_raw = std::fs::read_to_string(&transcript_path)
        .with_context(|| format!("Reading transcript file {}", transcript_path.display()))?;
    let transcript: TranscriptFile =
        serde_json::from_str(&transcript_raw).context("Parsing transcript JSON")?;

    let metadata_raw = std::fs::read_to_string(&metadata_path)
        .with_context(|| format!("Reading clip metadata file {}", metadata_path.display()))?;
    let clip_metadata: BTreeMap<String, Value> =
        serde_json::from_str(&metadata_raw).context("Parsing clip metadata JSON")?;

    tracing::info!(
        segments = transcript.segments.len(),
        clips = clip_metadata.len(),
        "Planning clip insertions"
    );

    let params = load_params()?;
    let embeddings = OpenAiEmbeddingClient::from_env().context("Configuring embedding client")?;
    let planner = BrollPlanner::new(embeddings).with_params(params);
    let plan = planner
        .plan_from_metadata(&transcript.segments, &clip_metadata)
        .await
        .context("Planning failed")?;

    let stats = &plan.statistics;
    tracing::info!(
        insertions = stats.insertion_count,
        average_score = stats.average_score,
        shortfall = stats.insertion_shortfall,
        total_duration = stats.total_duration,
        "Plan complete"
    );
    if stats.insertion_shortfall > 0 {
        tracing::warn!(
            shortfall = stats.insertion_shortfall,
            "Fewer insertions than the configured minimum"
        );
    }

    let rendered = serde_json::to_string_pretty(&plan).context("Serializing plan")?;
    std::fs::write(&output_path, rendered)
        .with_context(|| format!("Writing plan to {}", output_path.display()))?;
    tracing::info!(path = %output_path.display(), "Plan written");

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_override_file_keeps_defaults() {
        let params = parse_params("{}").unwrap();
        let defaults = MatchParams::default();
        assert_eq!(params.similarity_threshold, defaults.similarity_threshold);
        assert_eq!(params.max_insertions, defaults.max_insertions);
    }

    #[test]
    fn partial_override_applies_on_top_of_defaults() {
        let params = parse_params(r#"{"similarity_threshold": 0.8, "min_insertions": 2}"#).unwrap();
        assert_eq!(params.similarity_threshold, 0.8);
        assert_eq!(params.min_insertions, 2);
        assert_eq!(params.max_insertions, MatchParams::default().max_insertions);
    }

    #[test]
    fn invalid_override_is_rejected() {
        assert!(parse_params(r#"{"similarity_threshold": 2.0}"#).is_err());
        assert!(parse_params("not json").is_err());
    }
}
