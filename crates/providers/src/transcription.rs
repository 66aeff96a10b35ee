//! Transcription collaborator.
//!
//! Produces ordered, timestamped transcript segments from narration audio.
//! The planning core treats these as opaque input and re-validates ordering
//! itself; this module only normalizes the upstream response shape.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Default transcription model.
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

// ---------------------------------------------------------------------------
// Transcript segment
// ---------------------------------------------------------------------------

/// One timestamped span of transcript text, before embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Transcribes narration audio into ordered segments.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        file_name: &str,
    ) -> Result<Vec<TranscriptSegment>, ProviderError>;
}

// ---------------------------------------------------------------------------
// Verbose response parsing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    segments: Vec<VerboseSegment>,
}

#[derive(Deserialize)]
struct VerboseSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Normalize a verbose transcription response into transcript segments.
///
/// Trims whitespace and drops segments whose text is empty — silence spans
/// carry nothing to match against.
pub fn parse_verbose_transcription(body: &str) -> Result<Vec<TranscriptSegment>, ProviderError> {
    let parsed: VerboseTranscription = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("Malformed transcription body: {e}")))?;

    Ok(parsed
        .segments
        .into_iter()
        .filter_map(|seg| {
            let text = seg.text.trim().to_string();
            if text.is_empty() {
                None
            } else {
                Some(TranscriptSegment {
                    start: seg.start,
                    end: seg.end,
                    text,
                })
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// OpenAI client
// ---------------------------------------------------------------------------

/// Client for the OpenAI audio transcription endpoint.
pub struct OpenAiTranscriptionClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiTranscriptionClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            base_url: crate::embedding::DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL (used for proxies and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl TranscriptionProvider for OpenAiTranscriptionClient {
    /// Upload the audio and request segment-level timestamps.
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        file_name: &str,
    ) -> Result<Vec<TranscriptSegment>, ProviderError> {
        tracing::debug!(bytes = audio.len(), model = %self.model, "Requesting transcription");

        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| ProviderError::Configuration(format!("Invalid audio part: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment")
            .part("file", part);

        let response = self
            .http
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::Upstream(format!("Transcription request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Upstream(format!("Transcription body read failed: {e}")))?;
        if !status.is_success() {
            return Err(ProviderError::Upstream(format!(
                "Transcription service returned {status}: {body}"
            )));
        }

        parse_verbose_transcription(&body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
