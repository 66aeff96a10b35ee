//! Embedding-generation collaborator.
//!
//! [`EmbeddingProvider`] is the seam the planning pipeline depends on;
//! [`OpenAiEmbeddingClient`] is the production implementation backed by the
//! OpenAI embeddings endpoint. Provider failures are surfaced as
//! [`ProviderError::Upstream`] without retries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Default embedding model: fast and cost-effective, fixed 1536-dim output.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Base URL of the OpenAI API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the API key.
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Turns text into fixed-length semantic embedding vectors.
///
/// One vector per input text, in input order. Dimensionality is a contract
/// of the implementation; the planning core checks it once on entry.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}

// ---------------------------------------------------------------------------
// OpenAI client
// ---------------------------------------------------------------------------

/// Client for the OpenAI embeddings endpoint.
pub struct OpenAiEmbeddingClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingClient {
    /// Create a client with an explicit API key and the default model.
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Create a client reading the API key from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var(API_KEY_ENV_VAR).map_err(|_| {
            ProviderError::Configuration(format!(
                "{API_KEY_ENV_VAR} environment variable is not set"
            ))
        })?;
        if api_key.is_empty() {
            return Err(ProviderError::Configuration(format!(
                "{API_KEY_ENV_VAR} is empty"
            )));
        }
        Ok(Self::new(api_key))
    }

    /// Override the embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL (used for proxies and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingClient {
    /// Embed all texts in one batched request.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(count = texts.len(), model = %self.model, "Requesting embeddings");

        let response = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| ProviderError::Upstream(format!("Embedding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream(format!(
                "Embedding service returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Malformed embedding body: {e}")))?;

        if parsed.data.len() != texts.len() {
            return Err(ProviderError::InvalidResponse(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        // The API reports an index per item; order by it rather than
        // trusting response order.
        let mut items = parsed.data;
        items.sort_by_key(|item| item.index);
        Ok(items.into_iter().map(|item| item.embedding).collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
