//! External collaborators for the insertion planner.
//!
//! Provides the embedding and transcription provider seams with their
//! OpenAI-backed implementations, plus deterministic flattening of
//! free-form clip metadata into description strings. Upstream failures are
//! surfaced unmodified; retry policy belongs to callers.

pub mod embedding;
pub mod error;
pub mod metadata;
pub mod transcription;

pub use embedding::{EmbeddingProvider, OpenAiEmbeddingClient};
pub use error::ProviderError;
pub use transcription::{TranscriptSegment, TranscriptionProvider};
