use cutaway_core::CoreError;
use cutaway_providers::ProviderError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Matching/planning failure from the core engine.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Collaborator failure, including upstream service errors passed
    /// through unchanged.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
