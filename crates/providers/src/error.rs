#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A failure of the upstream service (timeouts, quota errors, HTTP
    /// failures), surfaced to the caller unmodified. Retry policy belongs
    /// to the caller, never to the provider.
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// The upstream service answered, but with a payload that does not
    /// match its own contract.
    #[error("Invalid response from upstream service: {0}")]
    InvalidResponse(String),

    /// Missing or malformed provider configuration (API keys, URLs).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Clip metadata that cannot be flattened into a description.
    #[error("Invalid clip metadata: {0}")]
    InvalidMetadata(String),
}
