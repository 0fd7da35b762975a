//! Client error types.

use scrobblemap_providers::ProviderError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Provider error outside of pagination (client construction, config).
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// No page could be fetched; carries the fatal reason.
    #[error("No tracks found or API error. ({0})")]
    Fetch(ProviderError),

    /// Output could not be serialized.
    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
