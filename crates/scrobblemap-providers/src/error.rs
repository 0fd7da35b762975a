//! Error types for scrobble provider operations.
//!
//! Every failure of a page request is classified into a
//! [`ProviderErrorCode`]. The classification decides what the pagination
//! controller does next: rate limits are waited out, everything else stops
//! pagination.

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// API key rejected (401/403 or an API-level auth error).
    AuthenticationFailed,
    /// Connection failed, reset, DNS resolution, etc.
    NetworkError,
    /// The request did not complete within the per-request timeout.
    Timeout,
    /// Too many requests (429).
    RateLimited,
    /// Server returned a 5xx status.
    ServerError,
    /// Server returned a 4xx status other than 401/403/429.
    ClientError,
    /// Body could not be decoded or lacks the expected structure.
    InvalidResponse,
    /// Missing or invalid configuration, such as an empty API key.
    ConfigurationError,
    /// The caller cancelled the operation or its deadline passed.
    Cancelled,
}

impl ProviderErrorCode {
    /// Returns true for connection-level failures (network errors, timeouts).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NetworkError | Self::Timeout)
    }

    /// Returns a machine-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::NetworkError => "network_error",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::ClientError => "client_error",
            Self::InvalidResponse => "invalid_response",
            Self::ConfigurationError => "configuration_error",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to a scrobble provider.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// The provider that generated this error (e.g., "lastfm").
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Timeout, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    /// Creates a client (4xx) error.
    pub fn client(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ClientError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Creates a cancellation error.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Cancelled, message)
    }

    /// Sets the provider name for this error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider name, if set.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns true for connection-level failures.
    pub fn is_transient(&self) -> bool {
        self.code.is_transient()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_codes() {
        assert!(ProviderErrorCode::NetworkError.is_transient());
        assert!(ProviderErrorCode::Timeout.is_transient());
        assert!(!ProviderErrorCode::RateLimited.is_transient());
        assert!(!ProviderErrorCode::ServerError.is_transient());
        assert!(!ProviderErrorCode::InvalidResponse.is_transient());
    }

    #[test]
    fn error_code_names() {
        assert_eq!(
            ProviderErrorCode::AuthenticationFailed.as_str(),
            "authentication_failed"
        );
        assert_eq!(ProviderErrorCode::Timeout.as_str(), "timeout");
        assert_eq!(ProviderErrorCode::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn provider_error_creation() {
        let err = ProviderError::configuration("api key is empty");
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert_eq!(err.message(), "api key is empty");
        assert!(err.provider().is_none());
        assert!(!err.is_transient());
    }

    #[test]
    fn provider_error_display() {
        let err = ProviderError::server("HTTP 503").with_provider("lastfm");
        let display = err.to_string();
        assert!(display.contains("[lastfm]"));
        assert!(display.contains("server_error"));
        assert!(display.contains("HTTP 503"));
    }

    #[test]
    fn provider_error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("connection reset");
        let err = ProviderError::network("request failed").with_source(io_err);
        assert!(err.source().is_some());
        assert!(err.is_transient());
    }
}
