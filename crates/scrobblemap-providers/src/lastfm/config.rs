//! Last.fm client configuration.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{ProviderError, ProviderResult};

/// Configuration for the Last.fm client.
///
/// The API key is required; every other field has a default.
#[derive(Clone)]
pub struct LastfmConfig {
    api_key: String,

    /// API endpoint.
    ///
    /// Defaults to `https://ws.audioscrobbler.com/2.0/`.
    pub base_url: Url,

    /// Tracks per page, at most [`LastfmConfig::MAX_PAGE_SIZE`].
    pub page_size: u32,

    /// Per-request timeout. Expiry is reported as a transient failure.
    pub timeout: Duration,

    /// Wait used when a 429 response has no usable `Retry-After` header.
    pub rate_limit_fallback: Duration,

    /// User agent string for API requests.
    pub user_agent: String,
}

impl LastfmConfig {
    /// Default API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://ws.audioscrobbler.com/2.0/";

    /// Largest page size the API accepts.
    pub const MAX_PAGE_SIZE: u32 = 200;

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Default rate-limit wait in seconds.
    pub const DEFAULT_RATE_LIMIT_FALLBACK_SECS: u64 = 5;

    /// Creates a configuration for the given API key.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key is empty or blank.
    pub fn new(api_key: impl Into<String>) -> ProviderResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ProviderError::configuration("Last.fm API key is not set")
                .with_provider("lastfm"));
        }

        let base_url = Url::parse(Self::DEFAULT_BASE_URL).map_err(|e| {
            ProviderError::configuration("invalid default base URL").with_source(e)
        })?;

        Ok(Self {
            api_key,
            base_url,
            page_size: Self::MAX_PAGE_SIZE,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            rate_limit_fallback: Duration::from_secs(Self::DEFAULT_RATE_LIMIT_FALLBACK_SECS),
            user_agent: format!("scrobblemap/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Returns the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sets the API endpoint.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets the API endpoint from a string.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL does not parse.
    pub fn with_base_url_str(self, base_url: &str) -> ProviderResult<Self> {
        let url = Url::parse(base_url).map_err(|e| {
            ProviderError::configuration(format!("invalid base URL '{base_url}'")).with_source(e)
        })?;
        Ok(self.with_base_url(url))
    }

    /// Sets the page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, Self::MAX_PAGE_SIZE);
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the rate-limit fallback wait.
    pub fn with_rate_limit_fallback(mut self, wait: Duration) -> Self {
        self.rate_limit_fallback = wait;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl fmt::Debug for LastfmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LastfmConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .field("rate_limit_fallback", &self.rate_limit_fallback)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
