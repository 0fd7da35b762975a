//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/scrobblemap/config.toml` by default. Every field is optional.
//!
//! The Last.fm `api_key` supports secret references:
//! - `pass::path/in/store`: resolved via `pass show`
//! - `env::VAR_NAME`: resolved from the environment
//! - plain text: used as-is
//!
//! Without an `api_key`, the `LASTFM_API_KEY` environment variable is used.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use scrobblemap_core::{OutputFormat, Palette};
use scrobblemap_providers::PaginationConfig;
use scrobblemap_providers::lastfm::LastfmConfig;

use crate::error::{ClientError, ClientResult};

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "LASTFM_API_KEY";

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the scrobblemap client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Last.fm API settings.
    pub lastfm: LastfmSettings,

    /// Pagination settings.
    pub fetch: FetchSettings,

    /// Display settings.
    pub display: DisplaySettings,
}

/// Last.fm API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LastfmSettings {
    /// API key (supports `pass::` and `env::` prefixes).
    pub api_key: Option<String>,

    /// API endpoint override.
    pub base_url: Option<String>,

    /// Tracks per page.
    pub page_size: u32,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Wait in seconds when a rate-limit response has no `Retry-After`.
    pub rate_limit_fallback_secs: u64,
}

impl Default for LastfmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            page_size: LastfmConfig::MAX_PAGE_SIZE,
            timeout_secs: LastfmConfig::DEFAULT_TIMEOUT_SECS,
            rate_limit_fallback_secs: LastfmConfig::DEFAULT_RATE_LIMIT_FALLBACK_SECS,
        }
    }
}

/// Pagination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Maximum number of pages fetched per query.
    pub max_pages: u32,

    /// Pause between page requests in milliseconds.
    pub page_delay_ms: u64,

    /// Concurrent page requests.
    pub workers: usize,

    /// Give up on a page after this many rate-limit retries.
    pub max_rate_limit_retries: Option<u32>,

    /// Overall deadline for a query in seconds.
    pub deadline_secs: Option<u64>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_pages: scrobblemap_providers::pagination::DEFAULT_MAX_PAGES,
            page_delay_ms: scrobblemap_providers::pagination::DEFAULT_PAGE_DELAY.as_millis() as u64,
            workers: scrobblemap_providers::pagination::DEFAULT_WORKERS,
            max_rate_limit_retries: None,
            deadline_secs: None,
        }
    }
}

/// Display settings for output formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Heatmap color palette name.
    pub palette: String,

    /// Chart title.
    pub title: Option<String>,

    /// UTC offset used to bucket events into days, e.g. `"+02:00"`.
    pub utc_offset: String,

    /// Default output format.
    pub format: OutputFormat,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            palette: Palette::default().to_string(),
            title: None,
            utc_offset: "+00:00".to_string(),
            format: OutputFormat::default(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the default configuration.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scrobblemap")
    }
}

impl LastfmSettings {
    /// Resolves the API key.
    ///
    /// A configured value is passed through `secret::resolve()`; otherwise
    /// `LASTFM_API_KEY` is read from the environment.
    pub fn resolve_api_key(&self) -> ClientResult<String> {
        match self.api_key.as_deref() {
            Some(raw) => crate::secret::resolve(raw)
                .map_err(|e| ClientError::Config(format!("failed to resolve api_key: {}", e))),
            None => std::env::var(API_KEY_ENV).map_err(|_| {
                ClientError::Config(format!(
                    "Last.fm API key not found. Set {API_KEY_ENV} or add to {}:\n  \
                     [lastfm]\n  \
                     api_key = \"YOUR_KEY\"",
                    ClientConfig::default_path().display()
                ))
            }),
        }
    }

    /// Converts to provider configuration.
    pub fn to_provider_config(&self) -> ClientResult<LastfmConfig> {
        let api_key = self.resolve_api_key()?;
        let mut config = LastfmConfig::new(api_key)?
            .with_page_size(self.page_size)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_rate_limit_fallback(Duration::from_secs(self.rate_limit_fallback_secs));

        if let Some(ref base_url) = self.base_url {
            config = config.with_base_url_str(base_url)?;
        }

        Ok(config)
    }
}

impl FetchSettings {
    /// Converts to pagination configuration.
    pub fn to_pagination_config(&self) -> PaginationConfig {
        PaginationConfig::new()
            .with_max_pages(self.max_pages)
            .with_page_delay(Duration::from_millis(self.page_delay_ms))
            .with_workers(self.workers)
            .with_max_rate_limit_retries(self.max_rate_limit_retries)
    }

    /// Returns the overall deadline, if configured.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

impl DisplaySettings {
    /// Parses the configured palette.
    pub fn palette(&self) -> ClientResult<Palette> {
        self.palette
            .parse()
            .map_err(|e| ClientError::Config(format!("{}", e)))
    }

    /// Parses the configured UTC offset.
    pub fn offset(&self) -> ClientResult<FixedOffset> {
        parse_utc_offset(&self.utc_offset)
    }
}

/// Parses a UTC offset such as `"+02:00"`, `"-05:30"` or `"Z"`.
pub fn parse_utc_offset(value: &str) -> ClientResult<FixedOffset> {
    let value = value.trim();
    let normalized = if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        "+00:00"
    } else {
        value
    };
    normalized
        .parse::<FixedOffset>()
        .map_err(|e| ClientError::Config(format!("invalid UTC offset '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.lastfm.page_size, 200);
        assert_eq!(config.lastfm.timeout_secs, 10);
        assert_eq!(config.lastfm.rate_limit_fallback_secs, 5);
        assert_eq!(config.fetch.max_pages, 10);
        assert_eq!(config.fetch.page_delay_ms, 200);
        assert_eq!(config.fetch.workers, 1);
        assert_eq!(config.display.palette, "Viridis");
        assert_eq!(config.display.format, OutputFormat::Table);
    }

    #[test]
    fn parse_full_toml() {
        let toml_content = r#"
[lastfm]
api_key = "plain-key"
base_url = "http://localhost:8080/2.0/"
timeout_secs = 3

[fetch]
max_pages = 25
page_delay_ms = 0
workers = 4
max_rate_limit_retries = 3
deadline_secs = 120

[display]
palette = "magma"
utc_offset = "+02:00"
format = "json"
"#;
        let config: ClientConfig = toml::from_str(toml_content).unwrap();

        let lastfm = config.lastfm.to_provider_config().unwrap();
        assert_eq!(lastfm.api_key(), "plain-key");
        assert_eq!(lastfm.base_url.as_str(), "http://localhost:8080/2.0/");
        assert_eq!(lastfm.timeout, Duration::from_secs(3));
        assert_eq!(lastfm.page_size, 200);

        let pagination = config.fetch.to_pagination_config();
        assert_eq!(pagination.max_pages(), 25);
        assert_eq!(pagination.page_delay(), Duration::ZERO);
        assert_eq!(pagination.workers(), 4);
        assert_eq!(pagination.max_rate_limit_retries(), Some(3));
        assert_eq!(config.fetch.deadline(), Some(Duration::from_secs(120)));

        assert_eq!(config.display.palette().unwrap(), Palette::Magma);
        assert_eq!(
            config.display.offset().unwrap(),
            FixedOffset::east_opt(2 * 3600).unwrap()
        );
        assert_eq!(config.display.format, OutputFormat::Json);
    }

    #[test]
    fn empty_toml_is_default() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.fetch.max_pages, 10);
        assert!(config.lastfm.api_key.is_none());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetch]\nmax_pages = 3").unwrap();

        let config = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(config.fetch.max_pages, 3);
        assert_eq!(config.fetch.workers, 1);
    }

    #[test]
    fn load_from_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetch\nmax_pages = ").unwrap();

        let err = ClientConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn api_key_env_reference() {
        unsafe {
            std::env::set_var("_SM_TEST_LASTFM_KEY", "from-env");
        }

        let settings = LastfmSettings {
            api_key: Some("env::_SM_TEST_LASTFM_KEY".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.resolve_api_key().unwrap(), "from-env");

        unsafe {
            std::env::remove_var("_SM_TEST_LASTFM_KEY");
        }
    }

    #[test]
    fn api_key_reference_to_missing_var_errors() {
        let settings = LastfmSettings {
            api_key: Some("env::_SM_TEST_MISSING_KEY_98765".to_string()),
            ..Default::default()
        };
        let err = settings.resolve_api_key().unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn blank_api_key_is_configuration_error() {
        let settings = LastfmSettings {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        let err = settings.to_provider_config().unwrap_err();
        assert!(matches!(err, ClientError::Provider(_)));
    }

    #[test]
    fn invalid_palette() {
        let display = DisplaySettings {
            palette: "rainbow".to_string(),
            ..Default::default()
        };
        assert!(display.palette().is_err());
    }

    #[test]
    fn utc_offsets() {
        assert_eq!(
            parse_utc_offset("Z").unwrap(),
            FixedOffset::east_opt(0).unwrap()
        );
        assert_eq!(
            parse_utc_offset("-05:30").unwrap(),
            FixedOffset::west_opt(5 * 3600 + 1800).unwrap()
        );
        assert!(parse_utc_offset("tomorrow").is_err());
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = ClientConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.fetch.max_pages, config.fetch.max_pages);
        assert_eq!(parsed.display.utc_offset, config.display.utc_offset);
    }
}
