//! Logging setup for the `scrobblemap` binary.
//!
//! Logs always go to stderr so table and JSON output on stdout stay clean.
//! `RUST_LOG` replaces the mode's default filter when set.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, fmt::format::FmtSpan, prelude::*};

/// Target prefix shared by all workspace crates.
const TARGET_PREFIX: &str = "scrobblemap";

/// Errors from [`init_tracing`].
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("logging already initialized: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// How much is logged, and in which shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogMode {
    /// Warnings only, one short line each.
    #[default]
    Quiet,
    /// Debug level with timestamps, targets and source locations.
    Verbose,
    /// Info level as JSON lines, including span open/close events.
    Json,
}

impl LogMode {
    /// Picks the mode from the `--debug` and `--log-json` flags; JSON wins.
    pub fn from_flags(debug: bool, json: bool) -> Self {
        match (debug, json) {
            (_, true) => Self::Json,
            (true, false) => Self::Verbose,
            (false, false) => Self::Quiet,
        }
    }

    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::WARN,
            Self::Verbose => Level::DEBUG,
            Self::Json => Level::INFO,
        }
    }

    /// Filter used when `RUST_LOG` is unset.
    pub fn default_directive(self) -> String {
        format!("{TARGET_PREFIX}={}", self.level())
    }

    fn filter(self, rust_log: Option<&str>) -> Result<EnvFilter, TracingError> {
        let directive = match rust_log.map(str::trim) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => self.default_directive(),
        };
        Ok(EnvFilter::try_new(directive)?)
    }
}

/// Installs the global subscriber for `mode`.
///
/// # Errors
///
/// Fails on an unparsable `RUST_LOG` or when a subscriber is already set.
pub fn init_tracing(mode: LogMode) -> Result<(), TracingError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = mode.filter(rust_log.as_deref())?;

    let layer = match mode {
        LogMode::Quiet => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .boxed(),
        LogMode::Verbose => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogMode::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_flags() {
        assert_eq!(LogMode::from_flags(false, false), LogMode::Quiet);
        assert_eq!(LogMode::from_flags(true, false), LogMode::Verbose);
        assert_eq!(LogMode::from_flags(true, true), LogMode::Json);
        assert_eq!(LogMode::default(), LogMode::Quiet);
    }

    #[test]
    fn directives() {
        assert_eq!(LogMode::Quiet.default_directive(), "scrobblemap=WARN");
        assert_eq!(LogMode::Verbose.default_directive(), "scrobblemap=DEBUG");
        assert_eq!(LogMode::Json.default_directive(), "scrobblemap=INFO");
    }

    #[test]
    fn rust_log_overrides_mode() {
        assert!(LogMode::Quiet.filter(Some("scrobblemap_providers=trace")).is_ok());
        assert!(LogMode::Verbose.filter(Some("  ")).is_ok());
        assert!(LogMode::Json.filter(None).is_ok());
    }

    #[test]
    fn bad_rust_log_is_an_error() {
        let err = LogMode::Quiet.filter(Some("scrobblemap=loud")).unwrap_err();
        assert!(matches!(err, TracingError::Filter(_)));
    }
}
