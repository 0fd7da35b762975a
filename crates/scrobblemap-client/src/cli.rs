//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ClientConfig;

/// scrobblemap - Your listening history as a day × month heatmap
#[derive(Debug, Parser)]
#[command(name = "scrobblemap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "SCROBBLEMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the day × month listening matrix for a user
    Heatmap {
        /// Last.fm user name
        user: String,

        /// Output the render-ready heatmap view as JSON
        #[arg(long)]
        json: bool,

        /// Color palette (viridis, cividis, plasma, magma, inferno, turbo)
        #[arg(long)]
        palette: Option<String>,

        /// Chart title for JSON output
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Print per-day scrobble counts for a user
    Daily {
        /// Last.fm user name
        user: String,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags overriding the `[lastfm]`, `[fetch]` and `[display]` settings.
#[derive(Debug, Clone, Default, Args)]
pub struct FetchArgs {
    /// Maximum number of pages to fetch
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Concurrent page requests (1-16)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Overall deadline in seconds; partial results are kept
    #[arg(long)]
    pub deadline: Option<u64>,

    /// UTC offset for day boundaries, e.g. +02:00
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<String>,
}

impl FetchArgs {
    /// Overlays the flags onto `config`.
    pub fn apply(&self, config: &mut ClientConfig) {
        if let Some(max_pages) = self.max_pages {
            config.fetch.max_pages = max_pages;
        }
        if let Some(workers) = self.workers {
            config.fetch.workers = workers;
        }
        if let Some(timeout) = self.timeout {
            config.lastfm.timeout_secs = timeout;
        }
        if let Some(deadline) = self.deadline {
            config.fetch.deadline_secs = Some(deadline);
        }
        if let Some(ref offset) = self.utc_offset {
            config.display.utc_offset = offset.clone();
        }
    }
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_heatmap_flags() {
        let cli = Cli::try_parse_from([
            "scrobblemap",
            "heatmap",
            "alice",
            "--json",
            "--palette",
            "magma",
            "--max-pages",
            "3",
            "--workers",
            "2",
            "--utc-offset",
            "-05:00",
        ])
        .unwrap();

        match cli.command {
            Command::Heatmap {
                user,
                json,
                palette,
                fetch,
                ..
            } => {
                assert_eq!(user, "alice");
                assert!(json);
                assert_eq!(palette.as_deref(), Some("magma"));
                assert_eq!(fetch.max_pages, Some(3));
                assert_eq!(fetch.workers, Some(2));
                assert_eq!(fetch.utc_offset.as_deref(), Some("-05:00"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["scrobblemap", "daily", "bob", "-v"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Command::Daily { .. }));
    }

    #[test]
    fn apply_overrides_config() {
        let mut config = ClientConfig::default();
        let args = FetchArgs {
            max_pages: Some(50),
            workers: None,
            timeout: Some(2),
            deadline: Some(60),
            utc_offset: Some("+09:00".to_string()),
        };
        args.apply(&mut config);

        assert_eq!(config.fetch.max_pages, 50);
        assert_eq!(config.fetch.workers, 1);
        assert_eq!(config.lastfm.timeout_secs, 2);
        assert_eq!(config.fetch.deadline_secs, Some(60));
        assert_eq!(config.display.utc_offset, "+09:00");
    }

    #[test]
    fn user_is_required() {
        assert!(Cli::try_parse_from(["scrobblemap", "heatmap"]).is_err());
    }
}
