//! scrobblemap CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use scrobblemap_client::cli::{Cli, Command, ConfigAction};
use scrobblemap_client::commands;
use scrobblemap_client::commands::heatmap::HeatmapOptions;
use scrobblemap_client::config::ClientConfig;
use scrobblemap_client::error::ClientResult;
use scrobblemap_core::{LogMode, OutputFormat, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_tracing(LogMode::from_flags(cli.debug, cli.log_json)) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let mut config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };

    match cli.command {
        Command::Heatmap {
            user,
            json,
            palette,
            title,
            fetch,
        } => {
            fetch.apply(&mut config);
            let options = HeatmapOptions {
                format: if json {
                    OutputFormat::Json
                } else {
                    config.display.format
                },
                palette,
                title,
            };
            commands::heatmap::run(&config, &user, &options).await
        }
        Command::Daily { user, fetch } => {
            fetch.apply(&mut config);
            commands::daily::run(&config, &user).await
        }
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
