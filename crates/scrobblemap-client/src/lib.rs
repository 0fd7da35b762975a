//! CLI, configuration, fetch pipeline wiring
//!
//! This crate provides the `scrobblemap` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
