//! Last.fm scrobble source.
//!
//! This module provides a [`LastfmClient`] that fetches a user's listening
//! history through the `user.getrecenttracks` API method and implements
//! [`PageFetcher`](crate::PageFetcher).
//!
//! # Response quirks
//!
//! - `recenttracks.track` is a list, or a bare object when a page holds a
//!   single track
//! - numeric attributes such as `totalPages` and `date.uts` arrive as strings
//! - the currently playing track has no `date` and carries
//!   `@attr.nowplaying = "true"`
//! - API errors may come back with status 200 and an `error` field
//!
//! # Example
//!
//! ```ignore
//! use scrobblemap_providers::lastfm::{LastfmClient, LastfmConfig};
//! use scrobblemap_providers::{CancelSignal, PaginationConfig, PaginationController};
//!
//! let client = LastfmClient::new(LastfmConfig::new(api_key)?)?;
//! let controller = PaginationController::new(client, PaginationConfig::default());
//! let report = controller.fetch_all("rj", &CancelSignal::never()).await;
//! ```

mod client;
mod config;

pub use client::{LastfmClient, PROVIDER_NAME, classify_status, decode_page, parse_retry_after};
pub use config::LastfmConfig;
