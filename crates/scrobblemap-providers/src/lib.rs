//! Scrobble sources and the pagination pipeline.
//!
//! This crate turns a paginated, rate-limited listening-history API into a
//! list of canonical events:
//!
//! - [`PageFetcher`] - One page request, classified into a [`PageResult`]
//! - [`PaginationController`] - Drives a fetcher across all pages
//! - [`RawEvent`] - Provider-agnostic raw listening event
//! - [`normalize_events`] - Converts raw events to canonical form
//! - [`ProviderError`] - Error types for provider operations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   Last.fm API    │
//! └────────┬─────────┘
//!          │ HTTP, one request per page
//!          ▼
//! ┌──────────────────┐
//! │   LastfmClient   │  PageFetcher
//! └────────┬─────────┘
//!          │ PageResult
//!          ▼
//! ┌──────────────────────┐
//! │ PaginationController │  pacing, 429 waits, stopping rules
//! └────────┬─────────────┘
//!          │ Vec<RawEvent>
//!          ▼ normalize_events()
//!   ┌────────────────┐
//!   │ CanonicalEvent │
//!   └────────────────┘
//! ```

pub mod cancel;
pub mod error;
pub mod fetcher;
#[cfg(feature = "lastfm")]
pub mod lastfm;
pub mod normalize;
pub mod pagination;
pub mod raw_event;

// Re-export main types at crate root
pub use cancel::{CancelHandle, CancelSignal};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use fetcher::{BoxFuture, ErrorFetcher, PageFetcher, PageResult, RecentTracksPage};
pub use normalize::{normalize_event, normalize_events};
pub use pagination::{FetchOutcome, FetchReport, PaginationConfig, PaginationController};
pub use raw_event::{RawEvent, RawEventTime};
