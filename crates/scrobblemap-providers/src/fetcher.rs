//! PageFetcher trait definition.
//!
//! This module defines the [`PageFetcher`] trait, the abstraction over a
//! paginated scrobble API. A fetcher issues exactly one request per call
//! and classifies the outcome; retry policy lives in the
//! [`PaginationController`](crate::PaginationController).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::ProviderError;
use crate::raw_event::RawEvent;

/// A boxed future for async trait methods.
///
/// Using boxed futures keeps the trait object-safe, so the controller can
/// hold a `dyn PageFetcher` as well as a concrete client.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One decoded page of listening history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentTracksPage {
    /// Events on this page, in the order the provider returned them.
    pub events: Vec<RawEvent>,
    /// Total page count declared by the provider, if it sent a usable one.
    pub total_pages: Option<u32>,
}

impl RecentTracksPage {
    /// Creates a page holding the given events.
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self {
            events,
            total_pages: None,
        }
    }

    /// Builder method to set the declared total page count.
    pub fn with_total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = Some(total_pages);
        self
    }

    /// Returns true if the page carries no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// The classified outcome of a single page request.
#[derive(Debug)]
pub enum PageResult {
    /// The page was fetched and decoded.
    Success(RecentTracksPage),
    /// The provider asked us to slow down; retry the same page after waiting.
    RateLimited {
        /// How long to wait before retrying.
        retry_after: Duration,
    },
    /// Connection-level failure or timeout.
    TransientFailure(ProviderError),
    /// Non-2xx status or malformed payload.
    PermanentFailure(ProviderError),
}

impl PageResult {
    /// Returns a short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::RateLimited { .. } => "rate_limited",
            Self::TransientFailure(_) => "transient_failure",
            Self::PermanentFailure(_) => "permanent_failure",
        }
    }

    /// Returns true for [`PageResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// The core abstraction for paginated scrobble sources.
///
/// # Implementation Notes
///
/// - Implementations should be `Send + Sync` so one fetcher can serve
///   several concurrent page requests
/// - `fetch_page` is called with `page >= 1`
/// - Implementations must not retry internally; rate limits are reported
///   through [`PageResult::RateLimited`] and waited out by the caller
///
/// # Example Implementation
///
/// ```ignore
/// struct StaticFetcher {
///     pages: Vec<RecentTracksPage>,
/// }
///
/// impl PageFetcher for StaticFetcher {
///     fn name(&self) -> &str { "static" }
///
///     fn fetch_page<'a>(&'a self, _user: &'a str, page: u32) -> BoxFuture<'a, PageResult> {
///         Box::pin(async move {
///             match self.pages.get(page as usize - 1) {
///                 Some(p) => PageResult::Success(p.clone()),
///                 None => PageResult::Success(RecentTracksPage::default()),
///             }
///         })
///     }
/// }
/// ```
pub trait PageFetcher: Send + Sync {
    /// Returns the name of this fetcher (e.g., "lastfm").
    fn name(&self) -> &str;

    /// Fetches one page of `user`'s listening history.
    fn fetch_page<'a>(&'a self, user: &'a str, page: u32) -> BoxFuture<'a, PageResult>;
}

impl<T: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_page<'a>(&'a self, user: &'a str, page: u32) -> BoxFuture<'a, PageResult> {
        (**self).fetch_page(user, page)
    }
}

/// A fetcher that always fails permanently.
///
/// This is useful for testing or as a placeholder when a real fetcher
/// fails to initialize.
#[derive(Debug)]
pub struct ErrorFetcher {
    name: String,
    error: ProviderError,
}

impl ErrorFetcher {
    /// Creates a new error fetcher.
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl PageFetcher for ErrorFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_page<'a>(&'a self, _user: &'a str, _page: u32) -> BoxFuture<'a, PageResult> {
        // ProviderError is not Clone; rebuild it from its parts
        let error =
            ProviderError::new(self.error.code(), self.error.message()).with_provider(&self.name);
        Box::pin(async move { PageResult::PermanentFailure(error) })
    }
}
