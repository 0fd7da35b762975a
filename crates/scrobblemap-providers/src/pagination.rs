//! Pagination over a [`PageFetcher`].
//!
//! The [`PaginationController`] drives a fetcher across every page the
//! provider declares, up to a configured ceiling:
//!
//! 1. Page 1 is fetched first. If it cannot be fetched the whole query is
//!    aborted, since the page total is unknown without it.
//! 2. The declared total (missing means 1) is clamped to `max_pages`.
//! 3. Pages `2..=total` are requested through a bounded worker pool and
//!    appended strictly in page order. An empty page ends pagination, as
//!    does any failure; accumulated events are kept.
//! 4. Rate limits are waited out and the same page is retried.
//!
//! Cancellation is honored at every request and every wait. It keeps
//! whatever was accumulated, unless page 1 never arrived.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures_util::{StreamExt, stream};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::cancel::CancelSignal;
use crate::error::ProviderError;
use crate::fetcher::{PageFetcher, PageResult, RecentTracksPage};
use crate::raw_event::RawEvent;

/// Default ceiling on the number of pages fetched per query.
pub const DEFAULT_MAX_PAGES: u32 = 10;

/// Default pause before each request after the first.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(200);

/// Default number of concurrent page requests.
pub const DEFAULT_WORKERS: usize = 1;

/// Upper bound on concurrent page requests.
pub const MAX_WORKERS: usize = 16;

/// Pagination settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    max_pages: u32,
    page_delay: Duration,
    workers: usize,
    max_rate_limit_retries: Option<u32>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            page_delay: DEFAULT_PAGE_DELAY,
            workers: DEFAULT_WORKERS,
            max_rate_limit_retries: None,
        }
    }
}

impl PaginationConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page ceiling. Values below 1 are raised to 1.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Sets the pause before each request after the first.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Sets the worker count, clamped to `1..=MAX_WORKERS`.
    ///
    /// Request starts stay at least `page_delay` apart however many workers
    /// run; extra workers only overlap slow responses.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, MAX_WORKERS);
        self
    }

    /// Caps rate-limit retries per page. `None` retries until the provider
    /// lets the request through.
    pub fn with_max_rate_limit_retries(mut self, retries: Option<u32>) -> Self {
        self.max_rate_limit_retries = retries;
        self
    }

    /// Returns the page ceiling.
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Returns the inter-request delay.
    pub fn page_delay(&self) -> Duration {
        self.page_delay
    }

    /// Returns the worker count.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the rate-limit retry cap, if any.
    pub fn max_rate_limit_retries(&self) -> Option<u32> {
        self.max_rate_limit_retries
    }
}

/// How a pagination run ended.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Every planned page was fetched.
    Complete,
    /// The given page was empty; the provider has no more data.
    Exhausted {
        /// The empty page.
        page: u32,
    },
    /// The given page failed; earlier pages are kept.
    Stopped {
        /// The failed page.
        page: u32,
        /// Why it failed.
        error: ProviderError,
    },
    /// Cancelled while working on the given page; earlier pages are kept.
    Cancelled {
        /// The page in progress.
        page: u32,
    },
    /// Page 1 could not be fetched; nothing is usable.
    Aborted(ProviderError),
}

impl FetchOutcome {
    /// Returns a short label for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Exhausted { .. } => "exhausted",
            Self::Stopped { .. } => "stopped",
            Self::Cancelled { .. } => "cancelled",
            Self::Aborted(_) => "aborted",
        }
    }
}

/// The result of [`PaginationController::fetch_all`].
#[derive(Debug)]
pub struct FetchReport {
    /// Accumulated events, in page order.
    pub events: Vec<RawEvent>,
    /// Number of pages that contributed events.
    pub pages_fetched: u32,
    /// Page total declared by the provider on page 1.
    pub declared_pages: Option<u32>,
    /// Pages planned after clamping to the ceiling.
    pub planned_pages: u32,
    /// How the run ended.
    pub outcome: FetchOutcome,
}

impl FetchReport {
    fn aborted(error: ProviderError) -> Self {
        Self {
            events: Vec::new(),
            pages_fetched: 0,
            declared_pages: None,
            planned_pages: 0,
            outcome: FetchOutcome::Aborted(error),
        }
    }

    /// Returns true if no page could be fetched.
    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Aborted(_))
    }

    /// Returns true if pagination ended before all planned pages because of
    /// a failure or cancellation.
    pub fn is_partial(&self) -> bool {
        matches!(
            self.outcome,
            FetchOutcome::Stopped { .. } | FetchOutcome::Cancelled { .. }
        )
    }

    /// Returns the fatal error, if the run was aborted.
    pub fn abort_reason(&self) -> Option<&ProviderError> {
        match &self.outcome {
            FetchOutcome::Aborted(error) => Some(error),
            _ => None,
        }
    }

    /// Consumes the report, returning the events.
    pub fn into_events(self) -> Vec<RawEvent> {
        self.events
    }
}

/// Result of fetching one page, after rate limits have been waited out.
enum Attempt {
    Fetched(RecentTracksPage),
    Failed(ProviderError),
    Cancelled,
}

/// Drives a [`PageFetcher`] across all pages of a user's history.
#[derive(Debug)]
pub struct PaginationController<F> {
    fetcher: F,
    config: PaginationConfig,
}

impl<F: PageFetcher> PaginationController<F> {
    /// Creates a controller over `fetcher`.
    pub fn new(fetcher: F, config: PaginationConfig) -> Self {
        Self { fetcher, config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Returns the underlying fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches every page of `user`'s history, up to the page ceiling.
    ///
    /// Never fails: the report's [`FetchOutcome`] says how the run ended.
    #[tracing::instrument(skip(self, cancel), fields(fetcher = self.fetcher.name()))]
    pub async fn fetch_all(&self, user: &str, cancel: &CancelSignal) -> FetchReport {
        let first = match self.fetch_with_retry(user, 1, cancel).await {
            Attempt::Fetched(page) => page,
            Attempt::Failed(err) => {
                error!(error = %err, "first page failed, aborting");
                return FetchReport::aborted(err);
            }
            Attempt::Cancelled => {
                warn!("cancelled before the first page arrived");
                return FetchReport::aborted(
                    ProviderError::cancelled("cancelled before the first page arrived")
                        .with_provider(self.fetcher.name()),
                );
            }
        };

        let declared_pages = first.total_pages;
        let planned_pages = declared_pages.unwrap_or(1).clamp(1, self.config.max_pages);
        info!(
            declared = ?declared_pages,
            planned = planned_pages,
            max_pages = self.config.max_pages,
            "effective page total"
        );

        let mut report = FetchReport {
            events: Vec::new(),
            pages_fetched: 0,
            declared_pages,
            planned_pages,
            outcome: FetchOutcome::Complete,
        };

        if first.is_empty() {
            debug!("first page is empty");
            report.outcome = FetchOutcome::Exhausted { page: 1 };
            return report;
        }
        report.events.extend(first.events);
        report.pages_fetched = 1;

        // Results are yielded in page order regardless of completion order.
        // Breaking out of the loop drops the stream and with it any request
        // still in flight.
        let pacer = Pacer::default();
        let mut pages = stream::iter(2..=planned_pages)
            .map(|page| self.fetch_paced(user, page, cancel, &pacer))
            .buffered(self.config.workers);

        while let Some((page, attempt)) = pages.next().await {
            match attempt {
                Attempt::Fetched(fetched) if fetched.is_empty() => {
                    debug!(page, "empty page, stopping");
                    report.outcome = FetchOutcome::Exhausted { page };
                    break;
                }
                Attempt::Fetched(fetched) => {
                    debug!(page, events = fetched.events.len(), "page appended");
                    report.events.extend(fetched.events);
                    report.pages_fetched += 1;
                }
                Attempt::Failed(error) => {
                    warn!(page, error = %error, "page failed, keeping partial results");
                    report.outcome = FetchOutcome::Stopped { page, error };
                    break;
                }
                Attempt::Cancelled => {
                    warn!(page, "cancelled, keeping partial results");
                    report.outcome = FetchOutcome::Cancelled { page };
                    break;
                }
            }
        }

        info!(
            pages = report.pages_fetched,
            events = report.events.len(),
            outcome = report.outcome.as_str(),
            "pagination finished"
        );
        report
    }

    /// Waits for `page`'s start slot, then fetches it.
    async fn fetch_paced(
        &self,
        user: &str,
        page: u32,
        cancel: &CancelSignal,
        pacer: &Pacer,
    ) -> (u32, Attempt) {
        let wait = pacer.reserve(self.config.page_delay);
        if !self.pause(wait, cancel).await {
            return (page, Attempt::Cancelled);
        }
        (page, self.fetch_with_retry(user, page, cancel).await)
    }

    /// Fetches `page`, waiting out rate limits and retrying the same page.
    async fn fetch_with_retry(&self, user: &str, page: u32, cancel: &CancelSignal) -> Attempt {
        let mut rate_limited = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Attempt::Cancelled;
            }

            debug!(page, attempt = rate_limited + 1, "requesting page");
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Attempt::Cancelled,
                result = self.fetcher.fetch_page(user, page) => result,
            };

            match result {
                PageResult::Success(fetched) => return Attempt::Fetched(fetched),
                PageResult::RateLimited { retry_after } => {
                    if let Some(limit) = self.config.max_rate_limit_retries {
                        if rate_limited >= limit {
                            return Attempt::Failed(
                                ProviderError::rate_limited(format!(
                                    "page {page} still rate limited after {limit} retries"
                                ))
                                .with_provider(self.fetcher.name()),
                            );
                        }
                    }
                    rate_limited += 1;
                    warn!(
                        page,
                        retry_after_ms = retry_after.as_millis() as u64,
                        retries = rate_limited,
                        "rate limited, waiting before retrying"
                    );
                    if !self.pause(retry_after, cancel).await {
                        return Attempt::Cancelled;
                    }
                }
                PageResult::TransientFailure(error) | PageResult::PermanentFailure(error) => {
                    return Attempt::Failed(error);
                }
            }
        }
    }

    /// Sleeps for `duration`. Returns false if cancelled first.
    async fn pause(&self, duration: Duration, cancel: &CancelSignal) -> bool {
        if duration.is_zero() {
            return !cancel.is_cancelled();
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}

/// Hands out request start times spaced `delay` apart, shared by all workers.
#[derive(Debug, Default)]
struct Pacer {
    last: Mutex<Option<Instant>>,
}

impl Pacer {
    /// Reserves the next slot and returns how long to wait for it.
    ///
    /// A slot is never earlier than `delay` from now, nor than `delay` after
    /// the previously reserved slot.
    fn reserve(&self, delay: Duration) -> Duration {
        let now = Instant::now();
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = match *last {
            Some(previous) => (now + delay).max(previous + delay),
            None => now + delay,
        };
        *last = Some(slot);
        slot - now
    }
}
