//! Fetch pipeline wiring.
//!
//! Builds the Last.fm client and pagination controller from configuration,
//! runs pagination under Ctrl+C and an optional deadline, and normalizes the
//! result. Only a fatal first-page failure becomes an error; partial
//! results are returned with a warning.

use std::time::Duration;

use tracing::{info, warn};

use scrobblemap_core::CanonicalEvent;
use scrobblemap_providers::lastfm::LastfmClient;
use scrobblemap_providers::{
    CancelHandle, CancelSignal, FetchOutcome, FetchReport, PageFetcher, PaginationController,
    normalize_events,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Canonical events produced by one pipeline run.
#[derive(Debug)]
pub struct FetchedEvents {
    /// Completed listening events.
    pub events: Vec<CanonicalEvent>,
    /// Raw entries received before normalization.
    pub raw_count: usize,
    /// True if pagination stopped early on a failure or cancellation.
    pub partial: bool,
}

/// Builds a Last.fm pagination controller from configuration.
pub fn lastfm_controller(config: &ClientConfig) -> ClientResult<PaginationController<LastfmClient>> {
    let client = LastfmClient::new(config.lastfm.to_provider_config()?)?;
    Ok(PaginationController::new(
        client,
        config.fetch.to_pagination_config(),
    ))
}

/// Creates the cancellation pair for one run, bounded by `deadline`.
pub fn cancel_pair(deadline: Option<Duration>) -> (CancelHandle, CancelSignal) {
    let handle = CancelHandle::new();
    let signal = match deadline {
        Some(deadline) => handle.signal().with_timeout(deadline),
        None => handle.signal(),
    };
    (handle, signal)
}

/// Cancels `handle` when Ctrl+C is pressed.
pub fn spawn_ctrl_c_listener(handle: CancelHandle) {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            warn!("received Ctrl+C, stopping after the current page");
            handle.cancel();
        }
    });
}

/// Fetches and normalizes `user`'s listening history.
pub async fn fetch_events<F: PageFetcher>(
    controller: &PaginationController<F>,
    user: &str,
    cancel: &CancelSignal,
) -> ClientResult<FetchedEvents> {
    let report = controller.fetch_all(user, cancel).await;
    let partial = report.is_partial();
    let FetchReport {
        events, outcome, ..
    } = report;

    match outcome {
        FetchOutcome::Aborted(error) => return Err(ClientError::Fetch(error)),
        FetchOutcome::Stopped { page, error } => {
            warn!(page, error = %error, "showing partial results");
        }
        FetchOutcome::Cancelled { page } => {
            warn!(page, "fetch cancelled, showing partial results");
        }
        FetchOutcome::Complete | FetchOutcome::Exhausted { .. } => {}
    }

    let canonical = normalize_events(&events);
    info!(
        raw = events.len(),
        canonical = canonical.len(),
        partial,
        "fetched listening history"
    );

    Ok(FetchedEvents {
        events: canonical,
        raw_count: events.len(),
        partial,
    })
}

/// Runs the full fetch for `user` with Ctrl+C handling and the configured deadline.
pub async fn run_fetch(config: &ClientConfig, user: &str) -> ClientResult<FetchedEvents> {
    let controller = lastfm_controller(config)?;
    let (handle, signal) = cancel_pair(config.fetch.deadline());
    spawn_ctrl_c_listener(handle);
    fetch_events(&controller, user, &signal).await
}
