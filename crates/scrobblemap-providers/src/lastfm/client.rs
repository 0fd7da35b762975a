//! Last.fm `user.getrecenttracks` client.
//!
//! One call of [`LastfmClient::recent_tracks`] issues one HTTP request and
//! classifies the outcome into a [`PageResult`]. Nothing is retried here.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::config::LastfmConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::fetcher::{BoxFuture, PageFetcher, PageResult, RecentTracksPage};
use crate::raw_event::{RawEvent, RawEventTime};

/// Provider name used in errors and logs.
pub const PROVIDER_NAME: &str = "lastfm";

/// API method for a user's listening history.
const RECENT_TRACKS_METHOD: &str = "user.getrecenttracks";

/// Last.fm error codes that mean the API key was rejected.
const AUTH_ERROR_CODES: &[i64] = &[4, 9, 10, 14, 26];

/// Last.fm API client.
#[derive(Debug)]
pub struct LastfmClient {
    http_client: reqwest::Client,
    config: LastfmConfig,
}

impl LastfmClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: LastfmConfig) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                ProviderError::configuration("failed to create HTTP client")
                    .with_provider(PROVIDER_NAME)
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LastfmConfig {
        &self.config
    }

    /// Builds the request URL for one page.
    pub fn page_url(&self, user: &str, page: u32) -> Url {
        let mut url = self.config.base_url.clone();
        url.query_pairs_mut()
            .append_pair("method", RECENT_TRACKS_METHOD)
            .append_pair("user", user)
            .append_pair("api_key", self.config.api_key())
            .append_pair("format", "json")
            .append_pair("limit", &self.config.page_size.to_string())
            .append_pair("page", &page.to_string());
        url
    }

    /// Fetches one page of `user`'s recent tracks.
    pub async fn recent_tracks(&self, user: &str, page: u32) -> PageResult {
        debug!(user, page, "requesting recent tracks");

        let response = match self.http_client.get(self.page_url(user, page)).send().await {
            Ok(response) => response,
            Err(e) => return PageResult::TransientFailure(request_error(e)),
        };

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return PageResult::TransientFailure(request_error(e)),
        };

        if let Some(result) = classify_status(
            status,
            retry_after.as_deref(),
            self.config.rate_limit_fallback,
            &body,
        ) {
            return result;
        }

        match decode_page(&body) {
            Ok(decoded) => {
                debug!(
                    page,
                    events = decoded.events.len(),
                    total_pages = ?decoded.total_pages,
                    "decoded page"
                );
                PageResult::Success(decoded)
            }
            Err(e) => PageResult::PermanentFailure(e),
        }
    }
}

impl PageFetcher for LastfmClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn fetch_page<'a>(&'a self, user: &'a str, page: u32) -> BoxFuture<'a, PageResult> {
        Box::pin(self.recent_tracks(user, page))
    }
}

/// Maps a reqwest error to a transient provider error.
fn request_error(e: reqwest::Error) -> ProviderError {
    let error = if e.is_timeout() {
        ProviderError::timeout("request timed out")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {e}"))
    } else {
        ProviderError::network(format!("request failed: {e}"))
    };
    error.with_provider(PROVIDER_NAME).with_source(e)
}

/// Classifies a non-success status.
///
/// Returns `None` for 2xx, leaving the body to be decoded.
pub fn classify_status(
    status: StatusCode,
    retry_after: Option<&str>,
    fallback: Duration,
    body: &str,
) -> Option<PageResult> {
    if status.is_success() {
        return None;
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let wait = parse_retry_after(retry_after, fallback);
        warn!(retry_after_secs = wait.as_secs(), "rate limited");
        return Some(PageResult::RateLimited { retry_after: wait });
    }

    let detail = api_error_message(body)
        .map(|m| format!(": {m}"))
        .unwrap_or_default();

    let error = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::authentication(format!("HTTP {status}{detail}"))
        }
        s if s.is_client_error() => ProviderError::client(format!("HTTP {status}{detail}")),
        s if s.is_server_error() => ProviderError::server(format!("HTTP {status}{detail}")),
        _ => ProviderError::invalid_response(format!("unexpected HTTP {status}")),
    };

    Some(PageResult::PermanentFailure(
        error.with_provider(PROVIDER_NAME),
    ))
}

/// Parses a `Retry-After` value in whole seconds.
///
/// Falls back to `fallback` when the header is absent or unparsable.
pub fn parse_retry_after(value: Option<&str>, fallback: Duration) -> Duration {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

/// Decodes a `user.getrecenttracks` JSON body.
///
/// # Errors
///
/// Returns a permanent error for unparsable bodies, API error payloads, and
/// bodies lacking the `recenttracks.track` list.
pub fn decode_page(body: &str) -> ProviderResult<RecentTracksPage> {
    let response: RecentTracksResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse response: {e}"))
            .with_provider(PROVIDER_NAME)
            .with_source(e)
    })?;

    if let Some(code) = response.error {
        let code = value_as_i64(&code);
        let message = response.message.unwrap_or_else(|| "unknown API error".into());
        let error = match code {
            Some(c) if AUTH_ERROR_CODES.contains(&c) => {
                ProviderError::authentication(format!("API error {c}: {message}"))
            }
            Some(c) => ProviderError::invalid_response(format!("API error {c}: {message}")),
            None => ProviderError::invalid_response(format!("API error: {message}")),
        };
        return Err(error.with_provider(PROVIDER_NAME));
    }

    let recent = response.recenttracks.ok_or_else(|| {
        ProviderError::invalid_response("response has no recenttracks").with_provider(PROVIDER_NAME)
    })?;
    let tracks = recent.track.ok_or_else(|| {
        ProviderError::invalid_response("response has no track list").with_provider(PROVIDER_NAME)
    })?;

    let events = tracks
        .into_vec()
        .into_iter()
        .map(|t| ApiTrack::from_value(t).into_raw())
        .collect();
    let total_pages = recent
        .attr
        .and_then(|a| a.total_pages)
        .and_then(|v| value_as_i64(&v))
        .and_then(|n| u32::try_from(n).ok());

    Ok(RecentTracksPage {
        events,
        total_pages,
    })
}

/// Reads a number that may arrive as a JSON string or number.
fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<RecentTracksResponse>(body)
        .ok()
        .and_then(|r| r.message)
}

/// Response from `user.getrecenttracks`.
#[derive(Debug, Deserialize)]
struct RecentTracksResponse {
    recenttracks: Option<ApiRecentTracks>,
    error: Option<Value>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRecentTracks {
    track: Option<OneOrMany<Value>>,
    #[serde(rename = "@attr")]
    attr: Option<ApiPageAttr>,
}

/// The API returns a bare object instead of a list when a page holds one track.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiPageAttr {
    #[serde(rename = "totalPages")]
    total_pages: Option<Value>,
}

/// One entry of the track list.
///
/// Fields stay loosely typed so a malformed entry loses only its own data,
/// never the page.
#[derive(Debug, Default, Deserialize)]
struct ApiTrack {
    name: Option<Value>,
    artist: Option<Value>,
    album: Option<Value>,
    date: Option<Value>,
    #[serde(rename = "@attr")]
    attr: Option<Value>,
}

impl ApiTrack {
    fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| {
            debug!(error = %e, "unreadable track entry");
            Self::default()
        })
    }

    fn into_raw(self) -> RawEvent {
        RawEvent {
            track: self.name.as_ref().and_then(value_text),
            artist: self.artist.as_ref().and_then(value_text),
            album: self
                .album
                .as_ref()
                .and_then(value_text)
                .filter(|a| !a.is_empty()),
            time: self.date.as_ref().and_then(date_time),
            now_playing: self
                .attr
                .as_ref()
                .and_then(|a| a.get("nowplaying"))
                .is_some_and(|n| match n {
                    Value::Bool(b) => *b,
                    Value::String(s) => s.eq_ignore_ascii_case("true"),
                    _ => false,
                }),
        }
    }
}

/// Text of a plain string or of a `{"#text": ...}` object.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("#text").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Reads `date` as `{"uts", "#text"}`, a bare epoch, or a bare text date.
fn date_time(value: &Value) -> Option<RawEventTime> {
    match value {
        Value::Object(map) => match map.get("uts").and_then(value_as_i64) {
            Some(epoch) => Some(RawEventTime::Epoch(epoch)),
            None => map
                .get("#text")
                .and_then(Value::as_str)
                .map(|t| RawEventTime::Text(t.to_string())),
        },
        Value::Number(n) => n.as_i64().map(RawEventTime::Epoch),
        Value::String(s) => Some(RawEventTime::Text(s.clone())),
        _ => None,
    }
}
