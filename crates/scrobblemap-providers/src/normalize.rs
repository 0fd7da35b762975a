//! RawEvent to CanonicalEvent conversion.
//!
//! Normalization drops entries that must not count toward any day:
//! currently playing tracks, and entries whose timestamp is missing or
//! does not parse. Dropping is silent apart from a trace log, since real
//! feeds routinely contain partial records.

use chrono::{NaiveDateTime, TimeZone, Utc};
use scrobblemap_core::CanonicalEvent;
use tracing::{debug, trace};

use crate::raw_event::{RawEvent, RawEventTime};

/// Textual date-time format used by the Last.fm API (`"29 Feb 2024, 10:15"`, UTC).
pub const TEXT_TIME_FORMAT: &str = "%d %b %Y, %H:%M";

/// Converts a [`RawEvent`] to a [`CanonicalEvent`].
///
/// Returns `None` for currently playing entries and for entries without a
/// usable timestamp.
pub fn normalize_event(raw: &RawEvent) -> Option<CanonicalEvent> {
    if raw.now_playing {
        trace!(track = raw.effective_track(), "skipping currently playing track");
        return None;
    }

    let Some(time) = raw.time.as_ref() else {
        trace!(track = raw.effective_track(), "skipping event without timestamp");
        return None;
    };

    let event = convert_time(time);
    if event.is_none() {
        trace!(track = raw.effective_track(), ?time, "skipping unparsable timestamp");
    }
    event
}

/// Converts a [`RawEventTime`] to a canonical event.
fn convert_time(raw: &RawEventTime) -> Option<CanonicalEvent> {
    match raw {
        RawEventTime::Epoch(seconds) => CanonicalEvent::from_epoch_seconds(*seconds),
        RawEventTime::Text(text) => NaiveDateTime::parse_from_str(text.trim(), TEXT_TIME_FORMAT)
            .ok()
            .map(|naive| CanonicalEvent::new(Utc.from_utc_datetime(&naive))),
    }
}

/// Batch normalize raw events.
///
/// Input order is preserved for the events that survive.
pub fn normalize_events(raw_events: &[RawEvent]) -> Vec<CanonicalEvent> {
    let events: Vec<CanonicalEvent> = raw_events.iter().filter_map(normalize_event).collect();

    debug!(
        raw = raw_events.len(),
        canonical = events.len(),
        dropped = raw_events.len() - events.len(),
        "normalized events"
    );

    events
}
