//! Canonical listening events and per-day counts.
//!
//! A [`CanonicalEvent`] is a completed scrobble whose timestamp has been
//! parsed successfully. Providers produce them through normalization; the
//! calendar aggregation consumes them.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A completed listening event with a parsed timestamp.
///
/// Never represents a currently playing track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalEvent {
    /// When the track was scrobbled, in UTC.
    pub occurred_at: DateTime<Utc>,
}

impl CanonicalEvent {
    /// Creates a canonical event at the given instant.
    pub fn new(occurred_at: DateTime<Utc>) -> Self {
        Self { occurred_at }
    }

    /// Creates a canonical event from Unix epoch seconds.
    ///
    /// Returns `None` when the value is outside chrono's representable range.
    pub fn from_epoch_seconds(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(Self::new)
    }

    /// Returns the calendar date of this event as seen from `offset`.
    pub fn date_in(&self, offset: FixedOffset) -> NaiveDate {
        self.occurred_at.with_timezone(&offset).date_naive()
    }
}

/// Number of events on a single calendar date.
///
/// Only dates with at least one event get an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// The calendar date.
    pub date: NaiveDate,
    /// Number of events on that date (always at least 1).
    pub count: u32,
}

/// Groups events by calendar date under `offset`, sorted by date.
pub fn daily_counts(events: &[CanonicalEvent], offset: FixedOffset) -> Vec<DailyCount> {
    let mut by_date: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for event in events {
        *by_date.entry(event.date_in(offset)).or_default() += 1;
    }

    by_date
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}
