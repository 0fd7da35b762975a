//! Raw event types as returned by scrobble providers.
//!
//! These are intermediate types that capture provider data before
//! normalization into [`CanonicalEvent`](scrobblemap_core::CanonicalEvent).
//! A raw event may carry no timestamp at all, or one that does not parse,
//! and may describe a track that is still playing.

use serde::{Deserialize, Serialize};

/// The timestamp attached to a raw event.
///
/// Providers report either an epoch value or a formatted string, sometimes
/// both. The epoch form is preferred when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawEventTime {
    /// Seconds since the Unix epoch.
    Epoch(i64),
    /// A formatted date-time, e.g. `"29 Feb 2024, 10:15"`.
    Text(String),
}

impl RawEventTime {
    /// Creates an epoch timestamp.
    pub fn epoch(seconds: i64) -> Self {
        Self::Epoch(seconds)
    }

    /// Creates a textual timestamp.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// A listening event as received from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawEvent {
    /// Track title.
    pub track: Option<String>,

    /// Artist name.
    pub artist: Option<String>,

    /// Album title.
    pub album: Option<String>,

    /// When the track was played; absent for the currently playing track.
    pub time: Option<RawEventTime>,

    /// True when the provider marks this entry as currently playing.
    #[serde(default)]
    pub now_playing: bool,
}

impl RawEvent {
    /// Creates a raw event played at the given time.
    pub fn played_at(time: RawEventTime) -> Self {
        Self {
            time: Some(time),
            ..Self::default()
        }
    }

    /// Creates a currently playing entry without a timestamp.
    pub fn now_playing() -> Self {
        Self {
            now_playing: true,
            ..Self::default()
        }
    }

    /// Builder method to set the track title.
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = Some(track.into());
        self
    }

    /// Builder method to set the artist.
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Builder method to set the album.
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Builder method to set the timestamp.
    pub fn with_time(mut self, time: RawEventTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Builder method to set the currently-playing marker.
    pub fn with_now_playing(mut self, now_playing: bool) -> Self {
        self.now_playing = now_playing;
        self
    }

    /// Returns the track title, falling back to "(Unknown track)" if empty.
    pub fn effective_track(&self) -> &str {
        self.track
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("(Unknown track)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn played_at_sets_time() {
        let event = RawEvent::played_at(RawEventTime::epoch(1_709_200_800));
        assert_eq!(event.time, Some(RawEventTime::Epoch(1_709_200_800)));
        assert!(!event.now_playing);
        assert_eq!(event.effective_track(), "(Unknown track)");
    }

    #[test]
    fn now_playing_has_no_time() {
        let event = RawEvent::now_playing().with_track("Intro");
        assert!(event.now_playing);
        assert!(event.time.is_none());
        assert_eq!(event.effective_track(), "Intro");
    }

    #[test]
    fn builder() {
        let event = RawEvent::default()
            .with_track("Teardrop")
            .with_artist("Massive Attack")
            .with_album("Mezzanine")
            .with_time(RawEventTime::text("29 Feb 2024, 10:15"))
            .with_now_playing(false);

        assert_eq!(event.artist.as_deref(), Some("Massive Attack"));
        assert_eq!(event.album.as_deref(), Some("Mezzanine"));
        assert_eq!(
            event.time,
            Some(RawEventTime::Text("29 Feb 2024, 10:15".to_string()))
        );
    }

    #[test]
    fn blank_track_falls_back() {
        let event = RawEvent::default().with_track("   ");
        assert_eq!(event.effective_track(), "(Unknown track)");
    }
}
