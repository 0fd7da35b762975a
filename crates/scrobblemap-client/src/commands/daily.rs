//! Daily counts command.

use chrono::FixedOffset;
use scrobblemap_core::{CanonicalEvent, daily_counts, format_daily};

use super::NO_SCROBBLES_MESSAGE;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::pipeline;

/// Fetches `user`'s history and prints one `date count` line per day.
pub async fn run(config: &ClientConfig, user: &str) -> ClientResult<()> {
    let offset = config.display.offset()?;
    let fetched = pipeline::run_fetch(config, user).await?;
    println!("{}", render(offset, &fetched.events));
    Ok(())
}

/// Renders per-day counts, with day boundaries at `offset`.
pub fn render(offset: FixedOffset, events: &[CanonicalEvent]) -> String {
    let counts = daily_counts(events, offset);
    if counts.is_empty() {
        return NO_SCROBBLES_MESSAGE.to_string();
    }
    format_daily(&counts)
}
