//! Heatmap command.

use scrobblemap_core::{
    CalendarAggregator, CanonicalEvent, HeatmapView, OutputFormat, Palette, format_table,
};
use chrono::FixedOffset;
use tracing::{debug, warn};

use super::NO_SCROBBLES_MESSAGE;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::pipeline;

/// Options for rendering a heatmap.
#[derive(Debug, Clone)]
pub struct HeatmapOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Palette override; falls back to the configured palette.
    pub palette: Option<String>,
    /// Title override; falls back to the configured title.
    pub title: Option<String>,
}

/// Display settings resolved before any page is fetched.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Output format.
    pub format: OutputFormat,
    /// Color palette.
    pub palette: Palette,
    /// Offset used for day boundaries.
    pub offset: FixedOffset,
    /// Chart title, if any.
    pub title: Option<String>,
}

impl HeatmapOptions {
    /// Resolves the options against the `[display]` settings.
    ///
    /// Unknown palette names fall back to the default palette. An invalid
    /// UTC offset is a configuration error.
    pub fn resolve(&self, config: &ClientConfig) -> ClientResult<RenderSettings> {
        let name = self
            .palette
            .as_deref()
            .unwrap_or(config.display.palette.as_str());
        Ok(RenderSettings {
            format: self.format,
            palette: resolve_palette(name),
            offset: config.display.offset()?,
            title: self.title.clone().or_else(|| config.display.title.clone()),
        })
    }
}

/// Fetches `user`'s history and prints the heatmap.
pub async fn run(config: &ClientConfig, user: &str, options: &HeatmapOptions) -> ClientResult<()> {
    let settings = options.resolve(config)?;
    let fetched = pipeline::run_fetch(config, user).await?;
    println!("{}", render(&settings, &fetched.events)?);
    Ok(())
}

/// Renders events as a table or a JSON heatmap view.
pub fn render(settings: &RenderSettings, events: &[CanonicalEvent]) -> ClientResult<String> {
    if events.is_empty() {
        return Ok(NO_SCROBBLES_MESSAGE.to_string());
    }

    let matrix = CalendarAggregator::new()
        .with_offset(settings.offset)
        .aggregate(events);
    debug!(months = matrix.month_count(), palette = %settings.palette, "rendering heatmap");

    match settings.format {
        OutputFormat::Table => Ok(format_table(&matrix)),
        OutputFormat::Json => {
            let mut view = HeatmapView::new(&matrix, settings.palette);
            if let Some(title) = settings.title.as_ref() {
                view = view.with_title(title);
            }
            Ok(serde_json::to_string_pretty(&view)?)
        }
    }
}

/// Palette names are forgiving: unknown names fall back to the default palette.
fn resolve_palette(name: &str) -> Palette {
    let palette = Palette::parse_lenient(name);
    if !palette.as_str().eq_ignore_ascii_case(name.trim()) {
        warn!(name, fallback = %palette, "unknown palette");
    }
    palette
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn events() -> Vec<CanonicalEvent> {
        vec![
            CanonicalEvent::new(Utc.with_ymd_and_hms(2024, 2, 29, 10, 0, 0).unwrap()),
            CanonicalEvent::new(Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap()),
        ]
    }

    fn options(format: OutputFormat) -> HeatmapOptions {
        HeatmapOptions {
            format,
            palette: None,
            title: None,
        }
    }

    fn settings(config: &ClientConfig, options: &HeatmapOptions) -> RenderSettings {
        options.resolve(config).unwrap()
    }

    #[test]
    fn empty_events_print_message() {
        let settings = settings(&ClientConfig::default(), &options(OutputFormat::Json));
        assert_eq!(render(&settings, &[]).unwrap(), NO_SCROBBLES_MESSAGE);
    }

    #[test]
    fn table_output() {
        let settings = settings(&ClientConfig::default(), &options(OutputFormat::Table));
        let out = render(&settings, &events()).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "day 2024-02 2024-03");
        assert_eq!(lines[1], "  1       0       1");
        assert_eq!(lines[29], " 29       1       0");
        assert_eq!(lines[30], " 30       .       0");
    }

    #[test]
    fn json_output_uses_overrides() {
        let mut config = ClientConfig::default();
        config.display.title = Some("from config".to_string());
        let opts = HeatmapOptions {
            format: OutputFormat::Json,
            palette: Some("inferno".to_string()),
            title: Some("alice".to_string()),
        };
        let out = render(&settings(&config, &opts), &events()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(json["title"], "alice");
        assert_eq!(json["palette"], "Inferno");
        assert_eq!(json["x"], serde_json::json!(["2024-02", "2024-03"]));
        assert_eq!(json["z"][30][0], serde_json::Value::Null);
        assert_eq!(json["zmax"], 1);
    }

    #[test]
    fn configured_palette_and_title() {
        let mut config = ClientConfig::default();
        config.display.palette = "magma".to_string();
        config.display.title = Some("bob".to_string());

        let settings = settings(&config, &options(OutputFormat::Json));
        assert_eq!(settings.palette, Palette::Magma);
        assert_eq!(settings.title.as_deref(), Some("bob"));
    }

    #[test]
    fn unknown_palette_flag_falls_back() {
        let opts = HeatmapOptions {
            format: OutputFormat::Json,
            palette: Some("rainbow".to_string()),
            title: None,
        };
        let out = render(&settings(&ClientConfig::default(), &opts), &events()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["palette"], "Viridis");
    }

    #[test]
    fn unknown_configured_palette_falls_back() {
        let mut config = ClientConfig::default();
        config.display.palette = "rainbow".to_string();

        let settings = options(OutputFormat::Json).resolve(&config).unwrap();
        assert_eq!(settings.palette, Palette::Viridis);
    }

    #[tokio::test]
    async fn invalid_offset_fails_before_fetching() {
        let mut config = ClientConfig::default();
        config.lastfm.api_key = Some("key".to_string());
        // Nothing listens here; reaching the network would be a provider error
        config.lastfm.base_url = Some("http://127.0.0.1:9/".to_string());
        config.display.utc_offset = "later".to_string();

        let err = run(&config, "alice", &options(OutputFormat::Table))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::ClientError::Config(_)));
        assert!(err.to_string().contains("UTC offset"));
    }

    #[test]
    fn offset_moves_late_events_to_next_day() {
        let mut config = ClientConfig::default();
        config.display.utc_offset = "+02:00".to_string();

        let settings = settings(&config, &options(OutputFormat::Table));
        let out = render(&settings, &events()).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        // 2024-03-01 23:30 UTC is 2024-03-02 01:30 at +02:00
        assert_eq!(lines[1], "  1       0       0");
        assert_eq!(lines[2], "  2       0       1");
    }
}
