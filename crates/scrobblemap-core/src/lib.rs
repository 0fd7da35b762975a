//! Core types: canonical events, calendar matrix aggregation, heatmap view, formatting

pub mod calendar;
pub mod event;
pub mod format;
pub mod heatmap;
pub mod palette;
pub mod tracing;

pub use calendar::{
    CalendarAggregator, CalendarCell, CalendarMatrix, DAYS_PER_COLUMN, MonthColumn, YearMonth,
    aggregate, days_in_month, is_leap_year,
};
pub use event::{CanonicalEvent, DailyCount, daily_counts};
pub use format::{OutputFormat, format_daily, format_table};
pub use heatmap::HeatmapView;
pub use palette::{Palette, UnknownPalette};
pub use self::tracing::{LogMode, TracingError, init_tracing};
