//! Output formatting for calendar matrices.
//!
//! This module provides the terminal renderings used by the CLI:
//! - **Table**: days as rows, months as columns, `.` for days that do not exist
//! - **Daily**: one `YYYY-MM-DD count` line per date
//!
//! JSON output is produced by serializing a [`HeatmapView`](crate::HeatmapView).

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarCell, CalendarMatrix};
use crate::event::DailyCount;

/// Placeholder printed for cells whose day does not exist in the month.
pub const INVALID_CELL: &str = ".";

const DAY_WIDTH: usize = 3;
const COLUMN_WIDTH: usize = 7;

/// The output format for CLI rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// Heatmap view as JSON.
    Json,
}

/// Renders the matrix as a fixed-width table.
///
/// Returns an empty string for an empty matrix.
pub fn format_table(matrix: &CalendarMatrix) -> String {
    if matrix.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let _ = write!(out, "{:>DAY_WIDTH$}", "day");
    for month in matrix.months() {
        let _ = write!(out, " {:>COLUMN_WIDTH$}", month.to_string());
    }

    for (index, row) in matrix.rows().iter().enumerate() {
        out.push('\n');
        let _ = write!(out, "{:>DAY_WIDTH$}", index + 1);
        for cell in row {
            let _ = write!(out, " {:>COLUMN_WIDTH$}", cell_text(*cell));
        }
    }

    out
}

/// Renders daily counts, one `date count` line each.
pub fn format_daily(counts: &[DailyCount]) -> String {
    counts
        .iter()
        .map(|c| format!("{} {}", c.date.format("%Y-%m-%d"), c.count))
        .collect::<Vec<_>>()
        .join("\n")
}

fn cell_text(cell: CalendarCell) -> String {
    match cell {
        CalendarCell::Count(n) => n.to_string(),
        CalendarCell::Invalid => INVALID_CELL.to_string(),
    }
}
