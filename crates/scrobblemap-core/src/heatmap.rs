//! Render-ready heatmap view.
//!
//! [`HeatmapView`] is what the rendering collaborator receives: month labels
//! on the x axis, days 1-31 on the y axis, a z grid of optional counts
//! (`None` for days that do not exist) and hover labels for every cell.

use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarCell, CalendarMatrix, DAYS_PER_COLUMN};
use crate::palette::Palette;

/// Default chart title.
pub const DEFAULT_TITLE: &str = "Heatmap of Songs Listened to Per Day";

/// Hover label used for cells whose day does not exist in the month.
pub const MISSING_DAY_LABEL: &str = "Day does not exist";

/// A calendar matrix laid out for a heatmap renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapView {
    /// Chart title.
    pub title: String,
    /// Color scale selector.
    pub palette: Palette,
    /// Month labels (`YYYY-MM`), one per column.
    pub x: Vec<String>,
    /// Day-of-month labels, one per row.
    pub y: Vec<u32>,
    /// Counts, row-major by day; `None` marks days that do not exist.
    pub z: Vec<Vec<Option<u32>>>,
    /// Hover label for every cell, same shape as `z`.
    pub hover: Vec<Vec<String>>,
    /// Lower color-scale bound.
    pub zmin: u32,
    /// Upper color-scale bound.
    pub zmax: u32,
}

impl HeatmapView {
    /// Lays out `matrix` for rendering with the given palette.
    ///
    /// An empty matrix produces empty axes and grids.
    pub fn new(matrix: &CalendarMatrix, palette: Palette) -> Self {
        let x: Vec<String> = matrix.months().map(|m| m.to_string()).collect();
        let y: Vec<u32> = if matrix.is_empty() {
            Vec::new()
        } else {
            (1..=DAYS_PER_COLUMN as u32).collect()
        };

        let rows = matrix.rows();
        let z = rows
            .iter()
            .map(|row| row.iter().map(CalendarCell::count).collect())
            .collect();

        let hover = rows
            .iter()
            .zip(&y)
            .map(|(row, day)| {
                row.iter()
                    .zip(&x)
                    .map(|(cell, month)| hover_label(*cell, month, *day))
                    .collect()
            })
            .collect();

        Self {
            title: DEFAULT_TITLE.to_string(),
            palette,
            x,
            y,
            z,
            hover,
            zmin: 0,
            zmax: matrix.max_count(),
        }
    }

    /// Sets the chart title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Returns true if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

fn hover_label(cell: CalendarCell, month: &str, day: u32) -> String {
    match cell {
        CalendarCell::Count(n) => format!("{month}-{day}: {n} songs"),
        CalendarCell::Invalid => MISSING_DAY_LABEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::aggregate;
    use crate::event::CanonicalEvent;
    use chrono::{TimeZone, Utc};

    fn leap_matrix() -> CalendarMatrix {
        aggregate(&[
            CanonicalEvent::new(Utc.with_ymd_and_hms(2024, 2, 29, 10, 0, 0).unwrap()),
            CanonicalEvent::new(Utc.with_ymd_and_hms(2024, 2, 29, 11, 0, 0).unwrap()),
            CanonicalEvent::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()),
        ])
    }

    #[test]
    fn lays_out_axes_and_grid() {
        let view = HeatmapView::new(&leap_matrix(), Palette::Magma);

        assert_eq!(view.x, vec!["2024-02", "2024-03"]);
        assert_eq!(view.y.len(), 31);
        assert_eq!(view.y[0], 1);
        assert_eq!(view.z.len(), 31);
        assert_eq!(view.z[28], vec![Some(2), Some(0)]);
        assert_eq!(view.z[29], vec![None, Some(0)]);
        assert_eq!(view.z[0], vec![Some(0), Some(1)]);
        assert_eq!(view.zmin, 0);
        assert_eq!(view.zmax, 2);
        assert_eq!(view.palette, Palette::Magma);
    }

    #[test]
    fn hover_labels() {
        let view = HeatmapView::new(&leap_matrix(), Palette::default());

        assert_eq!(view.hover[28][0], "2024-02-29: 2 songs");
        assert_eq!(view.hover[0][1], "2024-03-1: 1 songs");
        assert_eq!(view.hover[30][0], MISSING_DAY_LABEL);
    }

    #[test]
    fn empty_matrix_produces_empty_view() {
        let view = HeatmapView::new(&CalendarMatrix::empty(), Palette::default());

        assert!(view.is_empty());
        assert!(view.y.is_empty());
        assert!(view.z.is_empty());
        assert!(view.hover.is_empty());
        assert_eq!(view.zmax, 0);
    }

    #[test]
    fn serializes_invalid_cells_as_null() {
        let view = HeatmapView::new(&leap_matrix(), Palette::Turbo).with_title("test");
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["title"], "test");
        assert_eq!(json["palette"], "Turbo");
        assert_eq!(json["z"][30][0], serde_json::Value::Null);
        assert_eq!(json["z"][28][0], 2);
    }
}
