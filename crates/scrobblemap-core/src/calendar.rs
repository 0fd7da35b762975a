//! Calendar matrix aggregation.
//!
//! This module turns a sparse set of [`CanonicalEvent`]s into a dense
//! day-of-month × month grid ([`CalendarMatrix`]) suitable for heatmap
//! rendering.
//!
//! Every month between the first and the last event is present, even when
//! it has no events. Each month column has 31 cells; cells whose day does
//! not exist in that month are [`CalendarCell::Invalid`], all others are
//! [`CalendarCell::Count`].
//!
//! ```text
//!          2024-02  2024-03
//! day  1      0        1
//! ...
//! day 29      1        0
//! day 30      ·        0
//! day 31      ·        0
//! ```

use std::fmt;

use chrono::{Datelike, FixedOffset, Months, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::{CanonicalEvent, DailyCount, daily_counts};

/// Number of day rows in every month column.
pub const DAYS_PER_COLUMN: usize = 31;

/// Returns true if `year` has a February 29th.
pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Returns the number of days in the given month, or 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    // December of chrono's last representable year has no successor
    match first.checked_add_months(Months::new(1)) {
        Some(next) => next.signed_duration_since(first).num_days() as u32,
        None => 31,
    }
}

/// A calendar month of a specific year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a year-month, returning `None` if `month` is not in 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Returns the month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month, 1-based.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Number of days in this month (28-31).
    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// The following month.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Number of months from `self` to `later` (0 when equal).
    fn months_until(&self, later: YearMonth) -> usize {
        let diff = (i64::from(later.year) - i64::from(self.year)) * 12
            + (i64::from(later.month) - i64::from(self.month));
        usize::try_from(diff).unwrap_or(0)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One (day-of-month, month) intersection of the matrix.
///
/// Serialized as a number for `Count` and `null` for `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum CalendarCell {
    /// The day exists in this month; `n` events happened on it.
    Count(u32),
    /// The day does not exist in this month (e.g. day 31 in April).
    Invalid,
}

impl CalendarCell {
    /// Returns true if the day exists in its month.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    /// Returns the count, or `None` for invalid cells.
    pub fn count(&self) -> Option<u32> {
        match self {
            Self::Count(n) => Some(*n),
            Self::Invalid => None,
        }
    }
}

impl From<Option<u32>> for CalendarCell {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Self::Invalid, Self::Count)
    }
}

impl From<CalendarCell> for Option<u32> {
    fn from(cell: CalendarCell) -> Self {
        cell.count()
    }
}

/// The 31 cells of a single month.
///
/// Only built through [`MonthColumn::new`], so invalid cells always match
/// the month's length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthColumn {
    month: YearMonth,
    cells: [CalendarCell; DAYS_PER_COLUMN],
}

impl MonthColumn {
    /// Creates a column with `Count(0)` for existing days and `Invalid` for the rest.
    pub fn new(month: YearMonth) -> Self {
        let days = month.days() as usize;
        let cells = std::array::from_fn(|index| {
            if index < days {
                CalendarCell::Count(0)
            } else {
                CalendarCell::Invalid
            }
        });
        Self { month, cells }
    }

    /// The month this column represents.
    pub fn month(&self) -> YearMonth {
        self.month
    }

    /// Returns the cell for `day` (1-based), or `None` if `day` is outside 1..=31.
    pub fn cell(&self, day: u32) -> Option<CalendarCell> {
        let index = (day as usize).checked_sub(1)?;
        self.cells.get(index).copied()
    }

    /// All 31 cells, day 1 first.
    pub fn cells(&self) -> &[CalendarCell] {
        &self.cells
    }

    /// Adds `count` to the cell for `day`. Invalid cells are left untouched.
    fn add(&mut self, day: u32, count: u32) -> bool {
        let Some(index) = (day as usize).checked_sub(1) else {
            return false;
        };
        match self.cells.get_mut(index) {
            Some(CalendarCell::Count(n)) => {
                *n = n.saturating_add(count);
                true
            }
            _ => false,
        }
    }
}

/// Dense day × month grid of event counts.
///
/// Columns are chronological and contiguous. An empty matrix has zero
/// months and zero cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CalendarMatrix {
    columns: Vec<MonthColumn>,
}

impl CalendarMatrix {
    /// Creates a matrix with no months.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if the matrix has no months.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of month columns.
    pub fn month_count(&self) -> usize {
        self.columns.len()
    }

    /// Total number of cells, valid and invalid.
    pub fn cell_count(&self) -> usize {
        self.columns.len() * DAYS_PER_COLUMN
    }

    /// The month columns in chronological order.
    pub fn columns(&self) -> &[MonthColumn] {
        &self.columns
    }

    /// Iterates over the months in chronological order.
    pub fn months(&self) -> impl Iterator<Item = YearMonth> + '_ {
        self.columns.iter().map(|c| c.month)
    }

    /// Returns the cell at (`day`, `month`), or `None` if the month is not
    /// covered by the matrix or `day` is outside 1..=31.
    pub fn cell(&self, day: u32, month: YearMonth) -> Option<CalendarCell> {
        let first = self.columns.first()?.month;
        if month < first {
            return None;
        }
        self.columns.get(first.months_until(month))?.cell(day)
    }

    /// Day-major view: 31 rows (day 1 first), one cell per month.
    ///
    /// Returns no rows for an empty matrix.
    pub fn rows(&self) -> Vec<Vec<CalendarCell>> {
        if self.columns.is_empty() {
            return Vec::new();
        }
        (0..DAYS_PER_COLUMN)
            .map(|index| self.columns.iter().map(|c| c.cells[index]).collect())
            .collect()
    }

    /// Largest count in any cell (0 for an empty matrix).
    pub fn max_count(&self) -> u32 {
        self.counts().max().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total_count(&self) -> u64 {
        self.counts().map(u64::from).sum()
    }

    fn counts(&self) -> impl Iterator<Item = u32> + '_ {
        self.columns
            .iter()
            .flat_map(|c| c.cells.iter().filter_map(CalendarCell::count))
    }
}

/// Buckets canonical events into a [`CalendarMatrix`].
///
/// Dates are taken in a fixed UTC offset (UTC by default).
#[derive(Debug, Clone, Copy)]
pub struct CalendarAggregator {
    offset: FixedOffset,
}

impl Default for CalendarAggregator {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }
}

impl CalendarAggregator {
    /// Creates an aggregator bucketing by UTC dates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the UTC offset used to derive calendar dates.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// The UTC offset used to derive calendar dates.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Aggregates events into a matrix.
    ///
    /// Empty input yields an empty matrix. Input order does not matter.
    pub fn aggregate(&self, events: &[CanonicalEvent]) -> CalendarMatrix {
        self.aggregate_daily(&daily_counts(events, self.offset))
    }

    /// Builds a matrix from per-date counts.
    pub fn aggregate_daily(&self, counts: &[DailyCount]) -> CalendarMatrix {
        let (Some(first), Some(last)) = (
            counts.iter().map(|c| c.date).min(),
            counts.iter().map(|c| c.date).max(),
        ) else {
            return CalendarMatrix::empty();
        };

        let first = YearMonth::of(first);
        let last = YearMonth::of(last);

        let mut columns = Vec::with_capacity(first.months_until(last) + 1);
        let mut month = first;
        loop {
            columns.push(MonthColumn::new(month));
            if month == last {
                break;
            }
            month = month.succ();
        }

        for entry in counts {
            let index = first.months_until(YearMonth::of(entry.date));
            if let Some(column) = columns.get_mut(index) {
                column.add(entry.date.day(), entry.count);
            }
        }

        debug!(
            first = %first,
            last = %last,
            months = columns.len(),
            days = counts.len(),
            "aggregated calendar matrix"
        );

        CalendarMatrix { columns }
    }
}

/// Aggregates events into a matrix using UTC dates.
pub fn aggregate(events: &[CanonicalEvent]) -> CalendarMatrix {
    CalendarAggregator::new().aggregate(events)
}
