//! Fixed six-week month grid with per-day memo counts.
//!
//! # Invariants
//! - Every grid has exactly [`GRID_CELLS`] cells.
//! - Cells run: trailing days of the previous month, every day of the
//!   requested month, then leading days of the next month.
//! - A cell's weekday is its column: `index % 7`. For current-month days this
//!   is `(first_weekday + day - 1) % 7`.

use super::buckets::{memo_counts_by_date_in, memos_on_date_in};
use super::date::{CalendarDate, CalendarMonth};
use super::highlight::DayHighlightSet;
use crate::model::memo::MemoRecord;
use chrono::{Datelike, FixedOffset, Local};
use std::cmp::Ordering;
use std::collections::HashMap;

pub const WEEKS_PER_GRID: usize = 6;
pub const DAYS_PER_WEEK: usize = 7;
pub const GRID_CELLS: usize = WEEKS_PER_GRID * DAYS_PER_WEEK;

/// Which month a grid cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellMonth {
    Previous,
    Current,
    Next,
}

/// One position in the month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub date: CalendarDate,
    pub month: CellMonth,
    /// `0` = Sunday.
    pub weekday: u8,
    pub memo_count: usize,
    pub highlighted: bool,
}

impl GridCell {
    /// Day-of-month number shown in the cell.
    pub fn day(&self) -> u32 {
        self.date.day
    }
}

/// Laid-out month ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: CalendarMonth,
    pub days_in_month: u32,
    pub first_weekday: u8,
    pub cells: Vec<GridCell>,
}

impl MonthGrid {
    /// Cells grouped into weeks.
    pub fn weeks(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(DAYS_PER_WEEK)
    }
}

/// Builds month grids against one memo snapshot.
///
/// Per-day counts are computed once at construction; build a new builder
/// whenever the snapshot changes.
#[derive(Debug, Clone, Default)]
pub struct CalendarGridBuilder {
    snapshot: Vec<MemoRecord>,
    counts: HashMap<String, usize>,
    offset: Option<FixedOffset>,
}

impl CalendarGridBuilder {
    /// Buckets the snapshot by local date.
    pub fn new(snapshot: Vec<MemoRecord>) -> Self {
        let counts = memo_counts_by_date_in(&snapshot, &Local);
        Self {
            snapshot,
            counts,
            offset: None,
        }
    }

    /// Buckets the snapshot using a fixed UTC offset instead of local time.
    pub fn with_fixed_offset(snapshot: Vec<MemoRecord>, offset: FixedOffset) -> Self {
        let counts = memo_counts_by_date_in(&snapshot, &offset);
        Self {
            snapshot,
            counts,
            offset: Some(offset),
        }
    }

    /// Date key to memo count for the whole snapshot.
    pub fn memo_counts_by_date(&self) -> &HashMap<String, usize> {
        &self.counts
    }

    pub fn count_on(&self, date: CalendarDate) -> usize {
        self.counts.get(&date.key()).copied().unwrap_or(0)
    }

    /// Memos on `date` in snapshot order.
    pub fn memos_on_date(&self, date: CalendarDate) -> Vec<MemoRecord> {
        match self.offset {
            Some(offset) => memos_on_date_in(&self.snapshot, date, &offset),
            None => memos_on_date_in(&self.snapshot, date, &Local),
        }
    }

    /// Lays out `month` as 42 cells with counts and highlight flags.
    pub fn build(&self, month: CalendarMonth, highlights: &DayHighlightSet) -> MonthGrid {
        let shown = (month.year(), month.month());
        let cells = month
            .grid_start()
            .iter_days()
            .take(GRID_CELLS)
            .enumerate()
            .map(|(index, day)| {
                let date = CalendarDate::from(day);
                let weekday = (index % DAYS_PER_WEEK) as u8;
                GridCell {
                    date,
                    month: match (day.year(), day.month0()).cmp(&shown) {
                        Ordering::Less => CellMonth::Previous,
                        Ordering::Equal => CellMonth::Current,
                        Ordering::Greater => CellMonth::Next,
                    },
                    weekday,
                    memo_count: self.count_on(date),
                    highlighted: highlights.contains(weekday),
                }
            })
            .collect();

        MonthGrid {
            month,
            days_in_month: month.days_in_month(),
            first_weekday: month.first_weekday(),
            cells,
        }
    }
}

/// Convenience for one-off layouts without memo data.
pub fn month_layout(month: CalendarMonth) -> MonthGrid {
    CalendarGridBuilder::default().build(month, &DayHighlightSet::empty())
}
