//! Calendar aggregation over memo snapshots.
//!
//! # Responsibility
//! - Month arithmetic and the fixed 42-cell month grid.
//! - Bucketing memos by local calendar day.
//! - Session-scoped weekday highlight preferences.
//!
//! # Invariants
//! - Months are 0-indexed at the API surface (`0` = January).
//! - Weekday indices run `0..=6` with `0` = Sunday.
//! - Date keys are derived in local time, never UTC, unless a caller passes
//!   an explicit time zone.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod buckets;
pub mod date;
pub mod grid;
pub mod highlight;

pub type CalendarResult<T> = Result<T, CalendarError>;

/// Invalid calendar input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// Month outside `0..=11`.
    InvalidMonth(u32),
    /// Year outside the supported calendar range.
    InvalidYear(i32),
    /// Weekday outside `0..=6`.
    InvalidWeekday(u8),
    /// Text is not a valid `YYYY-MM-DD` date.
    InvalidDateKey(String),
}

impl Display for CalendarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMonth(month) => {
                write!(f, "invalid month index {month}; expected 0..=11")
            }
            Self::InvalidYear(year) => write!(
                f,
                "unsupported year {year}; expected {}..={}",
                date::MIN_YEAR,
                date::MAX_YEAR
            ),
            Self::InvalidWeekday(index) => {
                write!(f, "invalid weekday index {index}; expected 0..=6")
            }
            Self::InvalidDateKey(key) => write!(f, "invalid date key `{key}`; expected YYYY-MM-DD"),
        }
    }
}

impl Error for CalendarError {}
