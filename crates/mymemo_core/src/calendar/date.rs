//! Calendar month and day values.
//!
//! # Invariants
//! - A [`CalendarMonth`] year lies in [`MIN_YEAR`]`..=`[`MAX_YEAR`], the range
//!   a four-digit date key can spell.
//! - Every constructed month has a representable six-week grid around it.

use super::{CalendarError, CalendarResult};
use chrono::{Datelike, Days, Local, Months, NaiveDate};
use std::fmt::{Display, Formatter};

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// One month of one year. `month` accessors are 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarMonth {
    first: NaiveDate,
    days_in_month: u32,
    grid_start: NaiveDate,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> CalendarResult<Self> {
        if month > 11 {
            return Err(CalendarError::InvalidMonth(month));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalendarError::InvalidYear(year));
        }
        let first = NaiveDate::from_ymd_opt(year, month + 1, 1)
            .ok_or(CalendarError::InvalidYear(year))?;
        Self::starting_on(first)
    }

    fn starting_on(first: NaiveDate) -> CalendarResult<Self> {
        let out_of_range = || CalendarError::InvalidYear(first.year());
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next_first| next_first.pred_opt())
            .ok_or_else(out_of_range)?;
        let leading = first.weekday().num_days_from_sunday();
        let grid_start = first
            .checked_sub_days(Days::new(u64::from(leading)))
            .ok_or_else(out_of_range)?;
        Ok(Self {
            first,
            days_in_month: last.day(),
            grid_start,
        })
    }

    /// Month containing today's local date.
    pub fn current() -> CalendarResult<Self> {
        Self::containing(CalendarDate::from(Local::now().date_naive()))
    }

    pub fn containing(date: CalendarDate) -> CalendarResult<Self> {
        match date.month.checked_sub(1) {
            Some(month) => Self::new(date.year, month),
            None => Err(CalendarError::InvalidDateKey(date.key())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// 0-indexed month.
    pub fn month(&self) -> u32 {
        self.first.month0()
    }

    pub fn days_in_month(&self) -> u32 {
        self.days_in_month
    }

    /// Weekday index of day 1, `0` = Sunday.
    pub fn first_weekday(&self) -> u8 {
        self.first.weekday().num_days_from_sunday() as u8
    }

    /// Sunday on or before day 1; the first cell of the month grid.
    pub(crate) fn grid_start(&self) -> NaiveDate {
        self.grid_start
    }

    /// The month before, or `None` before January of [`MIN_YEAR`].
    pub fn previous(&self) -> Option<Self> {
        let first = self.first.checked_sub_months(Months::new(1))?;
        Self::new(first.year(), first.month0()).ok()
    }

    /// The month after, or `None` past December of [`MAX_YEAR`].
    pub fn next(&self) -> Option<Self> {
        let first = self.first.checked_add_months(Months::new(1))?;
        Self::new(first.year(), first.month0()).ok()
    }

    /// Date of `day` within this month. `day` is not range-checked.
    pub fn day(&self, day: u32) -> CalendarDate {
        CalendarDate {
            year: self.year(),
            month: self.month() + 1,
            day,
        }
    }
}

/// A calendar day. Unlike [`CalendarMonth`], `month` here is 1-based so the
/// value reads the same as its date key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    /// Parses a `YYYY-MM-DD` date key.
    pub fn parse_key(key: &str) -> CalendarResult<Self> {
        NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d")
            .map(Self::from)
            .map_err(|_| CalendarError::InvalidDateKey(key.to_string()))
    }

    /// `YYYY-MM-DD` key used to bucket memos.
    pub fn key(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(value: NaiveDate) -> Self {
        Self {
            year: value.year(),
            month: value.month(),
            day: value.day(),
        }
    }
}

impl Display for CalendarDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::{CalendarDate, CalendarMonth, MAX_YEAR, MIN_YEAR};
    use crate::calendar::CalendarError;

    #[test]
    fn month_lengths_follow_gregorian_leap_rules() {
        let days = |year, month| CalendarMonth::new(year, month).unwrap().days_in_month();
        assert_eq!(days(2024, 1), 29);
        assert_eq!(days(2023, 1), 28);
        assert_eq!(days(1900, 1), 28);
        assert_eq!(days(2000, 1), 29);
        assert_eq!(days(2024, 3), 30);
        assert_eq!(days(2024, 11), 31);
    }

    #[test]
    fn first_weekday_counts_from_sunday() {
        // 2024-02-01 is a Thursday, 2023-01-01 a Sunday, 2022-03-01 a Tuesday.
        assert_eq!(CalendarMonth::new(2024, 1).unwrap().first_weekday(), 4);
        assert_eq!(CalendarMonth::new(2023, 0).unwrap().first_weekday(), 0);
        assert_eq!(CalendarMonth::new(2022, 2).unwrap().first_weekday(), 2);
    }

    #[test]
    fn month_navigation_rolls_over_years() {
        let january = CalendarMonth::new(2024, 0).unwrap();
        assert_eq!(january.previous(), CalendarMonth::new(2023, 11).ok());
        let december = CalendarMonth::new(2024, 11).unwrap();
        assert_eq!(december.next(), CalendarMonth::new(2025, 0).ok());
        assert_eq!(january.next().and_then(|m| m.previous()), Some(january));
    }

    #[test]
    fn navigation_stops_at_supported_year_bounds() {
        let first = CalendarMonth::new(MIN_YEAR, 0).unwrap();
        assert_eq!(first.previous(), None);
        assert!(first.next().is_some());

        let last = CalendarMonth::new(MAX_YEAR, 11).unwrap();
        assert_eq!(last.next(), None);
        assert!(last.previous().is_some());
    }

    #[test]
    fn month_and_year_are_validated() {
        assert_eq!(CalendarMonth::new(2024, 12), Err(CalendarError::InvalidMonth(12)));
        assert_eq!(
            CalendarMonth::new(i32::MAX, 11),
            Err(CalendarError::InvalidYear(i32::MAX))
        );
        assert_eq!(
            CalendarMonth::new(i32::MIN, 0),
            Err(CalendarError::InvalidYear(i32::MIN))
        );
        assert_eq!(
            CalendarMonth::new(MAX_YEAR + 1, 0),
            Err(CalendarError::InvalidYear(MAX_YEAR + 1))
        );
    }

    #[test]
    fn containing_rejects_month_zero() {
        let date = CalendarDate {
            year: 2024,
            month: 0,
            day: 1,
        };
        assert!(CalendarMonth::containing(date).is_err());
        let date = CalendarDate {
            year: 2024,
            month: 3,
            day: 9,
        };
        assert_eq!(CalendarMonth::containing(date), CalendarMonth::new(2024, 2));
    }

    #[test]
    fn date_key_parse_and_format() {
        let date = CalendarDate::parse_key("2024-03-05").unwrap();
        assert_eq!(date, CalendarMonth::new(2024, 2).unwrap().day(5));
        assert_eq!(date.key(), "2024-03-05");
        assert!(CalendarDate::parse_key("2024-02-30").is_err());
        assert!(CalendarDate::parse_key("yesterday").is_err());
    }
}
