//! Memo-to-day bucketing.
//!
//! # Invariants
//! - A memo's day is the calendar date of its `timestamp` in the given time
//!   zone (local time for the plain functions).
//! - Timestamps outside the representable range have no day and are skipped.
//! - `memos_on_date*` never reorder; they return snapshot order.

use super::date::CalendarDate;
use crate::model::memo::MemoRecord;
use chrono::{Local, TimeZone};
use std::collections::HashMap;

/// Calendar date of an epoch-millisecond timestamp in local time.
pub fn memo_date(timestamp: i64) -> Option<CalendarDate> {
    memo_date_in(timestamp, &Local)
}

/// Calendar date of an epoch-millisecond timestamp in `tz`.
pub fn memo_date_in<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Option<CalendarDate> {
    tz.timestamp_millis_opt(timestamp)
        .single()
        .map(|datetime| CalendarDate::from(datetime.date_naive()))
}

/// `YYYY-MM-DD` key of a timestamp in local time.
pub fn date_key(timestamp: i64) -> Option<String> {
    memo_date(timestamp).map(|date| date.key())
}

/// Counts memos per local date key.
pub fn memo_counts_by_date(snapshot: &[MemoRecord]) -> HashMap<String, usize> {
    memo_counts_by_date_in(snapshot, &Local)
}

/// Counts memos per date key in `tz`.
pub fn memo_counts_by_date_in<Tz: TimeZone>(
    snapshot: &[MemoRecord],
    tz: &Tz,
) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for date in snapshot
        .iter()
        .filter_map(|memo| memo_date_in(memo.timestamp, tz))
    {
        *counts.entry(date.key()).or_insert(0) += 1;
    }
    counts
}

/// Memos whose local day is `date`, in snapshot order.
pub fn memos_on_date(snapshot: &[MemoRecord], date: CalendarDate) -> Vec<MemoRecord> {
    memos_on_date_in(snapshot, date, &Local)
}

/// Memos whose day in `tz` is `date`, in snapshot order.
pub fn memos_on_date_in<Tz: TimeZone>(
    snapshot: &[MemoRecord],
    date: CalendarDate,
    tz: &Tz,
) -> Vec<MemoRecord> {
    snapshot
        .iter()
        .filter(|memo| memo_date_in(memo.timestamp, tz) == Some(date))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{date_key, memo_counts_by_date_in, memo_date_in, memos_on_date_in};
    use crate::calendar::date::CalendarDate;
    use crate::model::memo::MemoRecord;
    use chrono::{FixedOffset, Local, TimeZone};

    fn memo(id: &str, timestamp: i64) -> MemoRecord {
        MemoRecord {
            id: id.to_string(),
            title: id.to_string(),
            content: String::new(),
            category: String::new(),
            images: Vec::new(),
            timestamp,
            is_liked: false,
        }
    }

    fn millis<Tz: TimeZone>(tz: &Tz, y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
        tz.with_ymd_and_hms(y, mo, d, h, mi, 0)
            .earliest()
            .expect("valid local time")
            .timestamp_millis()
    }

    #[test]
    fn local_morning_buckets_under_same_day() {
        let timestamp = millis(&Local, 2024, 3, 15, 9, 0);
        assert_eq!(date_key(timestamp).as_deref(), Some("2024-03-15"));
    }

    #[test]
    fn bucketing_uses_given_zone_not_utc() {
        let seoul = FixedOffset::east_opt(9 * 3600).unwrap();
        // 2024-03-15 01:30 in Seoul is still 2024-03-14 in UTC.
        let timestamp = millis(&seoul, 2024, 3, 15, 1, 30);
        assert_eq!(
            memo_date_in(timestamp, &seoul).map(|d| d.key()).as_deref(),
            Some("2024-03-15")
        );
        assert_eq!(
            memo_date_in(timestamp, &chrono::Utc).map(|d| d.key()).as_deref(),
            Some("2024-03-14")
        );
    }

    #[test]
    fn counts_group_by_day_and_filter_keeps_order() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let snapshot = vec![
            memo("late", millis(&tz, 2024, 3, 15, 23, 59)),
            memo("other", millis(&tz, 2024, 3, 16, 0, 0)),
            memo("early", millis(&tz, 2024, 3, 15, 0, 0)),
        ];

        let counts = memo_counts_by_date_in(&snapshot, &tz);
        assert_eq!(counts.get("2024-03-15"), Some(&2));
        assert_eq!(counts.get("2024-03-16"), Some(&1));
        assert_eq!(counts.len(), 2);

        let day = CalendarDate::parse_key("2024-03-15").unwrap();
        let ids: Vec<_> = memos_on_date_in(&snapshot, day, &tz)
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, ["late", "early"]);
    }
}
