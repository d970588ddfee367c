//! Search, category filter and pin/timestamp ordering.
//!
//! # Invariants
//! - Ordering is a stable sort on (`!is_liked`, `timestamp` descending), so
//!   memos with equal keys keep their snapshot order.
//! - The category universe starts with [`ALL_CATEGORIES`] and lists each
//!   non-empty category once, in order of first appearance.

use crate::model::memo::MemoRecord;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Sentinel category that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

/// Filter options for list views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoFilter {
    /// Case-insensitive substring matched against title and content.
    pub query: String,
    /// Exact category, or [`ALL_CATEGORIES`].
    pub category: String,
}

impl Default for MemoFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: ALL_CATEGORIES.to_string(),
        }
    }
}

impl MemoFilter {
    pub fn new(query: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: category.into(),
        }
    }

    /// Returns whether one memo passes both the category and the text filter.
    pub fn matches(&self, memo: &MemoRecord) -> bool {
        self.matches_category(memo) && matches_query(memo, &self.query.to_lowercase())
    }

    fn matches_category(&self, memo: &MemoRecord) -> bool {
        self.category == ALL_CATEGORIES || memo.category == self.category
    }
}

fn matches_query(memo: &MemoRecord, lowered_query: &str) -> bool {
    lowered_query.is_empty()
        || memo.title.to_lowercase().contains(lowered_query)
        || memo.content.to_lowercase().contains(lowered_query)
}

/// Returns the filtered snapshot in display order.
pub fn filter_and_sort(snapshot: &[MemoRecord], filter: &MemoFilter) -> Vec<MemoRecord> {
    let lowered_query = filter.query.to_lowercase();
    let mut items = snapshot
        .iter()
        .filter(|memo| filter.matches_category(memo) && matches_query(memo, &lowered_query))
        .cloned()
        .collect::<Vec<_>>();
    sort_for_display(&mut items);
    items
}

/// Sorts pinned memos first, then newest first.
pub fn sort_for_display(memos: &mut [MemoRecord]) {
    memos.sort_by_key(|memo| (!memo.is_liked, Reverse(memo.timestamp)));
}

/// Lists `"All"` followed by distinct non-empty categories in first-seen order.
pub fn category_universe(snapshot: &[MemoRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for memo in snapshot {
        if !memo.category.is_empty() && seen.insert(memo.category.as_str()) {
            categories.push(memo.category.clone());
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::{category_universe, filter_and_sort, MemoFilter, ALL_CATEGORIES};
    use crate::model::memo::MemoRecord;

    fn memo(id: &str, timestamp: i64, is_liked: bool, category: &str) -> MemoRecord {
        MemoRecord {
            id: id.to_string(),
            title: format!("title {id}"),
            content: String::new(),
            category: category.to_string(),
            images: Vec::new(),
            timestamp,
            is_liked,
        }
    }

    fn ids(memos: &[MemoRecord]) -> Vec<&str> {
        memos.iter().map(|memo| memo.id.as_str()).collect()
    }

    #[test]
    fn pinned_memo_sorts_before_older_unpinned() {
        let snapshot = vec![memo("1", 100, false, "work"), memo("2", 200, true, "home")];
        let result = filter_and_sort(&snapshot, &MemoFilter::default());
        assert_eq!(ids(&result), ["2", "1"]);
    }

    #[test]
    fn pinned_group_precedes_newer_unpinned() {
        let snapshot = vec![
            memo("old-pin", 10, true, ""),
            memo("new", 300, false, ""),
            memo("mid", 200, false, ""),
            memo("new-pin", 50, true, ""),
        ];
        let result = filter_and_sort(&snapshot, &MemoFilter::default());
        assert_eq!(ids(&result), ["new-pin", "old-pin", "new", "mid"]);
    }

    #[test]
    fn equal_keys_keep_snapshot_order() {
        let snapshot = vec![memo("a", 5, false, ""), memo("b", 5, false, "")];
        assert_eq!(ids(&filter_and_sort(&snapshot, &MemoFilter::default())), ["a", "b"]);
    }

    #[test]
    fn query_matches_title_or_content_case_insensitively() {
        let mut with_content = memo("c", 1, false, "");
        with_content.content = "Buy MILK".to_string();
        let snapshot = vec![memo("a", 2, false, ""), with_content];

        let result = filter_and_sort(&snapshot, &MemoFilter::new("milk", ALL_CATEGORIES));
        assert_eq!(ids(&result), ["c"]);

        let result = filter_and_sort(&snapshot, &MemoFilter::new("TITLE A", ALL_CATEGORIES));
        assert_eq!(ids(&result), ["a"]);
    }

    #[test]
    fn category_filter_is_exact_and_uncategorized_only_shows_under_all() {
        let snapshot = vec![
            memo("1", 1, false, "work"),
            memo("2", 2, false, ""),
            memo("3", 3, false, "Work"),
        ];
        assert_eq!(
            ids(&filter_and_sort(&snapshot, &MemoFilter::new("", "work"))),
            ["1"]
        );
        assert_eq!(
            ids(&filter_and_sort(&snapshot, &MemoFilter::default())),
            ["3", "2", "1"]
        );
    }

    #[test]
    fn category_universe_keeps_first_seen_order_and_skips_empty() {
        let snapshot = vec![
            memo("1", 1, false, "zeta"),
            memo("2", 2, false, ""),
            memo("3", 3, false, "alpha"),
            memo("4", 4, false, "zeta"),
        ];
        assert_eq!(category_universe(&snapshot), ["All", "zeta", "alpha"]);
        assert_eq!(category_universe(&[]), ["All"]);
    }
}
