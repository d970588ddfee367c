//! Core domain logic for MyMemo.
//! This crate is the single source of truth for memo invariants, persistence
//! and the list/calendar views derived from the memo collection.

pub mod calendar;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use calendar::buckets::{date_key, memo_counts_by_date, memos_on_date};
pub use calendar::date::{CalendarDate, CalendarMonth, MAX_YEAR, MIN_YEAR};
pub use calendar::grid::{CalendarGridBuilder, CellMonth, GridCell, MonthGrid, GRID_CELLS};
pub use calendar::highlight::DayHighlightSet;
pub use calendar::{CalendarError, CalendarResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::memo::{
    ImageAttachment, ImageId, MemoDraft, MemoId, MemoPatch, MemoRecord, MemoValidationError,
    PickedImage,
};
pub use repo::memo_repo::{MemoRepository, RepoError, RepoResult, MEMOS_KEY};
pub use search::filter::{category_universe, filter_and_sort, MemoFilter, ALL_CATEGORIES};
pub use service::memo_service::{CalendarView, MemoListView, MemoService};
pub use service::selection::MemoSelection;
pub use store::{KvStore, MemoryKvStore, SqliteKvStore, StoreError, StoreResult};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
