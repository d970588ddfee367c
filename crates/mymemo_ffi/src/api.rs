//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose memo list/detail/create/calendar use-cases to Dart via FRB.
//! - Own the one process-wide memo service so every host call goes through
//!   the same serialized repository.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures are reported in response envelopes (`ok=false` + message),
//!   never thrown.
//! - The store path is fixed by the first successful `configure_store` call.

use mymemo_core::{
    core_version as core_version_inner, date_key, init_logging as init_logging_inner,
    ping as ping_inner, CalendarDate, CalendarMonth, CellMonth, DayHighlightSet, GridCell,
    MemoDraft, MemoFilter, MemoPatch, MemoRecord, MemoService, PickedImage, RepoError,
    SqliteKvStore, ALL_CATEGORIES,
};
use log::{info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

static MEMO_STORE: OnceLock<ConfiguredStore> = OnceLock::new();
static WEEKDAY_HIGHLIGHTS: OnceLock<Mutex<DayHighlightSet>> = OnceLock::new();

struct ConfiguredStore {
    db_path: PathBuf,
    service: MemoService<SqliteKvStore>,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Opens (creating if needed) the memo database at `db_path`.
///
/// # FFI contract
/// - Must be called before any `memo_*`/`calendar_*` function.
/// - Idempotent for the same path; a different path is rejected.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);

    if let Some(active) = MEMO_STORE.get() {
        return path_conflict_message(&active.db_path, &requested);
    }

    let store = match SqliteKvStore::open(&requested) {
        Ok(store) => store,
        Err(err) => {
            warn!("event=store_configure module=ffi status=error error={err}");
            return format!("configure_store failed: {err}");
        }
    };
    let configured = ConfiguredStore {
        db_path: requested.clone(),
        service: MemoService::from_store(store),
    };

    // A concurrent caller may have won the race; compare against the winner.
    if MEMO_STORE.set(configured).is_ok() {
        info!("event=store_configure module=ffi status=ok");
    }
    match MEMO_STORE.get() {
        Some(active) => path_conflict_message(&active.db_path, &requested),
        None => "configure_store failed: store not initialized".to_string(),
    }
}

/// One image attachment as shown by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoImageItem {
    pub id: String,
    pub uri: String,
    pub tag: String,
}

/// Memo projection returned to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub images: Vec<MemoImageItem>,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
    pub is_liked: bool,
    /// Local `YYYY-MM-DD` day of `timestamp`.
    pub date_key: String,
}

/// Response envelope for single-memo actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoActionResponse {
    pub ok: bool,
    /// Memo state after the action, when it succeeded.
    pub memo: Option<MemoItem>,
    /// `validation|not_found|storage_read|storage_write|not_configured`.
    pub error_code: Option<String>,
    pub message: String,
}

impl MemoActionResponse {
    fn success(message: impl Into<String>, memo: MemoRecord) -> Self {
        Self {
            ok: true,
            memo: Some(to_memo_item(memo)),
            error_code: None,
            message: message.into(),
        }
    }

    fn failure(error_code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            memo: None,
            error_code: Some(error_code.to_string()),
            message: message.into(),
        }
    }
}

/// Response envelope for list-shaped reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoListResponse {
    pub ok: bool,
    pub items: Vec<MemoItem>,
    /// Category chips, `"All"` first. Empty for day listings.
    pub categories: Vec<String>,
    pub message: String,
}

impl MemoListResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            categories: Vec::new(),
            message: message.into(),
        }
    }
}

/// Response envelope for deletions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoDeleteResponse {
    pub ok: bool,
    pub removed: u32,
    /// Same codes as [`MemoActionResponse::error_code`].
    pub error_code: Option<String>,
    pub message: String,
}

/// One calendar grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCellItem {
    pub date_key: String,
    pub day: u32,
    /// `prev|current|next`.
    pub month_kind: String,
    /// `0` = Sunday.
    pub weekday: u8,
    pub memo_count: u32,
    pub highlighted: bool,
}

/// Response envelope for one laid-out month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonthResponse {
    pub ok: bool,
    pub year: i32,
    /// 0-indexed month.
    pub month: u32,
    pub days_in_month: u32,
    pub first_weekday: u8,
    /// Always 42 cells on success.
    pub cells: Vec<CalendarCellItem>,
    /// `None` at the edge of the supported year range.
    pub previous: Option<CalendarMonthRef>,
    pub next: Option<CalendarMonthRef>,
    pub message: String,
}

/// Navigation target for month paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarMonthRef {
    pub year: i32,
    /// 0-indexed month.
    pub month: u32,
}

impl From<CalendarMonth> for CalendarMonthRef {
    fn from(value: CalendarMonth) -> Self {
        Self {
            year: value.year(),
            month: value.month(),
        }
    }
}

/// Response envelope for weekday highlight changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightResponse {
    pub ok: bool,
    pub highlighted_weekdays: Vec<u8>,
    pub message: String,
}

/// Lists memos for the list screen.
///
/// `category = None` or `"All"` disables category filtering; an empty
/// `query` matches everything.
#[flutter_rust_bridge::frb(sync)]
pub fn memo_list(query: String, category: Option<String>) -> MemoListResponse {
    let filter = MemoFilter::new(
        query,
        category.unwrap_or_else(|| ALL_CATEGORIES.to_string()),
    );
    match with_service(|service| service.list_memos(&filter)) {
        Ok(view) => MemoListResponse {
            ok: true,
            message: format!("{} of {} memo(s).", view.items.len(), view.total),
            items: view.items.into_iter().map(to_memo_item).collect(),
            categories: view.categories,
        },
        Err(err) => MemoListResponse::failure(format!("memo_list failed: {}", err.message)),
    }
}

/// Gets one memo for the detail screen.
#[flutter_rust_bridge::frb(sync)]
pub fn memo_get(id: String) -> MemoActionResponse {
    match with_service(|service| service.get_memo(&id)) {
        Ok(Some(memo)) => MemoActionResponse::success("Memo loaded.", memo),
        Ok(None) => MemoActionResponse::failure("not_found", format!("memo not found: {id}")),
        Err(err) => err.into_action("memo_get"),
    }
}

/// Creates a memo from editor fields and picked image uris.
///
/// Text fields are trimmed; a memo with no text and no images is rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn memo_create(
    title: String,
    content: String,
    category: String,
    image_uris: Vec<String>,
) -> MemoActionResponse {
    let draft = MemoDraft {
        title,
        content,
        category,
        images: image_uris
            .into_iter()
            .map(|uri| PickedImage { uri }.into())
            .collect(),
    };
    action(
        "memo_create",
        "Memo saved.",
        with_service(|service| service.create_memo(draft)),
    )
}

/// Updates text fields of a memo. `None` fields are left unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn memo_update(
    id: String,
    title: Option<String>,
    content: Option<String>,
    category: Option<String>,
) -> MemoActionResponse {
    let patch = MemoPatch {
        title,
        content,
        category,
        ..MemoPatch::default()
    };
    action(
        "memo_update",
        "Memo updated.",
        with_service(|service| service.update_memo(&id, patch)),
    )
}

/// Pins or unpins a memo.
#[flutter_rust_bridge::frb(sync)]
pub fn memo_toggle_like(id: String) -> MemoActionResponse {
    action(
        "memo_toggle_like",
        "Pin toggled.",
        with_service(|service| service.toggle_like(&id)),
    )
}

/// Deletes one memo. Unknown ids succeed with `removed = 0`.
#[flutter_rust_bridge::frb(sync)]
pub fn memo_delete(id: String) -> MemoDeleteResponse {
    delete_response(with_service(|service| service.delete_memo(&id).map(usize::from)))
}

/// Deletes every memo in `ids`. Unknown ids are skipped.
#[flutter_rust_bridge::frb(sync)]
pub fn memo_delete_batch(ids: Vec<String>) -> MemoDeleteResponse {
    let ids: HashSet<String> = ids.into_iter().collect();
    delete_response(with_service(|service| service.repository().delete_batch(&ids)))
}

fn delete_response(result: Result<usize, CallError>) -> MemoDeleteResponse {
    match result {
        Ok(removed) => MemoDeleteResponse {
            ok: true,
            removed: u32::try_from(removed).unwrap_or(u32::MAX),
            error_code: None,
            message: format!("Deleted {removed} memo(s)."),
        },
        Err(err) => MemoDeleteResponse {
            ok: false,
            removed: 0,
            error_code: Some(err.code.to_string()),
            message: format!("memo_delete failed: {}", err.message),
        },
    }
}

/// Appends picked images to a memo with fresh ids and empty tags.
#[flutter_rust_bridge::frb(sync)]
pub fn memo_add_images(id: String, image_uris: Vec<String>) -> MemoActionResponse {
    let picked = image_uris
        .into_iter()
        .map(|uri| PickedImage { uri })
        .collect();
    action(
        "memo_add_images",
        "Images added.",
        with_service(|service| service.attach_picked_images(&id, picked)),
    )
}

/// Removes one image from a memo. Unknown image ids are ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn memo_remove_image(id: String, image_id: String) -> MemoActionResponse {
    action(
        "memo_remove_image",
        "Image removed.",
        with_service(|service| service.remove_image(&id, &image_id)),
    )
}

/// Replaces one image caption.
#[flutter_rust_bridge::frb(sync)]
pub fn memo_retag_image(id: String, image_id: String, tag: String) -> MemoActionResponse {
    action(
        "memo_retag_image",
        "Image tag updated.",
        with_service(|service| service.retag_image(&id, &image_id, tag)),
    )
}

/// Lays out a month (0-indexed) with memo counts and session highlights.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_month(year: i32, month: u32) -> CalendarMonthResponse {
    match CalendarMonth::new(year, month) {
        Ok(month) => calendar_response(month),
        Err(err) => calendar_failure(year, month, format!("calendar_month failed: {err}")),
    }
}

/// Lays out the month containing today's local date.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_current_month() -> CalendarMonthResponse {
    match CalendarMonth::current() {
        Ok(month) => calendar_response(month),
        Err(err) => calendar_failure(0, 0, format!("calendar_current_month failed: {err}")),
    }
}

/// Lists memos created on a local `YYYY-MM-DD` day, pinned first then newest.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_day_memos(date_key: String) -> MemoListResponse {
    let date = match CalendarDate::parse_key(&date_key) {
        Ok(date) => date,
        Err(err) => return MemoListResponse::failure(format!("calendar_day_memos failed: {err}")),
    };
    match with_service(|service| service.memos_on_date(date)) {
        Ok(memos) => MemoListResponse {
            ok: true,
            message: format!("{} memo(s) on {date}.", memos.len()),
            items: memos.into_iter().map(to_memo_item).collect(),
            categories: Vec::new(),
        },
        Err(err) => {
            MemoListResponse::failure(format!("calendar_day_memos failed: {}", err.message))
        }
    }
}

/// Toggles alternate styling for one weekday (`0` = Sunday) for this session.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_toggle_weekday(weekday: u8) -> HighlightResponse {
    let mut highlights = lock_highlights();
    match highlights.toggle(weekday) {
        Ok(on) => HighlightResponse {
            ok: true,
            highlighted_weekdays: highlights.indices(),
            message: format!(
                "Weekday {weekday} {}.",
                if on { "highlighted" } else { "unhighlighted" }
            ),
        },
        Err(err) => HighlightResponse {
            ok: false,
            highlighted_weekdays: highlights.indices(),
            message: format!("calendar_toggle_weekday failed: {err}"),
        },
    }
}

/// Error carried out of `with_service`.
struct CallError {
    code: &'static str,
    message: String,
}

impl CallError {
    fn into_action(self, operation: &str) -> MemoActionResponse {
        MemoActionResponse::failure(self.code, format!("{operation} failed: {}", self.message))
    }
}

impl From<RepoError> for CallError {
    fn from(value: RepoError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}

fn with_service<T>(
    f: impl FnOnce(&MemoService<SqliteKvStore>) -> Result<T, RepoError>,
) -> Result<T, CallError> {
    let configured = MEMO_STORE.get().ok_or_else(|| CallError {
        code: "not_configured",
        message: "memo store not configured; call configure_store first".to_string(),
    })?;
    f(&configured.service).map_err(CallError::from)
}

fn action(
    operation: &str,
    success_message: &str,
    result: Result<MemoRecord, CallError>,
) -> MemoActionResponse {
    match result {
        Ok(memo) => MemoActionResponse::success(success_message, memo),
        Err(err) => err.into_action(operation),
    }
}

fn calendar_response(month: CalendarMonth) -> CalendarMonthResponse {
    let highlights = lock_highlights().clone();
    match with_service(|service| service.calendar_month(month, &highlights)) {
        Ok(view) => CalendarMonthResponse {
            ok: true,
            year: view.grid.month.year(),
            month: view.grid.month.month(),
            days_in_month: view.grid.days_in_month,
            first_weekday: view.grid.first_weekday,
            message: format!(
                "{} memo(s) this month.",
                view.grid
                    .cells
                    .iter()
                    .filter(|cell| cell.month == CellMonth::Current)
                    .map(|cell| cell.memo_count)
                    .sum::<usize>()
            ),
            cells: view.grid.cells.iter().map(to_cell_item).collect(),
            previous: view.previous.map(CalendarMonthRef::from),
            next: view.next.map(CalendarMonthRef::from),
        },
        Err(err) => calendar_failure(
            month.year(),
            month.month(),
            format!("calendar_month failed: {}", err.message),
        ),
    }
}

fn calendar_failure(year: i32, month: u32, message: String) -> CalendarMonthResponse {
    CalendarMonthResponse {
        ok: false,
        year,
        month,
        days_in_month: 0,
        first_weekday: 0,
        cells: Vec::new(),
        previous: None,
        next: None,
        message,
    }
}

fn lock_highlights() -> std::sync::MutexGuard<'static, DayHighlightSet> {
    WEEKDAY_HIGHLIGHTS
        .get_or_init(|| Mutex::new(DayHighlightSet::default()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn path_conflict_message(active: &Path, requested: &Path) -> String {
    if active == requested {
        String::new()
    } else {
        format!(
            "memo store already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

fn to_memo_item(memo: MemoRecord) -> MemoItem {
    MemoItem {
        date_key: date_key(memo.timestamp).unwrap_or_default(),
        id: memo.id,
        title: memo.title,
        content: memo.content,
        category: memo.category,
        images: memo
            .images
            .into_iter()
            .map(|image| MemoImageItem {
                id: image.id,
                uri: image.uri,
                tag: image.tag,
            })
            .collect(),
        timestamp: memo.timestamp,
        is_liked: memo.is_liked,
    }
}

fn to_cell_item(cell: &GridCell) -> CalendarCellItem {
    CalendarCellItem {
        date_key: cell.date.key(),
        day: cell.day(),
        month_kind: cell_month_label(cell.month).to_string(),
        weekday: cell.weekday,
        memo_count: u32::try_from(cell.memo_count).unwrap_or(u32::MAX),
        highlighted: cell.highlighted,
    }
}

fn cell_month_label(month: CellMonth) -> &'static str {
    match month {
        CellMonth::Previous => "prev",
        CellMonth::Current => "current",
        CellMonth::Next => "next",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        calendar_current_month, calendar_day_memos, calendar_month, calendar_toggle_weekday,
        configure_store, core_version, delete_response, init_logging, memo_add_images,
        memo_create, memo_delete, memo_delete_batch, memo_get, memo_list, memo_retag_image,
        memo_toggle_like, memo_update, ping, CalendarMonthRef, CallError,
    };
    use std::path::PathBuf;
    use std::sync::OnceLock;
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEST_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

    fn configured() -> PathBuf {
        let path = TEST_DB_PATH
            .get_or_init(|| {
                std::env::temp_dir().join(format!("{}.sqlite3", unique_token("mymemo-ffi")))
            })
            .clone();
        let error = configure_store(path.to_string_lossy().into_owned());
        assert!(error.is_empty(), "{error}");
        path
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{}-{nanos}", std::process::id())
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
    }

    #[test]
    fn configure_store_is_idempotent_and_rejects_switching() {
        let path = configured();
        assert!(configure_store(path.to_string_lossy().into_owned()).is_empty());

        let other = std::env::temp_dir().join(format!("{}.sqlite3", unique_token("other")));
        let error = configure_store(other.to_string_lossy().into_owned());
        assert!(error.contains("refusing to switch"));
    }

    #[test]
    fn create_rejects_blank_memo_with_validation_code() {
        configured();
        let response = memo_create(" ".to_string(), String::new(), String::new(), Vec::new());
        assert!(!response.ok);
        assert_eq!(response.error_code.as_deref(), Some("validation"));
    }

    #[test]
    fn create_update_pin_and_list_flow() {
        configured();
        let token = unique_token("flow");
        let created = memo_create(
            format!("  {token} "),
            "body".to_string(),
            "ffi-tests".to_string(),
            vec!["content://media/7".to_string()],
        );
        assert!(created.ok, "{}", created.message);
        let memo = created.memo.expect("created memo");
        assert_eq!(memo.title, token);
        assert_eq!(memo.images.len(), 1);
        assert!(memo.images[0].tag.is_empty());

        let updated = memo_update(memo.id.clone(), None, Some("new body".to_string()), None);
        assert!(updated.ok, "{}", updated.message);
        let updated_memo = updated.memo.expect("updated memo");
        assert_eq!(updated_memo.title, token);
        assert_eq!(updated_memo.timestamp, memo.timestamp);

        let pinned = memo_toggle_like(memo.id.clone());
        assert!(pinned.memo.expect("pinned memo").is_liked);

        let listed = memo_list(token.to_uppercase(), Some("ffi-tests".to_string()));
        assert!(listed.ok, "{}", listed.message);
        assert_eq!(listed.items.len(), 1);
        assert!(listed.categories.iter().any(|c| c == "ffi-tests"));
        assert_eq!(listed.categories[0], "All");

        let retagged = memo_retag_image(memo.id.clone(), memo.images[0].id.clone(), "x".into());
        assert_eq!(retagged.memo.expect("retagged").images[0].tag, "x");

        let added = memo_add_images(memo.id.clone(), vec!["content://media/8".to_string()]);
        assert_eq!(added.memo.expect("with images").images.len(), 2);

        let deleted = memo_delete_batch(vec![memo.id.clone(), memo.id.clone()]);
        assert_eq!(deleted.removed, 1);
        let again = memo_delete(memo.id.clone());
        assert!(again.ok);
        assert_eq!(again.removed, 0);
        assert_eq!(again.error_code, None);

        let missing = memo_get(memo.id);
        assert_eq!(missing.error_code.as_deref(), Some("not_found"));
    }

    #[test]
    fn calendar_counts_memos_created_today() {
        configured();
        let created = memo_create(unique_token("cal"), String::new(), String::new(), Vec::new());
        let memo = created.memo.expect("created memo");

        let month = calendar_current_month();
        assert!(month.ok, "{}", month.message);
        assert_eq!(month.cells.len(), 42);
        let today = month
            .cells
            .iter()
            .find(|cell| cell.date_key == memo.date_key && cell.month_kind == "current")
            .expect("today is in the current month grid");
        assert!(today.memo_count >= 1);

        let day = calendar_day_memos(memo.date_key.clone());
        assert!(day.items.iter().any(|item| item.id == memo.id));
    }

    #[test]
    fn failed_delete_carries_error_code() {
        let response = delete_response(Err(CallError {
            code: "storage_write",
            message: "disk full".to_string(),
        }));
        assert!(!response.ok);
        assert_eq!(response.removed, 0);
        assert_eq!(response.error_code.as_deref(), Some("storage_write"));
        assert!(response.message.contains("disk full"));
    }

    #[test]
    fn calendar_month_reports_out_of_range_years_without_panicking() {
        for (year, month) in [(i32::MAX, 11), (i32::MIN, 0), (10_000, 0), (0, 11)] {
            let response = calendar_month(year, month);
            assert!(!response.ok, "{year}-{month}");
            assert!(response.cells.is_empty());
            assert!(response.message.contains("unsupported year"));
        }
    }

    #[test]
    fn calendar_month_links_neighbors() {
        configured();
        let response = calendar_month(2024, 0);
        assert!(response.ok, "{}", response.message);
        assert_eq!(
            response.previous,
            Some(CalendarMonthRef {
                year: 2023,
                month: 11
            })
        );
        assert_eq!(
            response.next,
            Some(CalendarMonthRef {
                year: 2024,
                month: 1
            })
        );

        let last = calendar_month(9999, 11);
        assert!(last.ok, "{}", last.message);
        assert_eq!(last.next, None);
    }

    #[test]
    fn calendar_rejects_bad_input() {
        assert!(!calendar_month(2024, 12).ok);
        assert!(!calendar_day_memos("not-a-date".to_string()).ok);
        assert!(!calendar_toggle_weekday(9).ok);
    }
}
