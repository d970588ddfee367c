//! Memo use-case service.
//!
//! # Responsibility
//! - Normalize user input (trimming) before it reaches the repository.
//! - Wrap picked images into attachments with fresh ids.
//! - Derive list and calendar views from a freshly loaded snapshot.
//!
//! # Invariants
//! - Every view is built from a snapshot loaded inside the call, never from
//!   a cached copy.
//! - Snapshots used for views are in display order (pinned, then newest).

use crate::calendar::date::{CalendarDate, CalendarMonth};
use crate::calendar::grid::{CalendarGridBuilder, MonthGrid};
use crate::calendar::highlight::DayHighlightSet;
use crate::model::memo::{ImageAttachment, MemoDraft, MemoPatch, MemoRecord, PickedImage};
use crate::repo::memo_repo::{MemoRepository, RepoResult};
use crate::search::filter::{category_universe, filter_and_sort, sort_for_display, MemoFilter};
use crate::service::selection::MemoSelection;
use crate::store::KvStore;

/// Filtered list envelope for the memo list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoListView {
    /// Matching memos, pinned first then newest first.
    pub items: Vec<MemoRecord>,
    /// `"All"` plus every category in the unfiltered snapshot.
    pub categories: Vec<String>,
    /// Size of the unfiltered snapshot.
    pub total: usize,
}

/// One laid-out month plus its navigation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarView {
    pub grid: MonthGrid,
    /// `None` at the edge of the supported year range.
    pub previous: Option<CalendarMonth>,
    pub next: Option<CalendarMonth>,
}

/// Memo service facade over a repository.
pub struct MemoService<S: KvStore> {
    repo: MemoRepository<S>,
}

impl<S: KvStore> MemoService<S> {
    pub fn new(repo: MemoRepository<S>) -> Self {
        Self { repo }
    }

    pub fn from_store(store: S) -> Self {
        Self::new(MemoRepository::new(store))
    }

    /// Borrows the underlying repository for raw collection access.
    pub fn repository(&self) -> &MemoRepository<S> {
        &self.repo
    }

    /// Loads the collection in display order.
    pub fn snapshot(&self) -> RepoResult<Vec<MemoRecord>> {
        let mut memos = self.repo.load_all()?;
        sort_for_display(&mut memos);
        Ok(memos)
    }

    /// Gets one memo for the detail view.
    pub fn get_memo(&self, id: &str) -> RepoResult<Option<MemoRecord>> {
        self.repo.get(id)
    }

    /// Creates a memo from trimmed draft fields.
    pub fn create_memo(&self, draft: MemoDraft) -> RepoResult<MemoRecord> {
        self.repo.create(draft.trimmed())
    }

    /// Updates a memo with trimmed patch fields; `timestamp` is kept.
    pub fn update_memo(&self, id: &str, patch: MemoPatch) -> RepoResult<MemoRecord> {
        self.repo.update(id, patch.trimmed())
    }

    pub fn toggle_like(&self, id: &str) -> RepoResult<MemoRecord> {
        self.repo.toggle_like(id)
    }

    /// Deletes one memo; unknown ids are ignored.
    pub fn delete_memo(&self, id: &str) -> RepoResult<bool> {
        self.repo.delete(id)
    }

    /// Deletes every selected memo and clears the selection on success.
    ///
    /// The selection is kept when the write fails so the caller can retry.
    pub fn delete_selected(&self, selection: &mut MemoSelection) -> RepoResult<usize> {
        if selection.is_empty() {
            return Ok(0);
        }
        let removed = self.repo.delete_batch(&selection.to_id_set())?;
        selection.clear();
        Ok(removed)
    }

    /// Attaches picker results with fresh ids and empty tags.
    pub fn attach_picked_images(
        &self,
        memo_id: &str,
        picked: Vec<PickedImage>,
    ) -> RepoResult<MemoRecord> {
        let images = picked.into_iter().map(ImageAttachment::from).collect();
        self.repo.add_images(memo_id, images)
    }

    pub fn remove_image(&self, memo_id: &str, image_id: &str) -> RepoResult<MemoRecord> {
        self.repo.remove_image(memo_id, image_id)
    }

    pub fn retag_image(
        &self,
        memo_id: &str,
        image_id: &str,
        tag: impl Into<String>,
    ) -> RepoResult<MemoRecord> {
        self.repo.retag_image(memo_id, image_id, tag)
    }

    /// Builds the list screen view for one filter.
    pub fn list_memos(&self, filter: &MemoFilter) -> RepoResult<MemoListView> {
        let snapshot = self.repo.load_all()?;
        Ok(MemoListView {
            items: filter_and_sort(&snapshot, filter),
            categories: category_universe(&snapshot),
            total: snapshot.len(),
        })
    }

    /// Lays out one month against the current snapshot.
    pub fn calendar_month(
        &self,
        month: CalendarMonth,
        highlights: &DayHighlightSet,
    ) -> RepoResult<CalendarView> {
        let builder = CalendarGridBuilder::new(self.snapshot()?);
        Ok(CalendarView {
            grid: builder.build(month, highlights),
            previous: month.previous(),
            next: month.next(),
        })
    }

    /// Memos created on `date` (local time), in display order.
    pub fn memos_on_date(&self, date: CalendarDate) -> RepoResult<Vec<MemoRecord>> {
        Ok(CalendarGridBuilder::new(self.snapshot()?).memos_on_date(date))
    }
}
