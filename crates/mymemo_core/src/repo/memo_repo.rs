//! Memo repository: serialized whole-collection persistence.
//!
//! # Responsibility
//! - Provide load/CRUD/batch-delete/attachment APIs over the `memos` blob.
//! - Serialize every read/mutate/persist cycle behind one mutex.
//!
//! # Invariants
//! - The store lock is held for the full cycle, so two writers can never both
//!   read the same old collection (no lost updates inside the process).
//! - Nothing is written when the mutation fails; a failed write leaves the
//!   previously persisted collection in place.
//! - Deleting an unknown id is a no-op; updating one is `NotFound`.

use crate::model::memo::{
    ImageAttachment, MemoDraft, MemoId, MemoPatch, MemoRecord, MemoValidationError,
};
use crate::repo::codec::{check_identity, decode_memos, encode_memos, DecodeError};
use crate::store::{KvStore, StoreError};
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use uuid::Uuid;

/// Fixed store key holding the serialized collection.
pub const MEMOS_KEY: &str = "memos";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for memo persistence and mutation.
#[derive(Debug)]
pub enum RepoError {
    /// Create/update target violates memo field rules.
    Validation(MemoValidationError),
    /// No memo with this id exists.
    NotFound(MemoId),
    /// The memo exists but has no attachment with this id.
    ImageNotFound { memo_id: MemoId, image_id: String },
    /// Store could not be read.
    StorageRead(StoreError),
    /// Persisted bytes exist but are not a valid collection.
    Corrupted(DecodeError),
    /// Store rejected or failed the write; previous state is kept.
    StorageWrite(StoreError),
}

impl RepoError {
    /// Stable machine-readable code used in log events and host envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) | Self::ImageNotFound { .. } => "not_found",
            Self::StorageRead(_) | Self::Corrupted(_) => "storage_read",
            Self::StorageWrite(_) => "storage_write",
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == "not_found"
    }

    pub fn is_storage_read(&self) -> bool {
        self.code() == "storage_read"
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "memo not found: {id}"),
            Self::ImageNotFound { memo_id, image_id } => {
                write!(f, "image `{image_id}` not found in memo {memo_id}")
            }
            Self::StorageRead(err) => write!(f, "failed to read memos: {err}"),
            Self::Corrupted(err) => write!(f, "failed to read memos: {err}"),
            Self::StorageWrite(err) => write!(f, "failed to write memos: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::StorageRead(err) | Self::StorageWrite(err) => Some(err),
            Self::Corrupted(err) => Some(err),
            Self::NotFound(_) | Self::ImageNotFound { .. } => None,
        }
    }
}

impl From<MemoValidationError> for RepoError {
    fn from(value: MemoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DecodeError> for RepoError {
    fn from(value: DecodeError) -> Self {
        Self::Corrupted(value)
    }
}

/// Outcome of one in-memory mutation.
struct Applied<T> {
    value: T,
    changed: bool,
}

impl<T> Applied<T> {
    fn changed(value: T) -> Self {
        Self {
            value,
            changed: true,
        }
    }

    fn unchanged(value: T) -> Self {
        Self {
            value,
            changed: false,
        }
    }
}

/// Single source of truth for the memo collection.
///
/// All methods take `&self`; the internal mutex queues concurrent callers so
/// their cycles run one after another.
pub struct MemoRepository<S: KvStore> {
    store: Mutex<S>,
}

impl<S: KvStore> MemoRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Consumes the repository and returns the backing store.
    pub fn into_store(self) -> S {
        self.store.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the persisted collection, or an empty one if never written.
    pub fn load_all(&self) -> RepoResult<Vec<MemoRecord>> {
        let started_at = Instant::now();
        let store = self.lock_store();
        match read_collection(&*store) {
            Ok(memos) => {
                info!(
                    "event=memo_load module=repo status=ok memo_count={} duration_ms={}",
                    memos.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(memos)
            }
            Err(err) => {
                error!(
                    "event=memo_load module=repo status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Looks up one memo by id.
    pub fn get(&self, id: &str) -> RepoResult<Option<MemoRecord>> {
        Ok(self.load_all()?.into_iter().find(|memo| memo.id == id))
    }

    /// Replaces the whole persisted collection.
    ///
    /// Used by restore/import paths; identity invariants are checked first.
    pub fn replace_all(&self, memos: Vec<MemoRecord>) -> RepoResult<()> {
        check_identity(&memos)?;
        self.mutate("memo_replace_all", move |current| {
            *current = memos;
            Ok(Applied::changed(()))
        })
    }

    /// Validates a draft, assigns id and timestamp, and appends it.
    pub fn create(&self, draft: MemoDraft) -> RepoResult<MemoRecord> {
        let mut record = MemoRecord::from_draft(draft, now_millis());
        record.validate()?;

        self.mutate("memo_create", move |memos| {
            while memos.iter().any(|memo| memo.id == record.id) {
                record.id = Uuid::new_v4().to_string();
            }
            memos.push(record.clone());
            Ok(Applied::changed(record))
        })
    }

    /// Applies a partial update. `timestamp` is never changed.
    ///
    /// A patch carrying only the pin flag skips the non-empty check.
    pub fn update(&self, id: &str, patch: MemoPatch) -> RepoResult<MemoRecord> {
        self.mutate("memo_update", |memos| {
            let memo = find_mut(memos, id)?;
            let mut updated = memo.clone();
            let pin_only = patch.is_pin_only();
            updated.apply_patch(patch);
            if !pin_only {
                updated.validate()?;
            }
            *memo = updated.clone();
            Ok(Applied::changed(updated))
        })
    }

    /// Flips the pin flag.
    pub fn toggle_like(&self, id: &str) -> RepoResult<MemoRecord> {
        self.mutate("memo_toggle_like", |memos| {
            let memo = find_mut(memos, id)?;
            memo.is_liked = !memo.is_liked;
            Ok(Applied::changed(memo.clone()))
        })
    }

    /// Removes one memo; returns whether it existed.
    pub fn delete(&self, id: &str) -> RepoResult<bool> {
        let ids = HashSet::from([id.to_string()]);
        Ok(self.delete_batch(&ids)? == 1)
    }

    /// Removes every memo whose id is in `ids`; returns how many were removed.
    pub fn delete_batch(&self, ids: &HashSet<MemoId>) -> RepoResult<usize> {
        self.mutate("memo_delete", |memos| {
            let before = memos.len();
            memos.retain(|memo| !ids.contains(&memo.id));
            let removed = before - memos.len();
            Ok(if removed > 0 {
                Applied::changed(removed)
            } else {
                Applied::unchanged(0)
            })
        })
    }

    /// Appends attachments to a memo, preserving their order.
    pub fn add_images(
        &self,
        memo_id: &str,
        images: Vec<ImageAttachment>,
    ) -> RepoResult<MemoRecord> {
        self.mutate("memo_add_images", |memos| {
            let memo = find_mut(memos, memo_id)?;
            if images.is_empty() {
                return Ok(Applied::unchanged(memo.clone()));
            }
            memo.append_images(images)?;
            Ok(Applied::changed(memo.clone()))
        })
    }

    /// Removes one attachment. An unknown image id is a no-op.
    ///
    /// Fails with `Validation` when the removal would leave the memo empty.
    pub fn remove_image(&self, memo_id: &str, image_id: &str) -> RepoResult<MemoRecord> {
        self.mutate("memo_remove_image", |memos| {
            let memo = find_mut(memos, memo_id)?;
            let mut updated = memo.clone();
            if !updated.remove_image(image_id) {
                return Ok(Applied::unchanged(updated));
            }
            updated.validate()?;
            *memo = updated.clone();
            Ok(Applied::changed(updated))
        })
    }

    /// Replaces one attachment caption.
    pub fn retag_image(
        &self,
        memo_id: &str,
        image_id: &str,
        tag: impl Into<String>,
    ) -> RepoResult<MemoRecord> {
        let tag = tag.into();
        self.mutate("memo_retag_image", |memos| {
            let memo = find_mut(memos, memo_id)?;
            if !memo.retag_image(image_id, tag) {
                return Err(RepoError::ImageNotFound {
                    memo_id: memo_id.to_string(),
                    image_id: image_id.to_string(),
                });
            }
            Ok(Applied::changed(memo.clone()))
        })
    }

    /// Runs one read/mutate/persist cycle while holding the store lock.
    fn mutate<T>(
        &self,
        event: &'static str,
        apply: impl FnOnce(&mut Vec<MemoRecord>) -> RepoResult<Applied<T>>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let mut store = self.lock_store();

        let result = read_collection(&*store).and_then(|mut memos| {
            let applied = apply(&mut memos)?;
            if applied.changed {
                write_collection(&mut *store, &memos)?;
            }
            Ok((applied, memos.len()))
        });

        match result {
            Ok((applied, memo_count)) => {
                info!(
                    "event={event} module=repo status=ok changed={} memo_count={memo_count} duration_ms={}",
                    applied.changed,
                    started_at.elapsed().as_millis()
                );
                Ok(applied.value)
            }
            Err(err) => {
                let duration_ms = started_at.elapsed().as_millis();
                match &err {
                    RepoError::Validation(_)
                    | RepoError::NotFound(_)
                    | RepoError::ImageNotFound { .. } => warn!(
                        "event={event} module=repo status=rejected duration_ms={duration_ms} error_code={}",
                        err.code()
                    ),
                    _ => error!(
                        "event={event} module=repo status=error duration_ms={duration_ms} error_code={} error={err}",
                        err.code()
                    ),
                }
                Err(err)
            }
        }
    }

    fn lock_store(&self) -> MutexGuard<'_, S> {
        // The store only ever holds whole collections, so a guard poisoned by
        // a panicking caller still points at consistent data.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_collection<S: KvStore + ?Sized>(store: &S) -> RepoResult<Vec<MemoRecord>> {
    match store.get(MEMOS_KEY).map_err(RepoError::StorageRead)? {
        Some(bytes) => Ok(decode_memos(&bytes)?),
        None => Ok(Vec::new()),
    }
}

fn write_collection<S: KvStore + ?Sized>(store: &mut S, memos: &[MemoRecord]) -> RepoResult<()> {
    let bytes = encode_memos(memos).map_err(|err| {
        RepoError::StorageWrite(StoreError::Rejected(format!("encode failed: {err}")))
    })?;
    store.set(MEMOS_KEY, &bytes).map_err(RepoError::StorageWrite)
}

fn find_mut<'a>(memos: &'a mut [MemoRecord], id: &str) -> RepoResult<&'a mut MemoRecord> {
    memos
        .iter_mut()
        .find(|memo| memo.id == id)
        .ok_or_else(|| RepoError::NotFound(id.to_string()))
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{MemoRepository, RepoError, MEMOS_KEY};
    use crate::model::memo::{MemoDraft, MemoPatch};
    use crate::store::{KvStore, MemoryKvStore, StoreError, StoreResult};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn draft(title: &str) -> MemoDraft {
        MemoDraft {
            title: title.to_string(),
            ..MemoDraft::default()
        }
    }

    /// Store whose writes fail once `fail_writes` is set.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryKvStore,
        fail_writes: bool,
    }

    impl KvStore for FlakyStore {
        fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &[u8]) -> StoreResult<()> {
            if self.fail_writes {
                return Err(StoreError::Rejected("disk full".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn failed_write_keeps_previous_collection() {
        let repo = MemoRepository::new(FlakyStore::default());
        let kept = repo.create(draft("kept")).unwrap();

        let mut store = repo.into_store();
        store.fail_writes = true;
        let repo = MemoRepository::new(store);

        let err = repo.create(draft("lost")).unwrap_err();
        assert!(matches!(err, RepoError::StorageWrite(_)));
        assert_eq!(err.code(), "storage_write");

        let memos = repo.load_all().unwrap();
        assert_eq!(memos.len(), 1);
        assert_eq!(memos[0].id, kept.id);
    }

    #[test]
    fn validation_failure_does_not_write() {
        let repo = MemoRepository::new(MemoryKvStore::new());
        let err = repo.create(MemoDraft::default()).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(repo.into_store().get(MEMOS_KEY).unwrap().is_none());
    }

    #[test]
    fn concurrent_creates_are_not_lost() {
        let repo = Arc::new(MemoRepository::new(MemoryKvStore::new()));
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let repo = Arc::clone(&repo);
                thread::spawn(move || {
                    for n in 0..10 {
                        repo.create(draft(&format!("w{worker}-{n}"))).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let memos = repo.load_all().unwrap();
        assert_eq!(memos.len(), 80);
        let ids: HashSet<_> = memos.iter().map(|memo| memo.id.as_str()).collect();
        assert_eq!(ids.len(), 80);
    }

    #[test]
    fn pin_only_patch_skips_empty_check() {
        let repo = MemoRepository::new(MemoryKvStore::new());
        let memo = repo.create(draft("x")).unwrap();

        let pinned = repo
            .update(
                &memo.id,
                MemoPatch {
                    is_liked: Some(true),
                    ..MemoPatch::default()
                },
            )
            .unwrap();
        assert!(pinned.is_liked);

        let err = repo
            .update(
                &memo.id,
                MemoPatch {
                    title: Some(String::new()),
                    ..MemoPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
