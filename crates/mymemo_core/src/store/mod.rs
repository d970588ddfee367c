//! Key-value persistence boundary.
//!
//! # Responsibility
//! - Define the byte-level `get`/`set` contract the memo repository writes to.
//! - Provide in-memory and SQLite-backed implementations.
//!
//! # Invariants
//! - `set` replaces the whole value for a key or leaves the previous value
//!   untouched; partial values are never observable.
//! - An absent key is reported as `Ok(None)`, never as an error.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Transport-level failure reported by a key-value backend.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Backend refused the operation for a reason of its own.
    Rejected(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Rejected(reason) => write!(f, "store rejected operation: {reason}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Rejected(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Byte store addressed by string keys.
///
/// Implementations must be `Send` so a repository can be shared behind a
/// mutex across threads.
pub trait KvStore: Send {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;
    fn set(&mut self, key: &str, value: &[u8]) -> StoreResult<()>;
}

impl<S: KvStore + ?Sized> KvStore for Box<S> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> StoreResult<()> {
        (**self).set(key, value)
    }
}
