//! SQLite storage bootstrap.
//!
//! # Responsibility
//! - Open SQLite connections backing the memo key-value store.
//! - Create or verify the `kv_entries` schema before a connection is used.
//!
//! # Invariants
//! - No key-value reads or writes happen before the schema check succeeds.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::SCHEMA_VERSION;

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or querying the SQLite file.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file carries this schema revision, written by a newer build.
    NewerSchema(u32),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::NewerSchema(version) => write!(
                f,
                "memo database schema version {version} is newer than supported {SCHEMA_VERSION}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::NewerSchema(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
