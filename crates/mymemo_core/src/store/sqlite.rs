//! SQLite-backed key-value store.
//!
//! # Responsibility
//! - Persist opaque values in `kv_entries`, one row per key.
//!
//! # Invariants
//! - Every `set` is a single upsert statement, so a failed write leaves the
//!   previous row intact.
//! - The connection passed in must already be migrated (see `db::open_db`).

use super::{KvStore, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Key-value store owning one migrated SQLite connection.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens the database file at `path`, creating and migrating it if needed.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Borrows the underlying connection for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteKvStore;
    use crate::store::KvStore;

    #[test]
    fn get_set_roundtrip_and_overwrite() {
        let mut store = SqliteKvStore::open_in_memory().unwrap();
        assert_eq!(store.get("memos").unwrap(), None);

        store.set("memos", b"[]").unwrap();
        store.set("memos", b"[{}]").unwrap();
        assert_eq!(store.get("memos").unwrap().as_deref(), Some(&b"[{}]"[..]));

        let rows: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
