//! Key-value schema for the memo database.
//!
//! The file holds a single table. `PRAGMA user_version` records which schema
//! revision created it: `0` means a fresh file, anything above
//! [`SCHEMA_VERSION`] was written by a newer build and is left untouched.

use super::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Schema revision written by this build.
pub const SCHEMA_VERSION: u32 = 1;

// The memo collection lives under one fixed key as a JSON array; every write
// replaces the whole value.
const KV_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv_entries (
    key TEXT PRIMARY KEY NOT NULL,
    value BLOB NOT NULL,
    updated_at INTEGER NOT NULL
);";

/// Creates `kv_entries` on a fresh file, or checks an existing file's revision.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    match schema_version(conn)? {
        0 => {
            let tx = conn.transaction()?;
            tx.execute_batch(KV_SCHEMA)?;
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            tx.commit()?;
            info!("event=db_schema module=db status=ok action=created version={SCHEMA_VERSION}");
            Ok(())
        }
        SCHEMA_VERSION => Ok(()),
        newer => Err(DbError::NewerSchema(newer)),
    }
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}
