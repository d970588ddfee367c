//! Domain model for memos and their image attachments.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own the field-level rules every write path must respect.
//!
//! # Invariants
//! - Every memo is identified by a stable `MemoId`.
//! - Deletion is immediate; there are no tombstones.

pub mod memo;
