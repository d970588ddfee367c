//! Repository layer over the key-value store.
//!
//! # Responsibility
//! - Own the read-whole-collection / mutate / write-whole-collection cycle.
//! - Translate store and codec failures into semantic repository errors.
//!
//! # Invariants
//! - Create/update paths validate records before persistence.
//! - Read paths reject malformed persisted state instead of masking it.

pub mod codec;
pub mod memo_repo;
