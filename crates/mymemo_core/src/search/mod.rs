//! Derived list views over a memo snapshot.
//!
//! # Responsibility
//! - Filter a snapshot by text query and category.
//! - Order results pinned-first, newest-first.
//! - Derive the category universe shown as filter chips.
//!
//! # Invariants
//! - Pure functions: no persistence, no mutation of the input snapshot.

pub mod filter;
