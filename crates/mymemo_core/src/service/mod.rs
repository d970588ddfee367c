//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and derived views into use-case APIs.
//! - Keep host/FFI layers decoupled from storage and codec details.

pub mod memo_service;
pub mod selection;
