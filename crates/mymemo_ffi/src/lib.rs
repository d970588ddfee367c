//! Flutter bridge for the MyMemo core.

pub mod api;
