//! JSON codec for the persisted memo collection.
//!
//! # Invariants
//! - Decoding never drops records: any malformed element fails the whole blob.
//! - Decoded collections satisfy memo-id and per-memo image-id uniqueness.
//! - A zero-length value decodes as an empty collection, same as an absent key.

use crate::model::memo::MemoRecord;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why a persisted collection could not be turned back into records.
#[derive(Debug)]
pub enum DecodeError {
    /// Bytes are not a JSON array of memo objects.
    Json(serde_json::Error),
    /// Shape is valid but identity invariants are broken.
    InvalidData(String),
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed memo collection: {err}"),
            Self::InvalidData(message) => write!(f, "invalid memo collection: {message}"),
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

/// Serializes the full collection as a JSON array.
pub fn encode_memos(memos: &[MemoRecord]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(memos)
}

/// Parses a persisted blob and checks identity invariants.
pub fn decode_memos(bytes: &[u8]) -> Result<Vec<MemoRecord>, DecodeError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let memos: Vec<MemoRecord> = serde_json::from_slice(bytes).map_err(DecodeError::Json)?;
    check_identity(&memos)?;
    Ok(memos)
}

/// Verifies memo ids are unique and image ids are unique per memo.
pub fn check_identity(memos: &[MemoRecord]) -> Result<(), DecodeError> {
    let mut memo_ids = HashSet::with_capacity(memos.len());
    for memo in memos {
        if !memo_ids.insert(memo.id.as_str()) {
            return Err(DecodeError::InvalidData(format!(
                "duplicate memo id `{}`",
                memo.id
            )));
        }

        let mut image_ids = HashSet::with_capacity(memo.images.len());
        for image in &memo.images {
            if !image_ids.insert(image.id.as_str()) {
                return Err(DecodeError::InvalidData(format!(
                    "duplicate image id `{}` in memo `{}`",
                    image.id, memo.id
                )));
            }
        }
    }
    Ok(())
}
