//! Memo domain model.
//!
//! # Responsibility
//! - Define the canonical memo record and its image attachments.
//! - Define create/update inputs and the non-empty validation rule.
//!
//! # Invariants
//! - `id` is stable and never reused for another memo.
//! - `timestamp` is assigned once at creation and never rewritten by updates.
//! - Image ids are unique within one memo's `images` list.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one memo.
///
/// Kept as plain text because persisted collections may carry ids minted by
/// earlier app versions that are not UUIDs.
pub type MemoId = String;

/// Identifier of an image attachment, unique within its owning memo.
pub type ImageId = String;

/// Validation failures for memo create/update targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoValidationError {
    /// Title, content, category and images are all empty.
    EmptyMemo,
    /// Two attachments in one memo share the same id.
    DuplicateImageId(ImageId),
}

impl Display for MemoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMemo => write!(
                f,
                "memo must have a title, content, category or at least one image"
            ),
            Self::DuplicateImageId(id) => write!(f, "duplicate image id `{id}` in memo"),
        }
    }
}

impl Error for MemoValidationError {}

/// Reference to externally owned image bytes plus a caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// Opaque location of the image; never dereferenced by core.
    pub uri: String,
    /// Free-form caption, empty when untagged.
    #[serde(default)]
    pub tag: String,
    pub id: ImageId,
}

impl ImageAttachment {
    /// Wraps a picked image uri with a freshly generated id and empty tag.
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            tag: String::new(),
            id: Uuid::new_v4().to_string(),
        }
    }
}

/// One result returned by the host image picker or camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedImage {
    pub uri: String,
}

impl From<PickedImage> for ImageAttachment {
    fn from(value: PickedImage) -> Self {
        ImageAttachment::from_uri(value.uri)
    }
}

/// Canonical persisted memo record.
///
/// Field names follow the camelCase blob schema shared with the host app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoRecord {
    pub id: MemoId,
    pub title: String,
    pub content: String,
    /// Empty means uncategorized.
    pub category: String,
    /// Display order is list order.
    #[serde(default)]
    pub images: Vec<ImageAttachment>,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
    /// Pin flag; pinned memos sort first.
    #[serde(default)]
    pub is_liked: bool,
}

impl MemoRecord {
    /// Builds a new record from a draft with a generated id.
    pub fn from_draft(draft: MemoDraft, timestamp: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            content: draft.content,
            category: draft.category,
            images: draft.images,
            timestamp,
            is_liked: false,
        }
    }

    /// Returns whether every user-authored field is empty.
    pub fn is_empty(&self) -> bool {
        is_blank(&self.title, &self.content, &self.category, &self.images)
    }

    /// Checks the create/update preconditions for this record.
    pub fn validate(&self) -> Result<(), MemoValidationError> {
        if self.is_empty() {
            return Err(MemoValidationError::EmptyMemo);
        }
        ensure_unique_image_ids(&self.images)
    }

    /// Finds one attachment by id.
    pub fn image(&self, image_id: &str) -> Option<&ImageAttachment> {
        self.images.iter().find(|image| image.id == image_id)
    }

    fn image_mut(&mut self, image_id: &str) -> Option<&mut ImageAttachment> {
        self.images.iter_mut().find(|image| image.id == image_id)
    }

    /// Appends attachments after the existing ones, keeping their order.
    ///
    /// Nothing is appended when any incoming id collides.
    pub fn append_images(
        &mut self,
        images: Vec<ImageAttachment>,
    ) -> Result<(), MemoValidationError> {
        let mut seen: HashSet<&str> = self.images.iter().map(|image| image.id.as_str()).collect();
        for image in &images {
            if !seen.insert(image.id.as_str()) {
                return Err(MemoValidationError::DuplicateImageId(image.id.clone()));
            }
        }
        self.images.extend(images);
        Ok(())
    }

    /// Removes one attachment; returns whether anything was removed.
    pub fn remove_image(&mut self, image_id: &str) -> bool {
        let before = self.images.len();
        self.images.retain(|image| image.id != image_id);
        self.images.len() != before
    }

    /// Replaces an attachment caption; returns `false` if the id is unknown.
    pub fn retag_image(&mut self, image_id: &str, tag: impl Into<String>) -> bool {
        match self.image_mut(image_id) {
            Some(image) => {
                image.tag = tag.into();
                true
            }
            None => false,
        }
    }

    /// Applies present patch fields; absent fields keep prior values.
    pub fn apply_patch(&mut self, patch: MemoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(is_liked) = patch.is_liked {
            self.is_liked = is_liked;
        }
    }
}

/// Input for creating a memo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    pub images: Vec<ImageAttachment>,
}

impl MemoDraft {
    /// Returns a copy with surrounding whitespace removed from text fields.
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            category: self.category.trim().to_string(),
            images: self.images,
        }
    }

    pub fn is_empty(&self) -> bool {
        is_blank(&self.title, &self.content, &self.category, &self.images)
    }
}

/// Partial update for a memo. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub images: Option<Vec<ImageAttachment>>,
    pub is_liked: Option<bool>,
}

impl MemoPatch {
    /// Returns a copy with present text fields trimmed.
    pub fn trimmed(self) -> Self {
        let trim = |value: Option<String>| value.map(|text| text.trim().to_string());
        Self {
            title: trim(self.title),
            content: trim(self.content),
            category: trim(self.category),
            images: self.images,
            is_liked: self.is_liked,
        }
    }

    /// Returns whether the patch carries only the pin flag.
    pub fn is_pin_only(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.images.is_none()
    }
}

fn is_blank(title: &str, content: &str, category: &str, images: &[ImageAttachment]) -> bool {
    title.trim().is_empty()
        && content.trim().is_empty()
        && category.trim().is_empty()
        && images.is_empty()
}

fn ensure_unique_image_ids(images: &[ImageAttachment]) -> Result<(), MemoValidationError> {
    let mut seen = HashSet::with_capacity(images.len());
    for image in images {
        if !seen.insert(image.id.as_str()) {
            return Err(MemoValidationError::DuplicateImageId(image.id.clone()));
        }
    }
    Ok(())
}
