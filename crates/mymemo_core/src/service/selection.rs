//! Multi-select state for batch actions on the memo list.

use crate::model::memo::MemoId;
use std::collections::HashSet;

/// Memo ids picked in multi-select mode, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoSelection {
    ids: Vec<MemoId>,
}

impl MemoSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the id if unselected, unselects it otherwise.
    ///
    /// Returns whether the id is selected afterwards.
    pub fn toggle(&mut self, id: impl Into<MemoId>) -> bool {
        let id = id.into();
        match self.ids.iter().position(|selected| *selected == id) {
            Some(index) => {
                self.ids.remove(index);
                false
            }
            None => {
                self.ids.push(id);
                true
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Selected ids in pick order.
    pub fn ids(&self) -> &[MemoId] {
        &self.ids
    }

    pub fn to_id_set(&self) -> HashSet<MemoId> {
        self.ids.iter().cloned().collect()
    }
}
