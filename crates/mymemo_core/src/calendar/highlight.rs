//! Weekday highlight preference.

use super::{CalendarError, CalendarResult};
use std::collections::BTreeSet;

/// Weekdays highlighted by default (indices into a Sunday-first week).
pub const DEFAULT_HIGHLIGHTED_WEEKDAYS: [u8; 2] = [5, 6];

/// Set of weekday indices rendered in the alternate style.
///
/// Lives for one session only; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayHighlightSet {
    days: BTreeSet<u8>,
}

impl Default for DayHighlightSet {
    fn default() -> Self {
        Self {
            days: DEFAULT_HIGHLIGHTED_WEEKDAYS.into_iter().collect(),
        }
    }
}

impl DayHighlightSet {
    /// Set with nothing highlighted.
    pub fn empty() -> Self {
        Self {
            days: BTreeSet::new(),
        }
    }

    /// Builds a set from explicit indices, rejecting anything outside `0..=6`.
    pub fn from_indices(indices: impl IntoIterator<Item = u8>) -> CalendarResult<Self> {
        let mut set = Self::empty();
        for index in indices {
            set.days.insert(check_weekday(index)?);
        }
        Ok(set)
    }

    /// Adds the weekday if absent, removes it if present.
    ///
    /// Returns whether the weekday is highlighted afterwards.
    pub fn toggle(&mut self, index: u8) -> CalendarResult<bool> {
        let index = check_weekday(index)?;
        if self.days.remove(&index) {
            Ok(false)
        } else {
            self.days.insert(index);
            Ok(true)
        }
    }

    pub fn contains(&self, index: u8) -> bool {
        self.days.contains(&index)
    }

    /// Highlighted indices in ascending order.
    pub fn indices(&self) -> Vec<u8> {
        self.days.iter().copied().collect()
    }
}

fn check_weekday(index: u8) -> CalendarResult<u8> {
    if index > 6 {
        return Err(CalendarError::InvalidWeekday(index));
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::DayHighlightSet;
    use crate::calendar::CalendarError;

    #[test]
    fn default_highlights_five_and_six() {
        assert_eq!(DayHighlightSet::default().indices(), vec![5, 6]);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut set = DayHighlightSet::default();
        assert_eq!(set.toggle(0), Ok(true));
        assert!(set.contains(0));
        assert_eq!(set.toggle(6), Ok(false));
        assert_eq!(set.indices(), vec![0, 5]);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut set = DayHighlightSet::default();
        assert_eq!(set.toggle(7), Err(CalendarError::InvalidWeekday(7)));
        assert!(DayHighlightSet::from_indices([1, 9]).is_err());
    }
}
