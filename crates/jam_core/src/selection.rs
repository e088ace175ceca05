//! Cross-page record selection.
//!
//! The table widget only knows which of its visible rows are checked. Its
//! report is merged into the global set through a window membership test, so
//! selections made on other pages survive page navigation.
use std::collections::BTreeSet;

use jam_logging::jam_debug;

use crate::{PageWindow, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    ids: BTreeSet<RecordId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
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

    pub fn iter(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.ids.iter().copied()
    }

    /// Ascending ids, the payload of a bulk mutation.
    pub fn to_vec(&self) -> Vec<RecordId> {
        self.iter().collect()
    }

    pub fn in_window(&self, window: PageWindow) -> Vec<RecordId> {
        self.iter().filter(|id| window.contains(*id)).collect()
    }
}

impl FromIterator<RecordId> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = RecordId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Merges the widget's report for the visible page into `previous`.
///
/// Reported ids inside the window are added, selected ids inside the window
/// missing from the report are removed, and everything outside the window is
/// left alone, including reported ids the widget cannot actually be showing.
pub fn reconcile_page(
    previous: &SelectionSet,
    window: PageWindow,
    reported: &[RecordId],
) -> SelectionSet {
    let mut result = previous.clone();

    for &id in reported {
        if window.contains(id) {
            result.ids.insert(id);
        } else {
            jam_debug!(
                "Ignoring reported selection {} outside window ({}, {}]",
                id,
                window.offset,
                window.offset.saturating_add(window.page_size)
            );
        }
    }

    result
        .ids
        .retain(|id| !window.contains(*id) || reported.contains(id));

    debug_assert!(window_rules_hold(previous, window, reported, &result));
    result
}

fn window_rules_hold(
    previous: &SelectionSet,
    window: PageWindow,
    reported: &[RecordId],
    result: &SelectionSet,
) -> bool {
    let off_window_kept = previous
        .iter()
        .filter(|id| !window.contains(*id))
        .eq(result.iter().filter(|id| !window.contains(*id)));
    let expected: BTreeSet<RecordId> = reported
        .iter()
        .copied()
        .filter(|id| window.contains(*id))
        .collect();
    let in_window: BTreeSet<RecordId> = result.in_window(window).into_iter().collect();
    off_window_kept && in_window == expected
}
