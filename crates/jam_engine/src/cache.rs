use std::collections::HashMap;

use crate::{PageKey, PagePayload};

/// Fetched pages keyed by `(collection, offset, page_size)`.
///
/// Invalidation works per collection: every page of it is dropped so the
/// next read of any of them goes to the backend.
#[derive(Debug, Default)]
pub struct PageCache {
    entries: HashMap<PageKey, PagePayload>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PageKey) -> Option<&PagePayload> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: PageKey, page: PagePayload) {
        self.entries.insert(key, page);
    }

    /// Returns how many pages were dropped.
    pub fn invalidate_collection(&mut self, collection_id: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|key, _| key.collection_id != collection_id);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
