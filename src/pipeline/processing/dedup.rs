use std::collections::HashSet;

use crate::types::{DedupKey, EventRecord};

/// First-wins deduplication over one run. A fresh instance is created per run so
/// nothing leaks between concurrent or successive invocations.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<DedupKey>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the record is the first of its key.
    pub fn insert(&mut self, record: &EventRecord) -> bool {
        self.seen.insert(record.dedup_key())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
