//! In-memory durable store backend.
//!
//! This module provides:
//! - [`MemoryStore`] — a lock-protected deque implementing [`DurableStore`],
//!   for tests and ephemeral embedding.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::error::Result;
use crate::traits::DurableStore;

/// An in-memory [`DurableStore`].
///
/// Nothing survives a restart; this backend exists for unit tests and for
/// embedders that want journal semantics without persistence.
///
/// # Example
///
/// ```rust
/// use ebb_store::{DurableStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.append(&["a".to_string(), "b".to_string()]).unwrap();
/// assert_eq!(store.len(), 2);
/// assert_eq!(store.oldest().as_deref(), Some("a"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<VecDeque<String>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with records, oldest first.
    ///
    /// Useful for testing recovery and retention scenarios.
    #[must_use]
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            records: Mutex::new(records.into_iter().collect()),
        }
    }
}

impl DurableStore for MemoryStore {
    fn append(&self, records: &[String]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut guard = self.records.lock();
        guard.extend(records.iter().cloned());
        Ok(())
    }

    fn remove_oldest(&self, count: usize) -> Result<usize> {
        let mut guard = self.records.lock();
        let removed = count.min(guard.len());
        for _ in 0..removed {
            guard.pop_front();
        }
        Ok(removed)
    }

    fn len(&self) -> usize {
        self.records.lock().len()
    }

    fn oldest(&self) -> Option<String> {
        self.records.lock().front().cloned()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = String> + '_> {
        Box::new(MemoryIter {
            records: &self.records,
            pos: 0,
        })
    }
}

/// Index-walking iterator that locks per step and fails closed.
///
/// Concurrent removals shift positions, so a step may skip records; once the
/// position passes the end the iterator stays finished.
struct MemoryIter<'a> {
    records: &'a Mutex<VecDeque<String>>,
    pos: usize,
}

impl Iterator for MemoryIter<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let guard = self.records.lock();
        let record = guard.get(self.pos).cloned()?;
        self.pos += 1;
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn record(n: usize) -> String {
        format!("record-{n}")
    }

    // ========================================================================
    // Basic operations
    // ========================================================================

    #[test]
    fn append_preserves_order() {
        let store = MemoryStore::new();
        store.append(&[record(1), record(2), record(3)]).unwrap();

        let collected: Vec<String> = store.iter().collect();
        assert_eq!(collected, vec![record(1), record(2), record(3)]);
    }

    #[test]
    fn append_empty_batch_is_noop() {
        let store = MemoryStore::new();
        store.append(&[]).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn remove_oldest_removes_from_front() {
        let store = MemoryStore::with_records((0..5).map(record));

        let removed = store.remove_oldest(2).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 3);
        assert_eq!(store.oldest(), Some(record(2)));
    }

    #[test]
    fn remove_oldest_clamps_to_available() {
        let store = MemoryStore::with_records((0..3).map(record));
        let removed = store.remove_oldest(100).unwrap();
        assert_eq!(removed, 3);
        assert!(store.is_empty());
    }

    #[test]
    fn oldest_on_empty_store_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.oldest(), None);
    }

    // ========================================================================
    // Iteration under concurrent mutation
    // ========================================================================

    #[test]
    fn iterator_ends_cleanly_when_records_removed_mid_scan() {
        let store = MemoryStore::with_records((0..10).map(record));

        let mut iter = store.iter();
        assert_eq!(iter.next(), Some(record(0)));

        // Shrink the store below the iterator's position.
        store.remove_oldest(9).unwrap();
        assert_eq!(store.len(), 1);

        // Position 1 is now past the end; the iterator finishes without
        // panicking or repeating.
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn iterator_sees_concurrent_appends() {
        let store = MemoryStore::with_records((0..2).map(record));

        let mut iter = store.iter();
        assert_eq!(iter.next(), Some(record(0)));
        store.append(&[record(2)]).unwrap();
        assert_eq!(iter.next(), Some(record(1)));
        assert_eq!(iter.next(), Some(record(2)));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn concurrent_appends_from_multiple_threads_all_land() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();

        for t in 0..4 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    store.append(&[format!("t{t}-{i}")]).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 200);
    }
}
