//! Concurrent per-key state storage.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use super::descriptor::PartitionKey;

/// A concurrency-safe map from partition key to per-key state.
///
/// Entries are created lazily on first sight. The map's entry API gives
/// atomic compute-if-absent semantics, so exactly one state object wins
/// when several threads race on a new key. Each entry carries its own
/// mutex: decisions for one key serialize on that mutex and never contend
/// with decisions for other keys.
pub(crate) struct KeyedStore<S> {
    entries: DashMap<PartitionKey, Arc<Mutex<S>>>,
}

impl<S> KeyedStore<S> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Get the state handle for a key, creating it with `init` on first sight.
    pub fn get_or_create(&self, key: &PartitionKey, init: impl FnOnce() -> S) -> Arc<Mutex<S>> {
        if let Some(entry) = self.entries.get(key) {
            return Arc::clone(entry.value());
        }
        Arc::clone(
            self.entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(init())))
                .value(),
        )
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop entries whose state fails the predicate. Returns how many were
    /// dropped.
    pub fn retain(&self, mut keep: impl FnMut(&S) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, state| keep(&state.lock()));
        before.saturating_sub(self.entries.len())
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
