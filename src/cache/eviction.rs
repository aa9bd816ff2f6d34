//! LRU Eviction Module
//!
//! Selects the victim to remove when the store is at capacity. Entries are
//! ranked by last access time (reads refresh it), not by insertion time.

use std::hash::Hash;

use crate::cache::CacheStore;

// == LRU Eviction ==
/// Least-recently-used victim selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct LruEviction;

impl LruEviction {
    pub fn new() -> Self {
        Self
    }

    // == Select Victim ==
    /// Returns the key with the oldest `(last_accessed_at, access_tick)`.
    ///
    /// Ticks are unique per store, so exactly one key wins. Returns None if
    /// the store is empty.
    pub fn select_victim<K, V>(&self, store: &CacheStore<K, V>) -> Option<K>
    where
        K: Eq + Hash + Clone,
    {
        let mut oldest = None;
        store.scan(|key, entry| {
            let recency = entry.recency();
            match &oldest {
                Some((_, best)) if *best <= recency => {}
                _ => oldest = Some((key.clone(), recency)),
            }
        });
        oldest.map(|(key, _)| key)
    }
}
