//! Cache Store Module
//!
//! Concurrent mapping from key to [`CacheEntry`]. The store is the single
//! source of truth for cached data; policy decisions (expiration, capacity)
//! are made by the caller.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::time::Instant;

use crate::cache::CacheEntry;

// == Access Outcome ==
/// Result of [`CacheStore::access`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access<V> {
    /// Entry found and fresh; its access stamp was updated
    Hit(V),
    /// Entry found but the staleness predicate held; left untouched
    Stale,
    /// No entry for the key
    Missing,
}

// == Cache Store ==
/// Sharded concurrent storage backed by `DashMap`.
///
/// Operations on distinct keys never contend on a global lock. Shard guards
/// are released before any method returns.
#[derive(Debug)]
pub struct CacheStore<K, V>
where
    K: Eq + Hash,
{
    /// Key-value storage
    entries: DashMap<K, CacheEntry<V>>,
    /// Source of access sequence numbers
    ticks: AtomicU64,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            ticks: AtomicU64::new(0),
        }
    }

    fn next_tick(&self) -> u64 {
        self.ticks.fetch_add(1, Ordering::Relaxed)
    }

    // == Get ==
    /// Returns a copy of the entry for `key`, without touching it.
    pub fn get(&self, key: &K) -> Option<CacheEntry<V>>
    where
        V: Clone,
    {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    // == Access ==
    /// Reads `key`, stamping the access unless `is_stale` holds for the entry.
    ///
    /// Staleness is checked under the shard lock, so a hit never returns an
    /// entry the predicate would reject.
    pub fn access<F>(&self, key: &K, now: Instant, is_stale: F) -> Access<V>
    where
        V: Clone,
        F: FnOnce(&CacheEntry<V>) -> bool,
    {
        let Some(mut slot) = self.entries.get_mut(key) else {
            return Access::Missing;
        };
        if is_stale(slot.value()) {
            return Access::Stale;
        }
        let tick = self.next_tick();
        slot.record_access(now, tick);
        Access::Hit(slot.value().value().clone())
    }

    // == Put ==
    /// Inserts or replaces the entry for `key` unconditionally.
    ///
    /// Returns the prior entry, if any. Capacity is not checked here.
    pub fn put(&self, key: K, value: V) -> Option<CacheEntry<V>> {
        let entry = CacheEntry::new(value, self.next_tick());
        self.entries.insert(key, entry)
    }

    // == Replace Existing ==
    /// Replaces the entry for `key` only if one is present.
    ///
    /// Returns `None` on success, or hands `value` back when the key is absent.
    pub fn replace_existing(&self, key: &K, value: V) -> Option<V> {
        match self.entries.get_mut(key) {
            Some(mut slot) => {
                *slot = CacheEntry::new(value, self.next_tick());
                None
            }
            None => Some(value),
        }
    }

    // == Remove ==
    /// Removes and returns the entry for `key`.
    pub fn remove(&self, key: &K) -> Option<CacheEntry<V>> {
        self.entries.remove(key).map(|(_, entry)| entry)
    }

    /// Removes the entry for `key` only if `predicate` holds, atomically.
    ///
    /// Concurrent callers racing on the same entry see at most one success.
    pub fn remove_if<F>(&self, key: &K, predicate: F) -> Option<CacheEntry<V>>
    where
        F: FnOnce(&CacheEntry<V>) -> bool,
    {
        self.entries
            .remove_if(key, |_, entry| predicate(entry))
            .map(|(_, entry)| entry)
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    // == Snapshots ==
    /// Copies every `(key, entry)` pair.
    ///
    /// Not atomic across shards: concurrent writers may or may not be seen.
    pub fn snapshot_entries(&self) -> Vec<(K, CacheEntry<V>)>
    where
        V: Clone,
    {
        self.entries
            .iter()
            .map(|item| (item.key().clone(), item.value().clone()))
            .collect()
    }

    /// Collects the keys whose entries satisfy `predicate`.
    pub fn keys_matching<F>(&self, mut predicate: F) -> Vec<K>
    where
        F: FnMut(&CacheEntry<V>) -> bool,
    {
        self.entries
            .iter()
            .filter(|item| predicate(item.value()))
            .map(|item| item.key().clone())
            .collect()
    }

    /// Visits every entry without cloning values.
    ///
    /// `visit` runs under a shard read lock and must not call back into the store.
    pub fn scan<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &CacheEntry<V>),
    {
        for item in self.entries.iter() {
            visit(item.key(), item.value());
        }
    }
}

impl<K, V> Default for CacheStore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
