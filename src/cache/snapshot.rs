//! Debug Snapshot Module
//!
//! Read-only views of the cache contents for observability.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::cache::CacheEntry;

/// Per-entry view: key and access recency, never the value.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySnapshot<K> {
    pub key: K,
    /// Wall-clock estimate of the last successful read
    pub last_accessed_at: DateTime<Utc>,
    /// Milliseconds since the last successful read
    pub idle_ms: u64,
    /// Milliseconds since insertion
    pub age_ms: u64,
}

/// Size plus one [`EntrySnapshot`] per entry, least recently accessed first.
#[derive(Debug, Clone, Serialize)]
pub struct DebugSnapshot<K> {
    pub size: usize,
    pub entries: Vec<EntrySnapshot<K>>,
}

impl<K> DebugSnapshot<K> {
    /// Builds a snapshot from copied store entries.
    pub fn from_entries<V>(entries: Vec<(K, CacheEntry<V>)>, now: Instant) -> Self {
        let wall_now = Utc::now();
        let mut entries = entries;
        entries.sort_by_key(|(_, entry)| entry.recency());

        let entries: Vec<EntrySnapshot<K>> = entries
            .into_iter()
            .map(|(key, entry)| {
                let idle = entry.idle(now);
                EntrySnapshot {
                    key,
                    last_accessed_at: wall_now - to_chrono(idle),
                    idle_ms: millis(idle),
                    age_ms: millis(entry.age(now)),
                }
            })
            .collect();

        Self {
            size: entries.len(),
            entries,
        }
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero())
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
