//! Cache Entry Module
//!
//! Defines the structure for individual cache entries: an immutable value plus
//! the creation and last-access timestamps used by expiration and eviction.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single cache entry with value and access metadata.
///
/// Timestamps use `tokio::time::Instant` so paused test clocks apply.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value, never replaced in place
    value: V,
    /// Insertion time, set once
    created_at: Instant,
    /// Time of the most recent successful read (or insertion)
    last_accessed_at: Instant,
    /// Store-wide access sequence number, breaks timestamp ties
    access_tick: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry with `created_at = last_accessed_at = now`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `tick` - Access sequence number issued by the owning store
    pub fn new(value: V, tick: u64) -> Self {
        Self::at(value, Instant::now(), tick)
    }

    /// Creates a new entry stamped with an explicit instant.
    pub fn at(value: V, now: Instant, tick: u64) -> Self {
        Self {
            value,
            created_at: now,
            last_accessed_at: now,
            access_tick: tick,
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> Instant {
        self.last_accessed_at
    }

    pub fn access_tick(&self) -> u64 {
        self.access_tick
    }

    // == Record Access ==
    /// Stamps a successful read. The only mutation an entry ever sees.
    pub fn record_access(&mut self, now: Instant, tick: u64) {
        self.last_accessed_at = now;
        self.access_tick = tick;
    }

    /// Ranking key for least-recently-used ordering.
    pub fn recency(&self) -> (Instant, u64) {
        (self.last_accessed_at, self.access_tick)
    }

    // == Age ==
    /// Time elapsed since insertion, zero if `now` precedes it.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Time elapsed since the last successful read.
    pub fn idle(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_accessed_at)
    }
}
