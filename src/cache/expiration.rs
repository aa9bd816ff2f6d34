//! Expiration Policy Module
//!
//! Decides whether an entry is stale. TTL is fixed per cache instance and is
//! measured from creation, regardless of how recently the entry was read.

use std::time::Duration;

use tokio::time::Instant;

use crate::cache::CacheEntry;

/// Returns true once strictly more than `ttl` has elapsed since `entry` was created.
pub fn is_expired<V>(entry: &CacheEntry<V>, ttl: Duration, now: Instant) -> bool {
    entry.age(now) > ttl
}

// == Expiration Policy ==
/// Per-instance TTL policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPolicy {
    ttl: Duration,
}

impl ExpirationPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_expired<V>(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        is_expired(entry, self.ttl, now)
    }
}
