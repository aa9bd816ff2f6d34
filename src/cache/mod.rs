//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod eviction;
mod expiration;
mod facade;
mod snapshot;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use eviction::LruEviction;
pub use expiration::{is_expired, ExpirationPolicy};
pub use facade::Cache;
pub use snapshot::{DebugSnapshot, EntrySnapshot};
pub use stats::{CacheStats, StatsRecorder};
pub use store::{Access, CacheStore};
