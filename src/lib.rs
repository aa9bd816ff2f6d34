//! Mini Cache - A lightweight in-process key/value cache
//!
//! Provides bounded memory use through LRU eviction, TTL expiration checked
//! on read, and a background sweep that reclaims expired entries.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats, DebugSnapshot};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
