//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Cache misses are not
//! errors: lookups return `None` instead.

use thiserror::Error;
use tokio::task::JoinError;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Background cleanup was requested outside of a tokio runtime
    #[error("Runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    /// An offloaded cache operation panicked or was cancelled
    #[error("Task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
