//! Configuration Module
//!
//! Handles the static parameters a cache is constructed with. Values can be
//! assembled with the fluent builder or loaded from environment variables;
//! either way they are validated once and never change afterwards.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::error::{CacheError, Result};

/// Default time-to-live for entries
pub const DEFAULT_TTL: Duration = Duration::from_millis(60_000);

/// Default number of entries held before LRU eviction kicks in
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Default period between background sweeps
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_millis(10_000);

/// Receives human-readable lifecycle and debug messages.
pub type DebugCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Receives every policy-driven removal (capacity eviction or expiration sweep).
pub type EvictionCallback<K, V> = Arc<dyn Fn(&K, &V) + Send + Sync>;

/// Cache configuration parameters.
pub struct CacheConfig<K, V> {
    /// Entries older than this are expired
    pub ttl: Duration,
    /// Capacity before LRU eviction triggers
    pub max_size: usize,
    /// Sweep period for the background cleanup task
    pub cleanup_interval: Duration,
    /// Whether the cleanup task starts at construction
    pub auto_cleanup: bool,
    /// Whether expiration discovered by `get` also fires the eviction callback
    pub notify_on_lazy_expiration: bool,
    /// Lifecycle message sink
    pub debug_callback: Option<DebugCallback>,
    /// Policy-driven removal observer
    pub eviction_callback: Option<EvictionCallback<K, V>>,
}

impl<K, V> CacheConfig<K, V> {
    /// Returns a builder seeded with the default configuration.
    pub fn builder() -> CacheConfigBuilder<K, V> {
        CacheConfigBuilder::new()
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// Unset variables fall back to their defaults. Unparsable ones do too,
    /// with a warning. Boolean flags accept only `true` or `false`. Callbacks
    /// cannot come from the environment and start out unset.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - Entry time-to-live in milliseconds (default: 60000)
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 100)
    /// - `CACHE_CLEANUP_INTERVAL_MS` - Sweep period in milliseconds (default: 10000)
    /// - `CACHE_AUTO_CLEANUP` - Start the background sweep (default: true)
    /// - `CACHE_NOTIFY_ON_LAZY_EXPIRATION` - Notify on read-time expiry (default: false)
    ///
    /// # Errors
    /// Returns `CacheError::InvalidConfig` if the resulting values are invalid.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            ttl: env_var("CACHE_TTL_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TTL),
            max_size: env_var("CACHE_MAX_SIZE").unwrap_or(DEFAULT_MAX_SIZE),
            cleanup_interval: env_var("CACHE_CLEANUP_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_CLEANUP_INTERVAL),
            auto_cleanup: env_var("CACHE_AUTO_CLEANUP").unwrap_or(true),
            notify_on_lazy_expiration: env_var("CACHE_NOTIFY_ON_LAZY_EXPIRATION")
                .unwrap_or(false),
            debug_callback: None,
            eviction_callback: None,
        };
        config.validate()?;
        Ok(config)
    }

    // == Validate ==
    /// Rejects configurations that would produce broken runtime behavior.
    ///
    /// # Errors
    /// Returns `CacheError::InvalidConfig` when `max_size` or `ttl` is zero, or
    /// when auto-cleanup is enabled with a zero sweep interval.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be greater than zero".to_string(),
            ));
        }
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "ttl must be greater than zero".to_string(),
            ));
        }
        if self.auto_cleanup && self.cleanup_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "cleanup_interval must be greater than zero when auto cleanup is enabled"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

fn env_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value {:?} for {}, using default", raw, name);
            None
        }
    }
}

impl<K, V> Default for CacheConfig<K, V> {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_size: DEFAULT_MAX_SIZE,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            auto_cleanup: true,
            notify_on_lazy_expiration: false,
            debug_callback: None,
            eviction_callback: None,
        }
    }
}

impl<K, V> Clone for CacheConfig<K, V> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            max_size: self.max_size,
            cleanup_interval: self.cleanup_interval,
            auto_cleanup: self.auto_cleanup,
            notify_on_lazy_expiration: self.notify_on_lazy_expiration,
            debug_callback: self.debug_callback.clone(),
            eviction_callback: self.eviction_callback.clone(),
        }
    }
}

impl<K, V> fmt::Debug for CacheConfig<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("ttl", &self.ttl)
            .field("max_size", &self.max_size)
            .field("cleanup_interval", &self.cleanup_interval)
            .field("auto_cleanup", &self.auto_cleanup)
            .field("notify_on_lazy_expiration", &self.notify_on_lazy_expiration)
            .field("debug_callback", &self.debug_callback.is_some())
            .field("eviction_callback", &self.eviction_callback.is_some())
            .finish()
    }
}

// == Builder ==
/// Fluent builder for [`CacheConfig`].
pub struct CacheConfigBuilder<K, V> {
    config: CacheConfig<K, V>,
}

impl<K, V> CacheConfigBuilder<K, V> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
        }
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = ttl;
        self
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.config.max_size = max_size;
        self
    }

    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.config.cleanup_interval = interval;
        self
    }

    pub fn auto_cleanup(mut self, enabled: bool) -> Self {
        self.config.auto_cleanup = enabled;
        self
    }

    pub fn notify_on_lazy_expiration(mut self, enabled: bool) -> Self {
        self.config.notify_on_lazy_expiration = enabled;
        self
    }

    /// Sets the sink for lifecycle/debug messages.
    pub fn debug_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.config.debug_callback = Some(Arc::new(callback));
        self
    }

    /// Sets the observer notified on every policy-driven removal.
    pub fn eviction_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&K, &V) + Send + Sync + 'static,
    {
        self.config.eviction_callback = Some(Arc::new(callback));
        self
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    /// Returns `CacheError::InvalidConfig` if validation fails.
    pub fn build(self) -> Result<CacheConfig<K, V>> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl<K, V> Default for CacheConfigBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
