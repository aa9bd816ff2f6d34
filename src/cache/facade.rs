//! Cache Facade Module
//!
//! The public operation surface. Every operation exists in a blocking form
//! and an asynchronous form with identical semantics; the asynchronous forms
//! hand the same logic to tokio's blocking pool.
//!
//! # Notifications
//! The eviction callback fires exactly once for every policy-driven removal:
//! capacity eviction during `put` and expiration found by a sweep. Explicit
//! `remove` and `clear` never fire it. Expiration found by `get` fires it only
//! when `notify_on_lazy_expiration` is enabled.
//!
//! Callbacks run synchronously on whichever thread triggered them. Eviction
//! callbacks fired by `put` run while the insert lock is held, so calling
//! back into the cache from a callback is unsupported.
//!
//! # Get-or-populate
//! `get_or_populate` and its variants give no single-flight guarantee:
//! concurrent callers missing the same key may each run their compute
//! function, and the last `put` wins. Callers needing at most one computation
//! per key must coordinate themselves.

use std::convert::Infallible;
use std::fmt::{self, Debug};
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::{
    Access, CacheStats, CacheStore, DebugSnapshot, ExpirationPolicy, LruEviction, StatsRecorder,
};
use crate::config::{CacheConfig, DebugCallback, EvictionCallback};
use crate::error::{CacheError, Result};
use crate::tasks::{CleanupScheduler, Sweep};

// == Shared State ==
/// State shared by every handle of one cache and by its cleanup task.
struct Shared<K, V>
where
    K: Eq + Hash,
{
    store: CacheStore<K, V>,
    expiration: ExpirationPolicy,
    eviction: LruEviction,
    max_size: usize,
    /// Serializes the check-evict-insert path for new keys
    insert_lock: Mutex<()>,
    stats: StatsRecorder,
    notify_on_lazy_expiration: bool,
    debug_callback: Option<DebugCallback>,
    eviction_callback: Option<EvictionCallback<K, V>>,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn trace(&self, message: fmt::Arguments<'_>) {
        debug!("{}", message);
        if let Some(callback) = &self.debug_callback {
            callback(&message.to_string());
        }
    }

    fn notify_evicted(&self, key: &K, value: &V) {
        if let Some(callback) = &self.eviction_callback {
            callback(key, value);
        }
    }

    // == Put ==
    fn put(&self, key: K, value: V) {
        // Overwrites never grow the store and skip the insert lock
        let Some(value) = self.store.replace_existing(&key, value) else {
            self.trace(format_args!("Replaced entry for key {:?}", key));
            return;
        };

        let _guard = self.insert_lock.lock();
        if !self.store.contains_key(&key) {
            self.evict_for_insert();
        }
        self.trace(format_args!("Inserted entry for key {:?}", key));
        self.store.put(key, value);
    }

    // == Evict For Insert ==
    /// Makes room for one new key. Caller holds the insert lock.
    fn evict_for_insert(&self) {
        while self.store.len() >= self.max_size {
            let Some(victim) = self.eviction.select_victim(&self.store) else {
                break;
            };
            // The victim may have been removed concurrently; loop and re-check
            if let Some(entry) = self.store.remove(&victim) {
                self.stats.record_eviction();
                self.trace(format_args!(
                    "Evicted least recently used key {:?}",
                    victim
                ));
                self.notify_evicted(&victim, entry.value());
            }
        }
    }

    // == Get ==
    fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        match self
            .store
            .access(key, now, |entry| self.expiration.is_expired(entry, now))
        {
            Access::Hit(value) => {
                self.stats.record_hit();
                Some(value)
            }
            Access::Stale => {
                self.expire_on_read(key, now);
                self.stats.record_miss();
                None
            }
            Access::Missing => {
                self.stats.record_miss();
                None
            }
        }
    }

    fn expire_on_read(&self, key: &K, now: Instant) {
        let removed = self
            .store
            .remove_if(key, |entry| self.expiration.is_expired(entry, now));
        if let Some(entry) = removed {
            self.stats.record_expiration();
            self.trace(format_args!("Expired key {:?} on read", key));
            if self.notify_on_lazy_expiration {
                self.notify_evicted(key, entry.value());
            }
        }
    }

    fn contains_key(&self, key: &K) -> bool {
        let now = Instant::now();
        self.store
            .get(key)
            .is_some_and(|entry| !self.expiration.is_expired(&entry, now))
    }

    // == Remove ==
    fn remove(&self, key: &K) -> Option<V> {
        let removed = self.store.remove(key)?;
        self.trace(format_args!("Removed key {:?}", key));
        Some(removed.into_value())
    }

    // == Clear ==
    fn clear(&self) {
        let count = self.store.len();
        self.store.clear();
        self.trace(format_args!("Cleared {} entries", count));
    }

    // == Purge Expired ==
    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let expired = self
            .store
            .keys_matching(|entry| self.expiration.is_expired(entry, now));

        let mut removed = 0;
        for key in expired {
            // Re-check under the shard lock: the key may have been replaced
            let entry = self
                .store
                .remove_if(&key, |entry| self.expiration.is_expired(entry, now));
            if let Some(entry) = entry {
                removed += 1;
                self.stats.record_expiration();
                self.trace(format_args!("Swept expired key {:?}", key));
                self.notify_evicted(&key, entry.value());
            }
        }
        removed
    }
}

impl<K, V> Sweep for Shared<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn sweep(&self) -> usize {
        self.purge_expired()
    }
}

// == Cache ==
/// In-process key/value cache with TTL expiration, LRU eviction and an
/// optional background sweep.
///
/// Cloning is cheap and every clone shares the same entries. The background
/// sweep stops when the last clone is dropped, or earlier via
/// [`stop_cleanup`](Cache::stop_cleanup).
///
/// By default an entry found expired by `get` is dropped without notifying
/// the eviction callback; only the sweep reports it. Enable
/// `notify_on_lazy_expiration` to have whichever of `get` or the sweep
/// removes the entry first fire the callback.
///
/// # Example
/// ```
/// use mini_cache::{Cache, CacheConfig};
///
/// let config = CacheConfig::builder().max_size(2).auto_cleanup(false).build()?;
/// let cache: Cache<String, u32> = Cache::new(config)?;
///
/// cache.put("a".to_string(), 1);
/// assert_eq!(cache.get(&"a".to_string()), Some(1));
/// assert_eq!(cache.get_or_populate("b".to_string(), || Some(2)), Some(2));
/// # Ok::<(), mini_cache::error::CacheError>(())
/// ```
pub struct Cache<K, V>
where
    K: Eq + Hash,
{
    shared: Arc<Shared<K, V>>,
    cleanup: Arc<CleanupScheduler>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache from a validated configuration.
    ///
    /// When auto-cleanup is enabled the sweep task is spawned on the current
    /// tokio runtime.
    ///
    /// # Errors
    /// - `CacheError::InvalidConfig` if the configuration is invalid
    /// - `CacheError::RuntimeUnavailable` if auto-cleanup is enabled outside a runtime
    pub fn new(config: CacheConfig<K, V>) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(Shared {
            store: CacheStore::new(),
            expiration: ExpirationPolicy::new(config.ttl),
            eviction: LruEviction::new(),
            max_size: config.max_size,
            insert_lock: Mutex::new(()),
            stats: StatsRecorder::new(),
            notify_on_lazy_expiration: config.notify_on_lazy_expiration,
            debug_callback: config.debug_callback,
            eviction_callback: config.eviction_callback,
        });

        let cleanup = if config.auto_cleanup {
            let runtime = Handle::try_current()
                .map_err(|e| CacheError::RuntimeUnavailable(e.to_string()))?;
            let target: Arc<dyn Sweep> = shared.clone();
            CleanupScheduler::start(target, config.cleanup_interval, &runtime)
        } else {
            CleanupScheduler::disabled()
        };

        info!(
            "Cache created: max_size={}, ttl={}ms, auto_cleanup={}",
            config.max_size,
            config.ttl.as_millis(),
            config.auto_cleanup
        );
        shared.trace(format_args!(
            "Cache created with max_size={} ttl={:?} cleanup_interval={:?} auto_cleanup={}",
            config.max_size, config.ttl, config.cleanup_interval, config.auto_cleanup
        ));

        Ok(Self {
            shared,
            cleanup: Arc::new(cleanup),
        })
    }

    // == Put ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// Inserting a new key into a full cache first evicts the least recently
    /// accessed entry and notifies the eviction callback. Replacing an
    /// existing key never evicts.
    pub fn put(&self, key: K, value: V) {
        self.shared.put(key, value);
    }

    // == Get ==
    /// Returns the value for `key` if present and not expired.
    ///
    /// A hit refreshes the entry's last access time. An expired entry is
    /// removed and reported as a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        self.shared.get(key)
    }

    /// Returns true if `key` has a live entry. Does not count as an access.
    pub fn contains_key(&self, key: &K) -> bool {
        self.shared.contains_key(key)
    }

    // == Remove ==
    /// Removes `key`, returning its value. Does not notify the eviction callback.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.shared.remove(key)
    }

    // == Clear ==
    /// Removes every entry. Does not notify the eviction callback.
    pub fn clear(&self) {
        self.shared.clear();
    }

    // == Get Or Populate ==
    /// Returns the cached value, or computes, stores and returns a new one.
    ///
    /// If `compute` returns `None` nothing is cached and `None` is returned.
    pub fn get_or_populate<F>(&self, key: K, compute: F) -> Option<V>
    where
        F: FnOnce() -> Option<V>,
    {
        match self.try_get_or_populate(key, || Ok::<_, Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`get_or_populate`](Cache::get_or_populate).
    ///
    /// # Errors
    /// Errors from `compute` are returned unchanged; nothing is cached.
    pub fn try_get_or_populate<F, E>(&self, key: K, compute: F) -> std::result::Result<Option<V>, E>
    where
        F: FnOnce() -> std::result::Result<Option<V>, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(Some(value));
        }

        let Some(value) = compute()? else {
            return Ok(None);
        };
        self.put(key, value.clone());
        Ok(Some(value))
    }

    // == Async Variants ==
    /// Asynchronous [`put`](Cache::put).
    ///
    /// # Errors
    /// Returns `CacheError::TaskFailed` if the offloaded task did not complete.
    pub async fn put_async(&self, key: K, value: V) -> Result<()> {
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || shared.put(key, value)).await?;
        Ok(())
    }

    /// Asynchronous [`get`](Cache::get).
    ///
    /// # Errors
    /// Returns `CacheError::TaskFailed` if the offloaded task did not complete.
    pub async fn get_async(&self, key: K) -> Result<Option<V>> {
        let shared = Arc::clone(&self.shared);
        let value = tokio::task::spawn_blocking(move || shared.get(&key)).await?;
        Ok(value)
    }

    /// Asynchronous [`remove`](Cache::remove).
    ///
    /// # Errors
    /// Returns `CacheError::TaskFailed` if the offloaded task did not complete.
    pub async fn remove_async(&self, key: K) -> Result<Option<V>> {
        let shared = Arc::clone(&self.shared);
        let value = tokio::task::spawn_blocking(move || shared.remove(&key)).await?;
        Ok(value)
    }

    /// Asynchronous [`clear`](Cache::clear).
    ///
    /// # Errors
    /// Returns `CacheError::TaskFailed` if the offloaded task did not complete.
    pub async fn clear_async(&self) -> Result<()> {
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || shared.clear()).await?;
        Ok(())
    }

    /// Asynchronous [`get_or_populate`](Cache::get_or_populate) with an async
    /// compute function.
    ///
    /// # Errors
    /// Returns `CacheError::TaskFailed` if an offloaded lookup or store did not complete.
    pub async fn get_or_populate_async<F, Fut>(&self, key: K, compute: F) -> Result<Option<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<V>>,
    {
        self.try_get_or_populate_async(key, move || async move {
            Ok::<_, CacheError>(compute().await)
        })
        .await
    }

    /// Fallible form of [`get_or_populate_async`](Cache::get_or_populate_async).
    ///
    /// # Errors
    /// Errors from `compute` are returned unchanged and nothing is cached.
    /// Offloading failures are converted into `E`.
    pub async fn try_get_or_populate_async<F, Fut, E>(
        &self,
        key: K,
        compute: F,
    ) -> std::result::Result<Option<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Option<V>, E>>,
        E: From<CacheError>,
    {
        if let Some(value) = self.get_async(key.clone()).await? {
            return Ok(Some(value));
        }

        let Some(value) = compute().await? else {
            return Ok(None);
        };
        self.put_async(key, value.clone()).await?;
        Ok(Some(value))
    }

    // == Maintenance ==
    /// Runs one sweep immediately, returning how many entries were removed.
    ///
    /// Each removed entry notifies the eviction callback, exactly as a
    /// background sweep would.
    pub fn purge_expired(&self) -> usize {
        self.shared.purge_expired()
    }

    /// Signals the background sweep to stop at its next wait boundary.
    ///
    /// No effect if it already stopped or was never started.
    pub fn stop_cleanup(&self) {
        self.cleanup.stop();
    }

    /// Stops the background sweep and waits for the task to exit.
    pub async fn shutdown(&self) {
        self.cleanup.shutdown().await;
    }

    pub fn is_cleanup_running(&self) -> bool {
        self.cleanup.is_running()
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Observability ==
    /// Returns size plus key and last access time for each entry.
    pub fn debug_snapshot(&self) -> DebugSnapshot<K> {
        DebugSnapshot::from_entries(self.shared.store.snapshot_entries(), Instant::now())
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.shared.stats.snapshot(self.shared.store.len())
    }

    pub fn len(&self) -> usize {
        self.shared.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.store.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.shared.expiration.ttl()
    }

    pub fn max_size(&self) -> usize {
        self.shared.max_size
    }
}

impl<K, V> Clone for Cache<K, V>
where
    K: Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            cleanup: Arc::clone(&self.cleanup),
        }
    }
}

impl<K, V> Debug for Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("len", &self.shared.store.len())
            .field("max_size", &self.shared.max_size)
            .field("ttl", &self.shared.expiration.ttl())
            .field("cleanup_running", &self.cleanup.is_running())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::sleep;

    type Events = Arc<Mutex<Vec<(String, String)>>>;

    fn config(max_size: usize, ttl_ms: u64) -> CacheConfig<String, String> {
        CacheConfig {
            ttl: Duration::from_millis(ttl_ms),
            max_size,
            auto_cleanup: false,
            ..CacheConfig::default()
        }
    }

    fn recording(mut config: CacheConfig<String, String>) -> (Cache<String, String>, Events) {
        let events: Events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        config.eviction_callback = Some(Arc::new(move |k: &String, v: &String| {
            sink.lock().push((k.clone(), v.clone()));
        }));
        (Cache::new(config).unwrap(), events)
    }

    fn s(value: &str) -> String {
        value.to_string()
    }

    #[test]
    fn test_put_and_get() {
        let cache = Cache::new(config(10, 60_000)).unwrap();

        cache.put(s("key1"), s("value1"));

        assert_eq!(cache.get(&s("key1")), Some(s("value1")));
        assert_eq!(cache.get(&s("missing")), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let (cache, events) = recording(config(2, 60_000));

        cache.put(s("a"), s("1"));
        cache.put(s("b"), s("2"));
        cache.put(s("a"), s("3"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&s("a")), Some(s("3")));
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_lru_eviction_scenario() {
        let (cache, events) = recording(config(2, 60_000));

        cache.put(s("a"), s("1"));
        cache.put(s("b"), s("2"));
        cache.get(&s("a"));
        cache.put(s("c"), s("3"));

        assert_eq!(cache.get(&s("b")), None);
        assert_eq!(cache.get(&s("a")), Some(s("1")));
        assert_eq!(cache.get(&s("c")), Some(s("3")));
        assert_eq!(*events.lock(), vec![(s("b"), s("2"))]);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_remove_and_clear_do_not_notify() {
        let (cache, events) = recording(config(10, 60_000));

        cache.put(s("a"), s("1"));
        cache.put(s("b"), s("2"));
        cache.put(s("c"), s("3"));

        assert_eq!(cache.remove(&s("a")), Some(s("1")));
        assert_eq!(cache.remove(&s("a")), None);
        cache.clear();

        assert!(cache.is_empty());
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_lazy_expiration_is_silent_by_default() {
        let (cache, events) = recording(config(10, 50));

        cache.put(s("x"), s("v"));
        sleep(Duration::from_millis(60));

        assert_eq!(cache.get(&s("x")), None);
        assert!(cache.is_empty());
        assert!(events.lock().is_empty());

        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_lazy_expiration_notifies_once_when_enabled() {
        let mut config = config(10, 50);
        config.notify_on_lazy_expiration = true;
        let (cache, events) = recording(config);

        cache.put(s("x"), s("v"));
        sleep(Duration::from_millis(60));

        assert_eq!(cache.get(&s("x")), None);
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.get(&s("x")), None);
        assert_eq!(*events.lock(), vec![(s("x"), s("v"))]);
    }

    #[test]
    fn test_access_does_not_extend_ttl() {
        let cache = Cache::new(config(10, 50)).unwrap();

        cache.put(s("x"), s("v"));
        sleep(Duration::from_millis(30));
        assert_eq!(cache.get(&s("x")), Some(s("v")));
        sleep(Duration::from_millis(30));

        assert_eq!(cache.get(&s("x")), None);
    }

    #[test]
    fn test_purge_expired_notifies_each_entry() {
        let (cache, events) = recording(config(10, 50));

        cache.put(s("old1"), s("1"));
        cache.put(s("old2"), s("2"));
        sleep(Duration::from_millis(60));
        cache.put(s("fresh"), s("3"));

        assert_eq!(cache.purge_expired(), 2);
        assert_eq!(cache.purge_expired(), 0);

        let mut seen = events.lock().clone();
        seen.sort();
        assert_eq!(seen, vec![(s("old1"), s("1")), (s("old2"), s("2"))]);
        assert_eq!(cache.get(&s("fresh")), Some(s("3")));
    }

    #[test]
    fn test_contains_key() {
        let cache = Cache::new(config(10, 50)).unwrap();
        cache.put(s("x"), s("v"));

        assert!(cache.contains_key(&s("x")));
        assert!(!cache.contains_key(&s("y")));

        sleep(Duration::from_millis(60));
        assert!(!cache.contains_key(&s("x")));
    }

    #[test]
    fn test_get_or_populate_computes_once() {
        let cache = Cache::new(config(10, 60_000)).unwrap();
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Some(s("computed"))
        };

        assert_eq!(cache.get_or_populate(s("y"), compute), Some(s("computed")));
        assert_eq!(cache.get_or_populate(s("y"), compute), Some(s("computed")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(&s("y")), Some(s("computed")));
    }

    #[test]
    fn test_get_or_populate_none_caches_nothing() {
        let cache = Cache::new(config(10, 60_000)).unwrap();

        assert_eq!(cache.get_or_populate(s("y"), || None), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_try_get_or_populate_propagates_error() {
        let cache = Cache::new(config(10, 60_000)).unwrap();

        let result: std::result::Result<Option<String>, &str> =
            cache.try_get_or_populate(s("y"), || Err("backend down"));

        assert_eq!(result, Err("backend down"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_debug_callback_receives_messages() {
        let messages = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = messages.clone();
        let mut config = config(1, 60_000);
        config.debug_callback = Some(Arc::new(move |m: &str| sink.lock().push(m.to_string())));
        let cache = Cache::new(config).unwrap();

        cache.put(s("a"), s("1"));
        cache.put(s("b"), s("2"));

        let messages = messages.lock();
        assert!(messages.iter().any(|m| m.starts_with("Cache created")));
        assert!(messages.iter().any(|m| m.contains("Evicted") && m.contains("\"a\"")));
    }

    #[test]
    fn test_debug_snapshot_is_read_only() {
        let cache = Cache::new(config(10, 60_000)).unwrap();
        cache.put(s("a"), s("1"));
        cache.put(s("b"), s("2"));
        cache.get(&s("a"));

        let before = cache.stats();
        let snapshot = cache.debug_snapshot();

        assert_eq!(snapshot.size, 2);
        assert_eq!(snapshot.entries[0].key, "b");
        assert_eq!(snapshot.entries[1].key, "a");
        assert_eq!(cache.stats(), before);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = Cache::new(config(0, 60_000));
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));

        let result = Cache::new(config(10, 0));
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_auto_cleanup_requires_runtime() {
        let mut config = config(10, 60_000);
        config.auto_cleanup = true;

        let result = Cache::new(config);
        assert!(matches!(result, Err(CacheError::RuntimeUnavailable(_))));
    }

    #[test]
    fn test_stop_cleanup_without_scheduler_is_noop() {
        let cache = Cache::new(config(10, 60_000)).unwrap();

        assert!(!cache.is_cleanup_running());
        cache.stop_cleanup();
        cache.stop_cleanup();
        assert!(!cache.is_cleanup_running());
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = Cache::new(config(10, 60_000)).unwrap();
        let other = cache.clone();

        other.put(s("a"), s("1"));

        assert_eq!(cache.get(&s("a")), Some(s("1")));
        assert_eq!(cache.ttl(), Duration::from_millis(60_000));
        assert_eq!(cache.max_size(), 10);
    }

    #[tokio::test]
    async fn test_async_variants() {
        let cache = Cache::new(config(10, 60_000)).unwrap();

        cache.put_async(s("a"), s("1")).await.unwrap();
        assert_eq!(cache.get_async(s("a")).await.unwrap(), Some(s("1")));
        assert_eq!(cache.remove_async(s("a")).await.unwrap(), Some(s("1")));
        assert_eq!(cache.get_async(s("a")).await.unwrap(), None);

        cache.put_async(s("b"), s("2")).await.unwrap();
        cache.clear_async().await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_async_lru_eviction_scenario() {
        let (cache, events) = recording(config(2, 60_000));

        cache.put_async(s("a"), s("1")).await.unwrap();
        cache.put_async(s("b"), s("2")).await.unwrap();
        cache.get_async(s("a")).await.unwrap();
        cache.put_async(s("c"), s("3")).await.unwrap();

        assert_eq!(cache.get_async(s("b")).await.unwrap(), None);
        assert_eq!(cache.get_async(s("a")).await.unwrap(), Some(s("1")));
        assert_eq!(cache.get_async(s("c")).await.unwrap(), Some(s("3")));
        assert_eq!(*events.lock(), vec![(s("b"), s("2"))]);
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_get_removes_expired_entry() {
        let (cache, events) = recording(config(10, 50));

        cache.put_async(s("x"), s("v")).await.unwrap();
        assert_eq!(cache.get_async(s("x")).await.unwrap(), Some(s("v")));

        tokio::time::advance(Duration::from_millis(60)).await;

        assert_eq!(cache.get_async(s("x")).await.unwrap(), None);
        assert!(cache.is_empty());
        assert!(events.lock().is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[tokio::test]
    async fn test_get_or_populate_async() {
        let cache = Cache::new(config(10, 60_000)).unwrap();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value = cache
                .get_or_populate_async(s("y"), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Some(s("computed"))
                })
                .await
                .unwrap();
            assert_eq!(value, Some(s("computed")));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[derive(Debug, PartialEq)]
    enum FetchError {
        Unavailable,
        Cache(String),
    }

    impl From<CacheError> for FetchError {
        fn from(err: CacheError) -> Self {
            FetchError::Cache(err.to_string())
        }
    }

    #[tokio::test]
    async fn test_try_get_or_populate_async_propagates_error() {
        let cache = Cache::new(config(10, 60_000)).unwrap();

        let result = cache
            .try_get_or_populate_async(s("y"), || async { Err(FetchError::Unavailable) })
            .await;

        assert_eq!(result, Err(FetchError::Unavailable));
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweep_notifies() {
        let mut config = config(10, 50);
        config.auto_cleanup = true;
        config.cleanup_interval = Duration::from_millis(20);
        let (cache, events) = recording(config);
        assert!(cache.is_cleanup_running());

        cache.put(s("x"), s("v"));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(*events.lock(), vec![(s("x"), s("v"))]);
        assert!(cache.is_empty());

        cache.shutdown().await;
        assert!(!cache.is_cleanup_running());
    }
}
