//! Mini Cache - A lightweight in-process key/value cache
//!
//! Demo binary: memoizes a slow lookup through the cache and reports what
//! happened.

use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_cache::{Cache, CacheConfig};

/// Main entry point for the Mini Cache demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache (starts the background cleanup task)
/// 4. Run the memoization demo, or stop early on Ctrl+C
/// 5. Print statistics and stop the cleanup task
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mini Cache demo");

    // Load configuration from environment variables
    let mut config: CacheConfig<u64, String> =
        CacheConfig::from_env().context("invalid cache configuration")?;
    config.debug_callback = Some(std::sync::Arc::new(|message: &str| {
        debug!(target: "mini_cache::demo", "{}", message);
    }));
    config.eviction_callback = Some(std::sync::Arc::new(|key: &u64, value: &String| {
        info!("Evicted user {} ({})", key, value);
    }));
    info!(
        "Configuration loaded: max_size={}, ttl={}ms, cleanup_interval={}ms, auto_cleanup={}",
        config.max_size,
        config.ttl.as_millis(),
        config.cleanup_interval.as_millis(),
        config.auto_cleanup
    );

    let cache = Cache::new(config).context("failed to create cache")?;

    tokio::select! {
        result = run_demo(&cache) => result?,
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, stopping demo early");
        }
    }

    let stats = serde_json::to_string_pretty(&cache.stats())?;
    info!("Cache statistics:\n{}", stats);
    let snapshot = serde_json::to_string_pretty(&cache.debug_snapshot())?;
    info!("Cache contents:\n{}", snapshot);

    cache.shutdown().await;
    info!("Demo complete");
    Ok(())
}

/// Looks up a handful of users twice; the second pass is served from cache.
async fn run_demo(cache: &Cache<u64, String>) -> anyhow::Result<()> {
    for pass in 1..=2 {
        let started = tokio::time::Instant::now();
        for id in 1..=5u64 {
            let name = cache
                .get_or_populate_async(id, || fetch_user(id))
                .await?
                .unwrap_or_else(|| "<unknown>".to_string());
            debug!("pass {} user {} = {}", pass, id, name);
        }
        info!("Pass {} finished in {:?}", pass, started.elapsed());
    }

    // Users that do not exist are never cached
    if cache.get_or_populate_async(404, || fetch_user(404)).await?.is_none() {
        warn!("User 404 not found, nothing cached");
    }
    Ok(())
}

/// Simulated slow backend lookup.
async fn fetch_user(id: u64) -> Option<String> {
    tokio::time::sleep(Duration::from_millis(100)).await;
    (id < 100).then(|| format!("user-{}", id))
}
