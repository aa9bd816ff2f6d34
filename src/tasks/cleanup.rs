//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// == Sweep Target ==
/// Something the scheduler can sweep.
pub trait Sweep: Send + Sync + 'static {
    /// Removes stale entries, returning how many were removed.
    ///
    /// Runs synchronously; the scheduler never interrupts it.
    fn sweep(&self) -> usize;
}

// == Cleanup Scheduler ==
/// Owns the lifecycle of one periodic sweep task.
///
/// The task waits `interval`, sweeps, and repeats until cancelled. Dropping
/// the scheduler cancels the task.
#[derive(Debug)]
pub struct CleanupScheduler {
    cancellation_token: CancellationToken,
    task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl CleanupScheduler {
    // == Start ==
    /// Spawns the sweep loop on `runtime`.
    ///
    /// # Arguments
    /// * `target` - What to sweep on every tick
    /// * `interval` - Wait between sweeps
    /// * `runtime` - Runtime that hosts the task
    pub fn start(target: Arc<dyn Sweep>, interval: Duration, runtime: &Handle) -> Self {
        let cancellation_token = CancellationToken::new();
        let cancel = cancellation_token.clone();

        let handle = runtime.spawn(async move {
            info!(
                "Starting TTL cleanup task with interval of {} ms",
                interval.as_millis()
            );
            cleanup_loop(target, interval, cancel).await;
            info!("TTL cleanup task stopped");
        });

        Self {
            cancellation_token,
            task_handle: Mutex::new(Some(handle)),
        }
    }

    /// A scheduler with no task, for caches without auto-cleanup.
    pub fn disabled() -> Self {
        let cancellation_token = CancellationToken::new();
        cancellation_token.cancel();
        Self {
            cancellation_token,
            task_handle: Mutex::new(None),
        }
    }

    // == Stop ==
    /// Signals the task to exit at its next wait boundary.
    ///
    /// A sweep already in progress completes first. Calling this more than
    /// once, or on a disabled scheduler, has no further effect.
    pub fn stop(&self) {
        if !self.cancellation_token.is_cancelled() {
            debug!("Stopping TTL cleanup task");
            self.cancellation_token.cancel();
        }
    }

    // == Shutdown ==
    /// Stops the task and waits for it to finish.
    ///
    /// A panicked task is logged, not reported. Idempotent.
    pub async fn shutdown(&self) {
        self.stop();

        let handle = self.task_handle.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Cleanup task ended abnormally: {}", e);
            }
        }
    }

    /// Returns true while the task has not been told to stop and is still alive.
    pub fn is_running(&self) -> bool {
        if self.cancellation_token.is_cancelled() {
            return false;
        }
        self.task_handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for CleanupScheduler {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

async fn cleanup_loop(target: Arc<dyn Sweep>, interval: Duration, cancel: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }

        let removed = target.sweep();

        // Log cleanup statistics
        if removed > 0 {
            info!("TTL cleanup: removed {} expired entries", removed);
        } else {
            debug!("TTL cleanup: no expired entries found");
        }
    }
}
