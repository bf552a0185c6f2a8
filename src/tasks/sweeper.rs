//! Cache Sweep Task
//!
//! Background task that periodically sweeps every store in the registry:
//! expired entries are purged and oversized stores are cut back to their
//! target size.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cache::CacheRegistry;

/// Interval between sweeps when none is configured.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(2 * 60);

// == Sweeper Handle ==
/// Owns the running sweep task. Dropping the handle also stops the loop.
pub struct SweeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stops the loop after any sweep in progress and waits for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(err) = (&mut self.handle).await {
            warn!("Sweep task ended abnormally: {}", err);
        }
    }

    /// Aborts the task immediately.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawns a background task that sweeps `registry` every `interval`.
///
/// The first sweep happens one interval after spawning. Ticks missed while a
/// sweep is running are skipped, so sweeps never overlap.
///
/// # Example
/// ```ignore
/// let registry = CacheRegistry::from_config(&config);
/// let sweeper = spawn_sweeper(registry.clone(), DEFAULT_SWEEP_INTERVAL);
/// // Later, during shutdown:
/// sweeper.shutdown().await;
/// ```
pub fn spawn_sweeper(registry: CacheRegistry, interval: Duration) -> SweeperHandle {
    let (tx, mut rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        info!("Starting cache sweeper with interval of {:?}", interval);

        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = &mut rx => {
                    info!("Cache sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match registry.sweep_all().await {
                        Some(reports) => {
                            let removed: usize = reports.iter().map(|r| r.before - r.after).sum();
                            debug!("Cache sweep finished: removed {} entries", removed);
                        }
                        None => debug!("Cache sweep skipped, previous sweep still running"),
                    }
                }
            }
        }
    });

    SweeperHandle {
        shutdown: Some(tx),
        handle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::cache::{ManualClock, StoreKind};
    use crate::config::Config;

    #[tokio::test]
    async fn test_sweeper_removes_expired_entries() {
        let clock = Arc::new(ManualClock::new(0));
        let registry = CacheRegistry::with_clock(&Config::default(), clock.clone());

        registry
            .set(StoreKind::Search, "expire_soon".to_string(), json!(1), Some(Duration::from_secs(1)))
            .await;
        registry
            .set(StoreKind::Search, "long_lived".to_string(), json!(2), None)
            .await;
        clock.advance(Duration::from_secs(2));

        let sweeper = spawn_sweeper(registry.clone(), Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(200)).await;

        // Swept without ever being read
        assert_eq!(registry.len(StoreKind::Search).await, 1);
        assert!(registry.get(StoreKind::Search, "long_lived").await.is_some());

        sweeper.shutdown().await;
    }

    #[tokio::test]
    async fn test_sweeper_enforces_capacity() {
        let clock = Arc::new(ManualClock::new(0));
        let registry = CacheRegistry::with_clock(&Config::default(), clock.clone());

        for i in 0..1100 {
            clock.advance(Duration::from_millis(1));
            registry
                .set(StoreKind::Page, format!("page:{i}"), json!(i), None)
                .await;
        }

        let sweeper = spawn_sweeper(registry.clone(), Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(200)).await;
        sweeper.shutdown().await;

        assert_eq!(registry.len(StoreKind::Page).await, 800);
        assert!(registry.get(StoreKind::Page, "page:0").await.is_none());
        assert!(registry.get(StoreKind::Page, "page:1099").await.is_some());
    }

    #[tokio::test]
    async fn test_sweeper_shutdown_stops_task() {
        let registry = CacheRegistry::from_config(&Config::default());

        let sweeper = spawn_sweeper(registry, Duration::from_secs(3600));
        sweeper.shutdown().await;
    }

    #[tokio::test]
    async fn test_sweeper_can_be_aborted() {
        let registry = CacheRegistry::from_config(&Config::default());

        let sweeper = spawn_sweeper(registry, Duration::from_secs(1));
        sweeper.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(sweeper.is_finished(), "Task should be finished after abort");
    }
}
