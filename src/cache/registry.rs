//! Cache Registry Module
//!
//! The fixed set of independently configured stores the request path reads
//! through: general, search, page and filter.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::cache::{CacheStats, CacheStore, Clock, SweepReport, SystemClock};
use crate::config::Config;
use crate::error::CacheError;

/// A store shared between request handlers, the sweeper and the preloader.
pub type SharedStore = Arc<RwLock<CacheStore>>;

// == Store Kind ==
/// Logical data category, one store each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// Miscellaneous values
    General,
    /// Query result sets
    Search,
    /// Page detail and attachments
    Page,
    /// Enumerated filter option lists
    Filter,
}

impl StoreKind {
    pub const ALL: [StoreKind; 4] = [
        StoreKind::General,
        StoreKind::Search,
        StoreKind::Page,
        StoreKind::Filter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StoreKind::General => "general",
            StoreKind::Search => "search",
            StoreKind::Page => "page",
            StoreKind::Filter => "filter",
        }
    }

    /// TTL reflecting how often the underlying data changes.
    pub fn default_ttl(self) -> Duration {
        let minutes = match self {
            StoreKind::General => 10,
            StoreKind::Search => 5,
            StoreKind::Page => 15,
            StoreKind::Filter => 30,
        };
        Duration::from_secs(minutes * 60)
    }

    fn index(self) -> usize {
        match self {
            StoreKind::General => 0,
            StoreKind::Search => 1,
            StoreKind::Page => 2,
            StoreKind::Filter => 3,
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StoreKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StoreKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| CacheError::UnknownStore(s.to_string()))
    }
}

// == Sweep Guard ==
/// Holds the registry in the Sweeping state until dropped.
struct SweepGuard<'a>(&'a AtomicBool);

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// == Cache Registry ==
/// Cheaply cloneable handle to all cache stores.
#[derive(Clone)]
pub struct CacheRegistry {
    stores: Arc<[SharedStore; 4]>,
    sweeping: Arc<AtomicBool>,
}

impl CacheRegistry {
    // == Constructor ==
    /// Creates the registry from configuration using the wall clock.
    pub fn from_config(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates the registry with every store reading time from `clock`.
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let policy = config.sweep_policy();
        let build = |kind: StoreKind| -> SharedStore {
            Arc::new(RwLock::new(CacheStore::with_clock(
                kind.name(),
                config.ttl_for(kind),
                policy,
                clock.clone(),
            )))
        };

        Self {
            stores: Arc::new(StoreKind::ALL.map(build)),
            sweeping: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the shared handle of one store.
    pub fn store(&self, kind: StoreKind) -> SharedStore {
        self.stores[kind.index()].clone()
    }

    // == Get ==
    /// Reads a live value. A miss is not an error.
    pub async fn get(&self, kind: StoreKind, key: &str) -> Option<Value> {
        self.stores[kind.index()].write().await.get(key)
    }

    // == Set ==
    /// Stores a value, using the store's TTL when `ttl` is `None`.
    pub async fn set(&self, kind: StoreKind, key: String, value: Value, ttl: Option<Duration>) {
        self.stores[kind.index()].write().await.set(key, value, ttl);
    }

    // == Delete ==
    pub async fn delete(&self, kind: StoreKind, key: &str) -> bool {
        self.stores[kind.index()].write().await.delete(key)
    }

    pub async fn len(&self, kind: StoreKind) -> usize {
        self.stores[kind.index()].read().await.len()
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `key`, or runs `producer` and caches its
    /// result.
    ///
    /// A producer error is returned unchanged and nothing is stored. No lock
    /// is held while the producer runs.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        kind: StoreKind,
        key: &str,
        ttl: Option<Duration>,
        producer: F,
    ) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(value) = self.get(kind, key).await {
            debug!("Cache hit for {}: {}", kind, key);
            return Ok(value);
        }

        debug!("Cache miss for {}: {}", kind, key);
        let value = producer().await?;
        self.set(kind, key.to_string(), value.clone(), ttl).await;
        Ok(value)
    }

    // == Stats ==
    /// Statistics of every store, in registry order.
    pub async fn stats(&self) -> Vec<(StoreKind, CacheStats)> {
        let mut all = Vec::with_capacity(StoreKind::ALL.len());
        for kind in StoreKind::ALL {
            all.push((kind, self.stores[kind.index()].read().await.stats()));
        }
        all
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeping.load(Ordering::Acquire)
    }

    // == Sweep All ==
    /// Sweeps every store once.
    ///
    /// Returns `None` without doing anything if another sweep is still in
    /// flight. Each store is swept in its own task so a panic while sweeping
    /// one store is logged and the others are still swept.
    pub async fn sweep_all(&self) -> Option<Vec<SweepReport>> {
        if self
            .sweeping
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Cache sweep already in progress, skipping");
            return None;
        }
        let _guard = SweepGuard(&self.sweeping);

        let mut reports = Vec::with_capacity(StoreKind::ALL.len());
        for kind in StoreKind::ALL {
            let store = self.store(kind);
            let task = tokio::spawn(async move {
                let mut guard = store.write().await;
                guard.sweep()
            });
            match task.await {
                Ok(report) => {
                    info!(
                        store = %report.store,
                        before = report.before,
                        after = report.after,
                        "Cache cleanup [{}]: {} -> {} items",
                        report.store,
                        report.before,
                        report.after
                    );
                    reports.push(report);
                }
                Err(err) => {
                    error!(store = %kind, "Cache sweep failed: {}", err);
                }
            }
        }
        Some(reports)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, SweepPolicy};
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    /// Clock whose reads panic, standing in for a store that faults mid-sweep.
    #[derive(Debug)]
    struct PanickingClock;

    impl Clock for PanickingClock {
        fn now_ms(&self) -> u64 {
            panic!("clock unavailable");
        }
    }

    fn registry() -> (CacheRegistry, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        (CacheRegistry::with_clock(&Config::default(), clock.clone()), clock)
    }

    #[test]
    fn test_store_kind_from_str() {
        assert_eq!("search".parse::<StoreKind>().unwrap(), StoreKind::Search);
        assert_eq!("filter".parse::<StoreKind>().unwrap(), StoreKind::Filter);
        assert!(matches!(
            "blocks".parse::<StoreKind>(),
            Err(CacheError::UnknownStore(_))
        ));
    }

    #[test]
    fn test_store_kind_default_ttls() {
        assert_eq!(StoreKind::General.default_ttl(), Duration::from_secs(600));
        assert_eq!(StoreKind::Search.default_ttl(), Duration::from_secs(300));
        assert_eq!(StoreKind::Page.default_ttl(), Duration::from_secs(900));
        assert_eq!(StoreKind::Filter.default_ttl(), Duration::from_secs(1800));
    }

    #[tokio::test]
    async fn test_registry_stores_are_independent() {
        let (registry, _) = registry();

        registry.set(StoreKind::Search, "k".to_string(), json!("s"), None).await;
        registry.set(StoreKind::Page, "k".to_string(), json!("p"), None).await;

        assert_eq!(registry.get(StoreKind::Search, "k").await, Some(json!("s")));
        assert_eq!(registry.get(StoreKind::Page, "k").await, Some(json!("p")));
        assert_eq!(registry.get(StoreKind::Filter, "k").await, None);
    }

    #[tokio::test]
    async fn test_registry_search_scenario() {
        let (registry, clock) = registry();

        registry
            .set(StoreKind::Search, "q:math::".to_string(), json!(["A"]), None)
            .await;
        assert_eq!(registry.get(StoreKind::Search, "q:math::").await, Some(json!(["A"])));

        clock.advance(Duration::from_secs(5 * 60 + 1));
        assert_eq!(registry.get(StoreKind::Search, "q:math::").await, None);
    }

    #[tokio::test]
    async fn test_registry_per_store_ttl() {
        let (registry, clock) = registry();

        for kind in StoreKind::ALL {
            registry.set(kind, "k".to_string(), json!(1), None).await;
        }
        clock.advance(Duration::from_secs(11 * 60));

        assert_eq!(registry.get(StoreKind::General, "k").await, None);
        assert_eq!(registry.get(StoreKind::Search, "k").await, None);
        assert!(registry.get(StoreKind::Page, "k").await.is_some());
        assert!(registry.get(StoreKind::Filter, "k").await.is_some());
    }

    #[tokio::test]
    async fn test_get_or_fetch_populates_on_miss() {
        let (registry, _) = registry();
        let mut calls = 0;

        let first: Result<Value, String> = registry
            .get_or_fetch(StoreKind::Filter, "filter_options", None, || {
                calls += 1;
                async { Ok(json!({"subject": ["math"]})) }
            })
            .await;
        assert_ok!(&first);

        let second: Result<Value, String> = registry
            .get_or_fetch(StoreKind::Filter, "filter_options", None, || async {
                Err("upstream should not be called".to_string())
            })
            .await;

        assert_eq!(calls, 1);
        assert_eq!(assert_ok!(second), json!({"subject": ["math"]}));
    }

    #[tokio::test]
    async fn test_get_or_fetch_propagates_producer_error() {
        let (registry, _) = registry();

        let result: Result<Value, String> = registry
            .get_or_fetch(StoreKind::Search, "search:0:", None, || async {
                Err("notion unavailable".to_string())
            })
            .await;

        assert_eq!(assert_err!(result), "notion unavailable");
        assert_eq!(registry.len(StoreKind::Search).await, 0);
    }

    #[tokio::test]
    async fn test_sweep_all_reports_every_store() {
        let (registry, clock) = registry();

        registry
            .set(StoreKind::General, "a".to_string(), json!(1), Some(Duration::from_secs(1)))
            .await;
        registry.set(StoreKind::Page, "b".to_string(), json!(2), None).await;
        clock.advance(Duration::from_secs(2));

        let reports = registry.sweep_all().await.unwrap();

        assert_eq!(reports.len(), 4);
        let general = reports.iter().find(|r| r.store == "general").unwrap();
        assert_eq!((general.before, general.after), (1, 0));
        let page = reports.iter().find(|r| r.store == "page").unwrap();
        assert_eq!((page.before, page.after), (1, 1));
        assert!(!registry.is_sweeping());
    }

    #[tokio::test]
    async fn test_sweep_all_skips_when_already_sweeping() {
        let (registry, _) = registry();

        // Hold the search store so the first sweep blocks mid-way
        let lock = registry.store(StoreKind::Search);
        let guard = lock.write().await;

        let background = registry.clone();
        let first = tokio::spawn(async move { background.sweep_all().await });
        while !registry.is_sweeping() {
            tokio::task::yield_now().await;
        }

        assert!(registry.sweep_all().await.is_none());

        drop(guard);
        assert!(first.await.unwrap().is_some());
        assert!(registry.sweep_all().await.is_some());
    }

    #[tokio::test]
    async fn test_sweep_all_continues_past_failing_store() {
        let (registry, clock) = registry();

        registry.set(StoreKind::Page, "b".to_string(), json!(2), None).await;
        *registry.store(StoreKind::Search).write().await = CacheStore::with_clock(
            "search",
            StoreKind::Search.default_ttl(),
            SweepPolicy::default(),
            Arc::new(PanickingClock),
        );
        clock.advance(Duration::from_secs(1));

        let reports = registry.sweep_all().await.unwrap();

        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.store != "search"));
        let page = reports.iter().find(|r| r.store == "page").unwrap();
        assert_eq!((page.before, page.after), (1, 1));
        assert!(!registry.is_sweeping());

        // The failed store's lock is released, so later sweeps still run
        assert_eq!(registry.sweep_all().await.unwrap().len(), 3);
    }
}
