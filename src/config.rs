//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{StoreKind, SweepPolicy};
use crate::preload::MAX_CONCURRENT_PRELOADS;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Seconds between cache sweeps
    pub sweep_interval: u64,
    /// Store size above which a sweep evicts
    pub soft_limit: usize,
    /// Store size a capacity eviction shrinks to
    pub target_size: usize,
    /// TTL in seconds of the general store
    pub general_ttl: u64,
    /// TTL in seconds of the search store
    pub search_ttl: u64,
    /// TTL in seconds of the page store
    pub page_ttl: u64,
    /// TTL in seconds of the filter store
    pub filter_ttl: u64,
    /// Maximum concurrent page preloads
    pub preload_concurrency: usize,
    /// Base URL page details are preloaded from (`<url>/page/<id>`)
    pub upstream_url: Option<String>,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 120)
    /// - `SOFT_LIMIT` / `TARGET_SIZE` - Capacity bounds (default: 1000 / 800)
    /// - `GENERAL_TTL`, `SEARCH_TTL`, `PAGE_TTL`, `FILTER_TTL` - Store TTLs in
    ///   seconds (default: 600, 300, 900, 1800)
    /// - `PRELOAD_CONCURRENCY` - Concurrent page preloads (default: 3)
    /// - `UPSTREAM_URL` - Page detail source; preloading is off when unset
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            soft_limit: env_or("SOFT_LIMIT", defaults.soft_limit),
            target_size: env_or("TARGET_SIZE", defaults.target_size),
            general_ttl: env_or("GENERAL_TTL", defaults.general_ttl),
            search_ttl: env_or("SEARCH_TTL", defaults.search_ttl),
            page_ttl: env_or("PAGE_TTL", defaults.page_ttl),
            filter_ttl: env_or("FILTER_TTL", defaults.filter_ttl),
            preload_concurrency: env_or("PRELOAD_CONCURRENCY", defaults.preload_concurrency),
            upstream_url: env::var("UPSTREAM_URL").ok().filter(|url| !url.is_empty()),
        }
    }

    /// TTL configured for a store.
    pub fn ttl_for(&self, kind: StoreKind) -> Duration {
        let secs = match kind {
            StoreKind::General => self.general_ttl,
            StoreKind::Search => self.search_ttl,
            StoreKind::Page => self.page_ttl,
            StoreKind::Filter => self.filter_ttl,
        };
        Duration::from_secs(secs)
    }

    /// Capacity bounds; a target above the soft limit is clamped to it.
    pub fn sweep_policy(&self) -> SweepPolicy {
        SweepPolicy {
            soft_limit: self.soft_limit,
            target_size: self.target_size.min(self.soft_limit),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            sweep_interval: 120,
            soft_limit: 1000,
            target_size: 800,
            general_ttl: StoreKind::General.default_ttl().as_secs(),
            search_ttl: StoreKind::Search.default_ttl().as_secs(),
            page_ttl: StoreKind::Page.default_ttl().as_secs(),
            filter_ttl: StoreKind::Filter.default_ttl().as_secs(),
            preload_concurrency: MAX_CONCURRENT_PRELOADS,
            upstream_url: None,
        }
    }
}
