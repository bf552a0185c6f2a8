//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheStats, StoreKind, SweepReport};

/// Response body for a cache read (GET /cache/:store/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub store: String,
    pub key: String,
    pub value: Value,
}

impl GetResponse {
    pub fn new(store: StoreKind, key: impl Into<String>, value: Value) -> Self {
        Self {
            store: store.name().to_string(),
            key: key.into(),
            value,
        }
    }
}

/// Response body for a cache write (PUT /cache/:store)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    pub store: String,
    pub key: String,
}

impl SetResponse {
    pub fn new(store: StoreKind, key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            store: store.name().to_string(),
            key,
        }
    }
}

/// Response body for a cache delete (DELETE /cache/:store/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub store: String,
    pub key: String,
    /// Whether an entry was actually removed
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn new(store: StoreKind, key: impl Into<String>, deleted: bool) -> Self {
        Self {
            store: store.name().to_string(),
            key: key.into(),
            deleted,
        }
    }
}

/// Statistics of one store
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatsResponse {
    pub store: String,
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub evictions: u64,
    pub sweeps: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StoreStatsResponse {
    pub fn new(store: StoreKind, stats: &CacheStats) -> Self {
        Self {
            store: store.name().to_string(),
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            evictions: stats.evictions,
            sweeps: stats.sweeps,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub stores: Vec<StoreStatsResponse>,
    /// Preloads queued but not started, when preloading is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preload_pending: Option<usize>,
    /// Preloads currently being fetched, when preloading is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preload_in_flight: Option<usize>,
}

/// Response body for the search key endpoint (GET /search-key)
#[derive(Debug, Clone, Serialize)]
pub struct SearchKeyResponse {
    pub key: String,
}

/// Response body for a preload hint (POST /preload/:page_id)
#[derive(Debug, Clone, Serialize)]
pub struct PreloadResponse {
    pub page_id: String,
    /// False when the page was already cached, queued or in flight
    pub scheduled: bool,
}

/// Response body for a manual sweep (POST /sweep)
#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    pub reports: Vec<SweepReport>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
