//! API Handlers
//!
//! HTTP request handlers exposing the cache registry, the search key builder
//! and the page preloader.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use crate::cache::{generate_search_key, CacheRegistry, SearchFilters, StoreKind};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, PreloadResponse, SearchKeyResponse, SetRequest,
    SetResponse, StatsResponse, StoreStatsResponse, SweepResponse,
};
use crate::preload::{HttpPageFetcher, PreloadScheduler};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// All cache stores
    pub cache: CacheRegistry,
    /// Page preloader, absent when no upstream is configured
    pub preloader: Option<PreloadScheduler>,
}

impl AppState {
    /// Creates a new AppState without a preloader.
    pub fn new(cache: CacheRegistry) -> Self {
        Self {
            cache,
            preloader: None,
        }
    }

    pub fn with_preloader(mut self, preloader: PreloadScheduler) -> Self {
        self.preloader = Some(preloader);
        self
    }

    /// Creates a new AppState from configuration.
    ///
    /// The preloader fetches from `upstream_url` and is only enabled when one
    /// is configured.
    pub fn from_config(config: &Config) -> Self {
        let state = Self::new(CacheRegistry::from_config(config));
        match &config.upstream_url {
            Some(url) => {
                let fetcher = Arc::new(HttpPageFetcher::new(url.clone()));
                let preloader = PreloadScheduler::new(
                    state.cache.store(StoreKind::Page),
                    fetcher,
                    config.preload_concurrency,
                );
                state.with_preloader(preloader)
            }
            None => state,
        }
    }
}

/// Handler for PUT /cache/:store
pub async fn set_handler(
    State(state): State<AppState>,
    Path(store): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    let kind: StoreKind = store.parse()?;
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state
        .cache
        .set(kind, req.key.clone(), req.value, req.ttl.map(Duration::from_secs))
        .await;

    Ok(Json(SetResponse::new(kind, req.key)))
}

/// Handler for GET /cache/:store/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path((store, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    let kind: StoreKind = store.parse()?;
    match state.cache.get(kind, &key).await {
        Some(value) => Ok(Json(GetResponse::new(kind, key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /cache/:store/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((store, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let kind: StoreKind = store.parse()?;
    let deleted = state.cache.delete(kind, &key).await;

    Ok(Json(DeleteResponse::new(kind, key, deleted)))
}

/// Handler for GET /search-key
///
/// `q` is the query text; every other parameter is a filter.
pub async fn search_key_handler(
    Query(params): Query<HashMap<String, String>>,
) -> Json<SearchKeyResponse> {
    let (query, filters) = SearchFilters::from_params(&params);
    Json(SearchKeyResponse {
        key: generate_search_key(&query, &filters),
    })
}

/// Handler for POST /preload/:page_id
pub async fn preload_handler(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> Result<(StatusCode, Json<PreloadResponse>)> {
    let preloader = state.preloader.as_ref().ok_or(CacheError::PreloadDisabled)?;
    let scheduled = preloader.schedule(&page_id).await;
    debug!("Preload hint for {}: scheduled={}", page_id, scheduled);

    Ok((
        StatusCode::ACCEPTED,
        Json(PreloadResponse { page_id, scheduled }),
    ))
}

/// Handler for POST /sweep
pub async fn sweep_handler(State(state): State<AppState>) -> Result<Json<SweepResponse>> {
    let reports = state
        .cache
        .sweep_all()
        .await
        .ok_or(CacheError::SweepInProgress)?;

    Ok(Json(SweepResponse { reports }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stores = state
        .cache
        .stats()
        .await
        .iter()
        .map(|(kind, stats)| StoreStatsResponse::new(*kind, stats))
        .collect();

    Json(StatsResponse {
        stores,
        preload_pending: state.preloader.as_ref().map(|p| p.pending()),
        preload_in_flight: state.preloader.as_ref().map(|p| p.in_flight()),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
