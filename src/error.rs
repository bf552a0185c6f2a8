//! Error types for the cache service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Errors surfaced by the HTTP layer over the cache registry.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not present or expired in the requested store
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Store name does not match any registry store
    #[error("Unknown store: {0}")]
    UnknownStore(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Page preloading has no upstream configured
    #[error("Preloading is disabled: no upstream configured")]
    PreloadDisabled,

    /// A sweep is already running
    #[error("Sweep already in progress")]
    SweepInProgress,
}

// == Preload Error Enum ==
/// Failure of a single page preload fetch. Never surfaced to users.
#[derive(Error, Debug)]
pub enum PreloadError {
    /// Transport or decoding failure
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream returned status {0}")]
    Status(u16),

    /// Any other fetcher-specific failure
    #[error("Fetch failed: {0}")]
    Other(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::UnknownStore(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::PreloadDisabled => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::SweepInProgress => StatusCode::CONFLICT,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache service.
pub type Result<T> = std::result::Result<T, CacheError>;
