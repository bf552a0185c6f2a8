//! API Module
//!
//! HTTP handlers and routing for the cache service.
//!
//! # Endpoints
//! - `PUT /cache/:store` - Store a value in a store
//! - `GET /cache/:store/:key` - Read a live value
//! - `DELETE /cache/:store/:key` - Delete a value
//! - `GET /search-key` - Build the search store key for a request
//! - `POST /preload/:page_id` - Hint that a page is about to be opened
//! - `POST /sweep` - Sweep every store now
//! - `GET /stats` - Per-store statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
