//! Notion Search Cache - expiring cache tier for a Notion search front-end
//!
//! Holds per-category stores (general, search, page, filter) with their own
//! TTLs, sweeps them periodically, and warms the page store ahead of use.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod preload;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheRegistry, StoreKind};
pub use config::Config;
pub use preload::{PreloadScheduler, VisibilityObserver};
pub use tasks::spawn_sweeper;
