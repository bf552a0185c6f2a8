//! Cache Module
//!
//! Expiring in-memory stores with access tracking and sweep-time eviction,
//! grouped into a registry of per-category stores.

mod clock;
mod entry;
mod keys;
mod registry;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, duration_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use keys::{
    generate_search_key, normalize_query, page_key, SearchFilters, FILTER_OPTIONS_KEY,
    QUERY_PARAM,
};
pub use registry::{CacheRegistry, SharedStore, StoreKind};
pub use stats::CacheStats;
pub use store::{CacheStore, SweepPolicy, SweepReport};
