//! Preload Module
//!
//! Speculative population of the page store for results the user is about to
//! open.

mod fetcher;
mod observer;
mod scheduler;

pub use fetcher::{HttpPageFetcher, PageFetcher};
pub use observer::VisibilityObserver;
pub use scheduler::{PreloadScheduler, MAX_CONCURRENT_PRELOADS};
