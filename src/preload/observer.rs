//! Visibility Observer
//!
//! Turns "row became visible" events into preload requests. A page id is
//! scheduled on its first visibility after being observed, after which it is
//! no longer watched, so scroll jitter does not schedule it again.
//!
//! This is the library entry point for front-ends that embed the preloader.
//! The HTTP surface has no visibility events, so `POST /preload/:page_id`
//! goes to the scheduler directly. An embedding UI builds one observer over
//! `AppState::preloader`, calls `observe` as result rows render and
//! `mark_visible` from its viewport callback.

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::preload::PreloadScheduler;

pub struct VisibilityObserver {
    scheduler: PreloadScheduler,
    watched: Mutex<HashSet<String>>,
}

impl VisibilityObserver {
    pub fn new(scheduler: PreloadScheduler) -> Self {
        Self {
            scheduler,
            watched: Mutex::new(HashSet::new()),
        }
    }

    /// Starts watching a rendered result row.
    pub fn observe(&self, page_id: impl Into<String>) {
        self.watched.lock().insert(page_id.into());
    }

    /// Stops watching without scheduling, e.g. when the row is removed.
    pub fn unobserve(&self, page_id: &str) -> bool {
        self.watched.lock().remove(page_id)
    }

    pub fn watched(&self) -> usize {
        self.watched.lock().len()
    }

    /// Handles a visibility event. Returns whether a preload was scheduled.
    pub async fn mark_visible(&self, page_id: &str) -> bool {
        if !self.watched.lock().remove(page_id) {
            return false;
        }
        self.scheduler.schedule(page_id).await
    }

    /// Tears down the view: forgets every watched row and drops queued preloads.
    pub fn disconnect(&self) {
        self.watched.lock().clear();
        self.scheduler.cancel_pending();
    }
}
