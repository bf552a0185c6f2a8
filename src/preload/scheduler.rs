//! Preload Scheduler
//!
//! Warms the page store ahead of user interaction. Page ids are queued FIFO
//! and fetched with at most `max_concurrent` fetches in flight; results land
//! in the page store, failures are dropped.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::cache::{page_key, SharedStore};
use crate::preload::PageFetcher;

/// Default number of concurrent preload fetches.
pub const MAX_CONCURRENT_PRELOADS: usize = 3;

// == Queue State ==
#[derive(Debug, Default)]
struct QueueState {
    /// Page ids waiting to be fetched, oldest first
    pending: VecDeque<String>,
    /// Page ids currently being fetched
    in_flight: HashSet<String>,
}

impl QueueState {
    fn is_tracked(&self, page_id: &str) -> bool {
        self.in_flight.contains(page_id) || self.pending.iter().any(|id| id == page_id)
    }

    fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_empty()
    }
}

struct Inner {
    state: Mutex<QueueState>,
    pages: SharedStore,
    fetcher: Arc<dyn PageFetcher>,
    max_concurrent: usize,
    idle: Notify,
}

// == Preload Scheduler ==
/// Bounded-concurrency page preloader. Cloning shares the same queue.
#[derive(Clone)]
pub struct PreloadScheduler {
    inner: Arc<Inner>,
}

impl PreloadScheduler {
    // == Constructor ==
    /// Creates a scheduler writing into `pages`. A concurrency of 0 is raised to 1.
    pub fn new(pages: SharedStore, fetcher: Arc<dyn PageFetcher>, max_concurrent: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState::default()),
                pages,
                fetcher,
                max_concurrent: max_concurrent.max(1),
                idle: Notify::new(),
            }),
        }
    }

    // == Schedule ==
    /// Queues `page_id` for preloading.
    ///
    /// No-op if the page is already cached, queued or being fetched. Returns
    /// whether the id was queued. The cache is checked again when the id is
    /// dequeued, so a page cached in between is never fetched.
    pub async fn schedule(&self, page_id: &str) -> bool {
        if self.inner.pages.read().await.contains(&page_key(page_id)) {
            debug!("Preload skipped, page already cached: {}", page_id);
            return false;
        }

        {
            let mut state = self.inner.state.lock();
            if state.is_tracked(page_id) {
                return false;
            }
            state.pending.push_back(page_id.to_string());
        }

        debug!("Preload scheduled: {}", page_id);
        Inner::start_pending(&self.inner);
        true
    }

    /// Number of queued, not yet started preloads.
    pub fn pending(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Number of preload fetches currently running.
    pub fn in_flight(&self) -> usize {
        self.inner.state.lock().in_flight.len()
    }

    // == Cancel Pending ==
    /// Drops every queued preload. Fetches already running are left to finish.
    pub fn cancel_pending(&self) -> usize {
        let dropped = {
            let mut state = self.inner.state.lock();
            let dropped = state.pending.len();
            state.pending.clear();
            if state.is_idle() {
                self.inner.idle.notify_waiters();
            }
            dropped
        };
        if dropped > 0 {
            debug!("Dropped {} pending preloads", dropped);
        }
        dropped
    }

    // == Wait Idle ==
    /// Resolves once nothing is queued or in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.inner.state.lock().is_idle() {
                return;
            }
            notified.await;
        }
    }
}

impl Inner {
    /// Starts queued preloads until the queue is empty or the cap is reached.
    fn start_pending(this: &Arc<Inner>) {
        let mut state = this.state.lock();
        while state.in_flight.len() < this.max_concurrent {
            let Some(page_id) = state.pending.pop_front() else {
                break;
            };
            state.in_flight.insert(page_id.clone());

            let inner = Arc::clone(this);
            tokio::spawn(async move {
                // The fetch runs in its own task, a panicking fetcher surfaces
                // as a JoinError and the slot is still released
                let fetch = tokio::spawn({
                    let inner = Arc::clone(&inner);
                    let page_id = page_id.clone();
                    async move { inner.preload(&page_id).await }
                });
                if let Err(err) = fetch.await {
                    warn!("Preload task for {} failed: {}", page_id, err);
                }
                inner.finish(&page_id);
            });
        }
    }

    async fn preload(&self, page_id: &str) {
        // May have been cached on demand while it sat in the queue
        if self.pages.read().await.contains(&page_key(page_id)) {
            debug!("Preload skipped, page cached while queued: {}", page_id);
            return;
        }

        match self.fetcher.fetch(page_id).await {
            Ok(page) => {
                self.pages.write().await.set(page_key(page_id), page, None);
                debug!("Preloaded page: {}", page_id);
            }
            Err(err) => {
                debug!("Preload failed for {}, discarding: {}", page_id, err);
            }
        }
    }

    fn finish(self: &Arc<Self>, page_id: &str) {
        {
            let mut state = self.state.lock();
            if !state.in_flight.remove(page_id) {
                warn!("Finished preload was not tracked as in flight: {}", page_id);
            }
            if state.is_idle() {
                self.idle.notify_waiters();
            }
        }
        Inner::start_pending(self);
    }
}
