//! Cache Store Module
//!
//! A named, string-keyed map of expiring entries. Expiry is checked lazily on
//! every read; capacity is only enforced when the store is swept.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};

// == Sweep Policy ==
/// Capacity bounds applied at sweep time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPolicy {
    /// Size above which a sweep starts evicting
    pub soft_limit: usize,
    /// Size a capacity eviction shrinks the store down to
    pub target_size: usize,
}

impl Default for SweepPolicy {
    fn default() -> Self {
        Self {
            soft_limit: 1000,
            target_size: 800,
        }
    }
}

// == Sweep Report ==
/// Outcome of sweeping a single store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub store: String,
    pub before: usize,
    pub after: usize,
    pub expired: usize,
    pub evicted: usize,
}

// == Cache Store ==
/// Expiring key-value storage for one category of upstream data.
#[derive(Debug)]
pub struct CacheStore {
    /// Store name used in logs and stats
    name: String,
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL applied when the caller does not give one
    default_ttl: Duration,
    /// Capacity bounds enforced by `sweep`
    policy: SweepPolicy,
    /// Time source
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store using the wall clock.
    pub fn new(name: impl Into<String>, default_ttl: Duration, policy: SweepPolicy) -> Self {
        Self::with_clock(name, default_ttl, policy, Arc::new(SystemClock))
    }

    /// Creates a store reading time from `clock`.
    pub fn with_clock(
        name: impl Into<String>,
        default_ttl: Duration,
        policy: SweepPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
            policy,
            clock,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Set ==
    /// Stores a value, overwriting any previous entry for `key`.
    ///
    /// The entry expires `ttl` from now (the store default when `None`) and
    /// starts with no recorded reads.
    pub fn set(&mut self, key: String, value: Value, ttl: Option<Duration>) {
        let now = self.clock.now_ms();
        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl), now);
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the live value for `key`, if any.
    ///
    /// An expired entry is removed and reported as a miss. A hit bumps the
    /// entry's access count and last-access time.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = self.clock.now_ms();

        let expired = match self.entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.touch(now);
                self.stats.record_hit();
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
        }
        self.stats.record_miss();
        None
    }

    // == Peek ==
    /// Returns the stored entry without touching it or checking expiry.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    // == Contains ==
    /// Returns true if `key` holds a live entry. Does not count as a read.
    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Sweep ==
    /// Purges expired entries, then shrinks the store to the target size if it
    /// is still above the soft limit, dropping least recently accessed first.
    pub fn sweep(&mut self) -> SweepReport {
        let now = self.clock.now_ms();
        let before = self.entries.len();

        self.entries.retain(|_, entry| !entry.is_expired(now));
        let expired = before - self.entries.len();

        let mut evicted = 0;
        if self.entries.len() > self.policy.soft_limit {
            let mut by_age: Vec<(u64, String)> = self
                .entries
                .iter()
                .map(|(key, entry)| (entry.last_accessed, key.clone()))
                .collect();
            by_age.sort_unstable();

            let excess = self.entries.len().saturating_sub(self.policy.target_size);
            for (_, key) in by_age.into_iter().take(excess) {
                self.entries.remove(&key);
                evicted += 1;
            }
        }

        self.stats.record_expirations(expired);
        self.stats.record_evictions(evicted);
        self.stats.record_sweep();
        self.stats.set_total_entries(self.entries.len());

        SweepReport {
            store: self.name.clone(),
            before,
            after: self.entries.len(),
            expired,
            evicted,
        }
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
