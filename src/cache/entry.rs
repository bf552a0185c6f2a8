//! Cache Entry Module
//!
//! Defines the expiring entry stored in every cache store, along with its
//! access bookkeeping.

use std::time::Duration;

use serde_json::Value;

use super::clock::duration_ms;

// == Cache Entry ==
/// A cached payload with its expiry and access metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Successful reads since the entry was (re)written
    pub access_count: u64,
    /// Timestamp of the most recent successful read, or of the write
    pub last_accessed: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` after `now`.
    pub fn new(value: Value, ttl: Duration, now: u64) -> Self {
        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(duration_ms(ttl)),
            access_count: 0,
            last_accessed: now,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is still live at exactly `expires_at`; it expires strictly after.
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }

    // == Touch ==
    /// Records a successful read at `now`.
    pub fn touch(&mut self, now: u64) {
        self.access_count += 1;
        self.last_accessed = now;
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}
