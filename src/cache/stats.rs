//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and coalesced fetches.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups answered from a fresh entry
    pub hits: u64,
    /// Lookups that found no fresh entry
    pub misses: u64,
    /// Misses that joined an already in-flight fetch
    pub coalesced: u64,
    /// Fetches actually started
    pub fetches: u64,
    /// Fetches that settled with an error
    pub failures: u64,
    /// Settled fetches whose result was dropped because the key was cleared or re-registered
    pub stale_discards: u64,
    /// Entries removed through prefix invalidation
    pub invalidated: u64,
    /// Current number of stored entries (fresh or not yet purged)
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_coalesced(&mut self) {
        self.coalesced += 1;
    }

    pub fn record_fetch(&mut self) {
        self.fetches += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn record_stale_discard(&mut self) {
        self.stale_discards += 1;
    }

    pub fn record_invalidated(&mut self, count: usize) {
        self.invalidated += count as u64;
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
