//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

/// Stand-in expiry for TTLs too large to add to the clock (~30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

// == Cache Entry ==
/// Represents a single cached value with its freshness window.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Instant the value was written
    pub created_at: Instant,
    /// Instant after which the value is stale
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry that stays fresh for `ttl`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - How long the value stays fresh
    ///
    /// A `ttl` that would overflow the clock keeps the entry fresh
    /// indefinitely instead of panicking.
    pub fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).unwrap_or_else(|| now + FAR_FUTURE);

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Fresh ==
    /// Checks whether the entry is still fresh at `now`.
    ///
    /// Boundary condition: an entry is fresh only while `now < expires_at`.
    /// Once the TTL has fully elapsed the entry is stale and treated as absent.
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    // == Is Expired ==
    /// Checks if the entry has expired against the current clock.
    pub fn is_expired(&self) -> bool {
        !self.is_fresh_at(Instant::now())
    }

    // == Time To Live ==
    /// Returns the remaining freshness, saturating at zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
