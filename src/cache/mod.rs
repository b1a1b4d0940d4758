//! Cache Module
//!
//! Provides an in-memory keyed fetch cache with TTL expiration and
//! per-key request coalescing.

mod entry;
mod pending;
mod stats;
mod store;


use std::time::Duration;

// Re-export public types
pub use entry::CacheEntry;
pub use pending::FetchOutcome;
pub use stats::CacheStats;
pub use store::KeyedFetchCache;

// == Public Constants ==
/// TTL used when a caller does not pick one
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
