//! Pending Request Module
//!
//! Tracks a single in-flight fetch for a key.

use futures::future::{BoxFuture, Shared};

use crate::error::FetchError;

/// Settled outcome shared by every caller that joined one fetch.
pub type FetchOutcome<V> = Result<V, FetchError>;

/// Cloneable handle to the outcome of an in-flight fetch.
pub type SharedOutcome<V> = Shared<BoxFuture<'static, FetchOutcome<V>>>;

// == Pending Request ==
/// An in-flight fetch registered for a key.
///
/// `generation` identifies this particular invocation. Write-back after the
/// fetch settles only happens while the same generation is still the one
/// tracked for the key.
pub struct PendingRequest<V> {
    /// Unique invocation token within the owning cache
    pub generation: u64,
    /// Outcome shared with every joined caller
    pub outcome: SharedOutcome<V>,
}

impl<V> PendingRequest<V> {
    pub fn new(generation: u64, outcome: SharedOutcome<V>) -> Self {
        Self {
            generation,
            outcome,
        }
    }
}

impl<V> std::fmt::Debug for PendingRequest<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
