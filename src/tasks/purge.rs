//! Expiry Purge Task
//!
//! Background task that periodically reclaims memory held by stale entries.
//! Freshness is still checked on every read, so the task is optional.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::KeyedFetchCache;

/// Spawns a background task that periodically purges expired cache entries.
///
/// The task runs in an infinite loop, sleeping for `interval` between runs.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache: KeyedFetchCache<String> = KeyedFetchCache::new();
/// let purge_handle = spawn_purge_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// purge_handle.abort();
/// ```
pub fn spawn_purge_task<V>(cache: KeyedFetchCache<V>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            "Starting cache purge task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired();
            if removed > 0 {
                info!("Cache purge: removed {} expired entries", removed);
            } else {
                debug!("Cache purge: no expired entries found");
            }
        }
    })
}
