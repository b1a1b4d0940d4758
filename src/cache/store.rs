//! Cache Store Module
//!
//! Keyed fetch cache: fresh entries are served from memory, misses start a
//! single fetch per key and every concurrent caller for that key shares its
//! outcome.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::pending::{FetchOutcome, PendingRequest, SharedOutcome};
use crate::cache::{CacheEntry, CacheStats, DEFAULT_TTL};
use crate::error::FetchError;

// == Internal State ==
/// Everything guarded by the cache lock. The lock is never held across an await.
struct CacheState<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// In-flight fetches, at most one per key
    pending: HashMap<String, PendingRequest<V>>,
    /// Performance statistics
    stats: CacheStats,
    /// Last generation handed out to a pending request
    last_generation: u64,
}

impl<V: Clone> CacheState<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            pending: HashMap::new(),
            stats: CacheStats::new(),
            last_generation: 0,
        }
    }

    fn fresh_value(&self, key: &str, now: Instant) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh_at(now))
            .map(|entry| entry.value.clone())
    }

    fn insert(&mut self, key: String, value: V, ttl: Duration) {
        self.entries.insert(key, CacheEntry::new(value, ttl));
        self.stats.set_total_entries(self.entries.len());
    }

    fn next_generation(&mut self) -> u64 {
        self.last_generation += 1;
        self.last_generation
    }

    fn is_current(&self, key: &str, generation: u64) -> bool {
        self.pending
            .get(key)
            .is_some_and(|pending| pending.generation == generation)
    }
}

/// Result of the synchronous part of a lookup.
enum Lookup<V> {
    Hit(V),
    Join(SharedOutcome<V>),
    Start {
        generation: u64,
        outcome: SharedOutcome<V>,
        sender: oneshot::Sender<FetchOutcome<V>>,
    },
}

// == Keyed Fetch Cache ==
/// In-memory TTL cache that coalesces concurrent fetches for the same key.
///
/// Cloning is cheap and every clone shares the same state, so one instance
/// can be built at startup and handed to every consumer.
///
/// Fetches are spawned on the tokio runtime: they run to completion and
/// clean up their bookkeeping even when every caller waiting on them has
/// been dropped.
pub struct KeyedFetchCache<V> {
    state: Arc<Mutex<CacheState<V>>>,
    default_ttl: Duration,
}

impl<V> Clone for KeyedFetchCache<V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            default_ttl: self.default_ttl,
        }
    }
}

impl<V> std::fmt::Debug for KeyedFetchCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("KeyedFetchCache")
            .field("entries", &state.entries.len())
            .field("pending", &state.pending.len())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl<V> Default for KeyedFetchCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyedFetchCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty cache using the five minute default TTL.
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    /// Creates an empty cache with a custom default TTL.
    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::new())),
            default_ttl,
        }
    }

    /// TTL applied by the `*_default` helpers.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Get ==
    /// Returns the cached value if the entry exists and is still fresh.
    ///
    /// Stale entries read as absent. Reading never extends an entry's expiry.
    pub fn get(&self, key: &str) -> Option<V> {
        self.state.lock().fresh_value(key, Instant::now())
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`, unconditionally replacing any
    /// previous entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.state.lock().insert(key.into(), value, ttl);
    }

    /// Stores `value` under `key` with the default TTL.
    pub fn set_default(&self, key: impl Into<String>, value: V) {
        self.set(key, value, self.default_ttl);
    }

    // == Invalidate ==
    /// Removes every entry whose key starts with `prefix`.
    ///
    /// In-flight fetches are left alone: a fetch that settles afterwards
    /// still stores its result.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&self, prefix: &str) -> usize {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let before = state.entries.len();
        state.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - state.entries.len();

        state.stats.record_invalidated(removed);
        state.stats.set_total_entries(state.entries.len());
        info!(prefix, removed, "invalidated cache entries");
        removed
    }

    // == Clear ==
    /// Drops every entry and forgets every in-flight fetch.
    ///
    /// Fetches already started keep running; their callers still receive the
    /// outcome but nothing is written back into the cache.
    pub fn clear(&self) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let entries = state.entries.len();
        let pending = state.pending.len();
        state.entries.clear();
        state.pending.clear();
        state.stats.set_total_entries(0);
        info!(entries, pending, "cache cleared");
    }

    // == Is Loading ==
    /// Returns true while a fetch for `key` is in flight.
    pub fn is_loading(&self, key: &str) -> bool {
        self.state.lock().pending.contains_key(key)
    }

    // == Time To Live ==
    /// Returns how long the entry for `key` stays fresh, or `None` if there
    /// is no fresh entry.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.state
            .lock()
            .entries
            .get(key)
            .filter(|entry| entry.is_fresh_at(now))
            .map(|entry| entry.expires_at - now)
    }

    // == Purge Expired ==
    /// Physically removes stale entries.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.is_fresh_at(now));
        state.stats.set_total_entries(state.entries.len());
        before - state.entries.len()
    }

    // == Length ==
    /// Returns the number of stored entries, including stale ones not yet purged.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    // == Cached Api Call ==
    /// Returns the value for `key`, fetching it at most once concurrently.
    ///
    /// 1. A fresh entry is returned without calling `fetch`.
    /// 2. If a fetch for `key` is already in flight, its outcome is awaited.
    /// 3. Otherwise `fetch` is invoked and spawned. A success is stored for
    ///    `ttl`; a failure is handed to every waiter and nothing is stored.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn cached_api_call<F, Fut, E>(
        &self,
        key: &str,
        fetch: F,
        ttl: Duration,
    ) -> Result<V, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        match self.lookup(key) {
            Lookup::Hit(value) => Ok(value),
            Lookup::Join(outcome) => outcome.await,
            Lookup::Start {
                generation,
                outcome,
                sender,
            } => {
                self.start_fetch(key.to_owned(), generation, fetch, ttl, sender);
                outcome.await
            }
        }
    }

    /// Same as [`cached_api_call`](Self::cached_api_call) with the default TTL.
    pub async fn cached_api_call_default<F, Fut, E>(
        &self,
        key: &str,
        fetch: F,
    ) -> Result<V, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cached_api_call(key, fetch, self.default_ttl).await
    }

    /// Hit, join, or register a new pending request, all under one lock.
    fn lookup(&self, key: &str) -> Lookup<V> {
        let mut state = self.state.lock();

        if let Some(value) = state.fresh_value(key, Instant::now()) {
            state.stats.record_hit();
            debug!(key, "cache hit");
            return Lookup::Hit(value);
        }
        state.stats.record_miss();

        if let Some(pending) = state.pending.get(key) {
            let generation = pending.generation;
            let outcome = pending.outcome.clone();
            state.stats.record_coalesced();
            debug!(key, generation, "joining in-flight fetch");
            return Lookup::Join(outcome);
        }

        let generation = state.next_generation();
        let (sender, receiver) = oneshot::channel();
        let outcome = async move { receiver.await.unwrap_or(Err(FetchError::Cancelled)) }
            .boxed()
            .shared();
        state.pending.insert(
            key.to_owned(),
            PendingRequest::new(generation, outcome.clone()),
        );
        state.stats.record_fetch();
        debug!(key, generation, "cache miss, starting fetch");

        Lookup::Start {
            generation,
            outcome,
            sender,
        }
    }

    fn start_fetch<F, Fut, E>(
        &self,
        key: String,
        generation: u64,
        fetch: F,
        ttl: Duration,
        sender: oneshot::Sender<FetchOutcome<V>>,
    ) where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let guard = SettleGuard::new(self.clone(), key, generation);

        let future = match std::panic::catch_unwind(AssertUnwindSafe(fetch)) {
            Ok(future) => future,
            Err(panic) => {
                let outcome = Err(FetchError::panicked(panic));
                guard.settle(&outcome, ttl);
                let _ = sender.send(outcome);
                return;
            }
        };

        tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(future).catch_unwind().await {
                Ok(result) => result.map_err(FetchError::upstream),
                Err(panic) => Err(FetchError::panicked(panic)),
            };
            guard.settle(&outcome, ttl);
            // Waiters may all be gone by now.
            let _ = sender.send(outcome);
        });
    }

    /// Commits a settled outcome if `generation` is still the tracked request.
    fn settle(&self, key: &str, generation: u64, outcome: &FetchOutcome<V>, ttl: Duration) {
        let mut state = self.state.lock();

        if let Err(error) = outcome {
            state.stats.record_failure();
            warn!(key, generation, %error, "fetch failed");
        }

        if !state.is_current(key, generation) {
            state.stats.record_stale_discard();
            warn!(key, generation, "discarding outcome of abandoned fetch");
            return;
        }

        state.pending.remove(key);
        if let Ok(value) = outcome {
            state.insert(key.to_owned(), value.clone(), ttl);
            debug!(key, generation, ?ttl, "fetch settled, value cached");
        }
    }

    /// Drops the pending request without writing anything.
    fn release(&self, key: &str, generation: u64) {
        let mut state = self.state.lock();
        if state.is_current(key, generation) {
            state.pending.remove(key);
            warn!(key, generation, "fetch dropped before settling");
        }
    }
}

// == Settle Guard ==
/// Guarantees the pending request is removed even if the fetch task is
/// dropped before it settles (runtime shutdown).
struct SettleGuard<V>
where
    V: Clone + Send + Sync + 'static,
{
    cache: KeyedFetchCache<V>,
    key: String,
    generation: u64,
    settled: bool,
}

impl<V> SettleGuard<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn new(cache: KeyedFetchCache<V>, key: String, generation: u64) -> Self {
        Self {
            cache,
            key,
            generation,
            settled: false,
        }
    }

    fn settle(mut self, outcome: &FetchOutcome<V>, ttl: Duration) {
        self.settled = true;
        self.cache.settle(&self.key, self.generation, outcome, ttl);
    }
}

impl<V> Drop for SettleGuard<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if !self.settled {
            self.cache.release(&self.key, self.generation);
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(60);

    async fn wait_until_loading<V>(cache: &KeyedFetchCache<V>, key: &str)
    where
        V: Clone + Send + Sync + 'static,
    {
        while !cache.is_loading(key) {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_store_new() {
        let cache: KeyedFetchCache<String> = KeyedFetchCache::new();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.default_ttl(), DEFAULT_TTL);
    }

    #[tokio::test]
    async fn test_store_set_and_get() {
        let cache = KeyedFetchCache::new();

        cache.set("key1", "value1".to_string(), TTL);

        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_store_get_nonexistent() {
        let cache: KeyedFetchCache<String> = KeyedFetchCache::new();
        assert_eq!(cache.get("nonexistent"), None);
    }

    #[tokio::test]
    async fn test_store_overwrite() {
        let cache = KeyedFetchCache::new();

        cache.set("key1", "value1".to_string(), TTL);
        cache.set("key1", "value2".to_string(), TTL);

        assert_eq!(cache.get("key1"), Some("value2".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_get_does_not_extend_expiry() {
        let cache = KeyedFetchCache::new();
        cache.set("key1", 1u32, Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(cache.get("key1"), Some(1));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(cache.get("key1"), None);
        // Stale entries stay until purged or overwritten
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_set_default_uses_default_ttl() {
        let cache = KeyedFetchCache::with_default_ttl(Duration::from_secs(30));
        cache.set_default("key1", 7u32);

        assert_eq!(cache.ttl_remaining("key1"), Some(Duration::from_secs(30)));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.ttl_remaining("key1"), None);
    }

    #[tokio::test]
    async fn test_store_invalidate_prefix_is_case_sensitive() {
        let cache = KeyedFetchCache::new();
        cache.set("products_1", 1u32, TTL);
        cache.set("Products_2", 2u32, TTL);
        cache.set("orders_products_3", 3u32, TTL);

        let removed = cache.invalidate("products_");

        assert_eq!(removed, 1);
        assert_eq!(cache.get("products_1"), None);
        assert_eq!(cache.get("Products_2"), Some(2));
        assert_eq!(cache.get("orders_products_3"), Some(3));
        assert_eq!(cache.stats().invalidated, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_purge_expired() {
        let cache = KeyedFetchCache::new();
        cache.set("short", 1u32, Duration::from_secs(1));
        cache.set("long", 2u32, Duration::from_secs(10));

        tokio::time::advance(Duration::from_millis(1100)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("long"), Some(2));
    }

    #[tokio::test]
    async fn test_cached_call_stores_result() {
        let cache = KeyedFetchCache::new();

        let value = cache
            .cached_api_call("key", || async { Ok::<_, io::Error>(42u32) }, TTL)
            .await
            .unwrap();

        assert_eq!(value, 42);
        assert_eq!(cache.get("key"), Some(42));
        assert!(!cache.is_loading("key"));

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.fetches, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_cached_call_default_ttl() {
        let cache = KeyedFetchCache::with_default_ttl(Duration::from_secs(120));

        cache
            .cached_api_call_default("key", || async { Ok::<_, io::Error>("v") })
            .await
            .unwrap();

        let remaining = cache.ttl_remaining("key").unwrap();
        assert!(remaining <= Duration::from_secs(120));
        assert!(remaining > Duration::from_secs(119));
    }

    #[tokio::test]
    async fn test_cached_call_propagates_error_message() {
        let cache: KeyedFetchCache<u32> = KeyedFetchCache::new();

        let err = cache
            .cached_api_call(
                "key",
                || async { Err::<u32, _>(io::Error::new(io::ErrorKind::Other, "backend down")) },
                TTL,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Upstream(_)));
        assert!(err.to_string().contains("backend down"));
        assert_eq!(
            err.downcast_ref::<io::Error>().map(|e| e.kind()),
            Some(io::ErrorKind::Other)
        );
        assert_eq!(cache.len(), 0);
        assert!(!cache.is_loading("key"));
        assert_eq!(cache.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_cached_call_panicking_future_clears_loading() {
        let cache: KeyedFetchCache<u32> = KeyedFetchCache::new();

        let err = cache
            .cached_api_call(
                "key",
                || async {
                    if true {
                        panic!("fetch exploded");
                    }
                    Ok::<u32, io::Error>(1)
                },
                TTL,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Panicked(ref msg) if msg.contains("fetch exploded")));
        assert!(!cache.is_loading("key"));
    }

    #[tokio::test]
    async fn test_cached_call_panicking_closure_clears_loading() {
        let cache: KeyedFetchCache<u32> = KeyedFetchCache::new();

        let err = cache
            .cached_api_call(
                "key",
                || -> futures::future::Ready<Result<u32, io::Error>> { panic!("closure exploded") },
                TTL,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Panicked(_)));
        assert!(!cache.is_loading("key"));

        // The key is usable again afterwards
        let value = cache
            .cached_api_call("key", || async { Ok::<_, io::Error>(5u32) }, TTL)
            .await
            .unwrap();
        assert_eq!(value, 5);
    }

    #[tokio::test]
    async fn test_fetch_completes_after_waiter_is_dropped() {
        let cache: KeyedFetchCache<u32> = KeyedFetchCache::new();
        let (tx, rx) = oneshot::channel::<u32>();

        let waiter = tokio::spawn({
            let cache = cache.clone();
            async move {
                cache
                    .cached_api_call("key", move || async move { Ok::<_, io::Error>(rx.await.unwrap()) }, TTL)
                    .await
            }
        });
        wait_until_loading(&cache, "key").await;

        waiter.abort();
        let _ = waiter.await;
        assert!(cache.is_loading("key"));

        tx.send(9).unwrap();
        while cache.is_loading("key") {
            tokio::task::yield_now().await;
        }
        assert_eq!(cache.get("key"), Some(9));
    }

    #[tokio::test]
    async fn test_abandoned_fetch_does_not_overwrite_newer_request() {
        let cache: KeyedFetchCache<String> = KeyedFetchCache::new();
        let (old_tx, old_rx) = oneshot::channel::<String>();
        let (new_tx, new_rx) = oneshot::channel::<String>();

        let first = tokio::spawn({
            let cache = cache.clone();
            async move {
                cache
                    .cached_api_call("k", move || async move { Ok::<_, io::Error>(old_rx.await.unwrap()) }, TTL)
                    .await
            }
        });
        wait_until_loading(&cache, "k").await;

        cache.clear();
        assert!(!cache.is_loading("k"));

        let second = tokio::spawn({
            let cache = cache.clone();
            async move {
                cache
                    .cached_api_call("k", move || async move { Ok::<_, io::Error>(new_rx.await.unwrap()) }, TTL)
                    .await
            }
        });
        wait_until_loading(&cache, "k").await;

        // The abandoned fetch settles first; its caller still gets its own value
        old_tx.send("stale".to_string()).unwrap();
        assert_eq!(first.await.unwrap().unwrap(), "stale");
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_loading("k"));

        new_tx.send("fresh".to_string()).unwrap();
        assert_eq!(second.await.unwrap().unwrap(), "fresh");
        assert_eq!(cache.get("k"), Some("fresh".to_string()));
        assert_eq!(cache.stats().stale_discards, 1);
    }

    #[tokio::test]
    async fn test_invalidate_does_not_touch_in_flight_fetch() {
        let cache: KeyedFetchCache<u32> = KeyedFetchCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = oneshot::channel::<u32>();

        let waiter = tokio::spawn({
            let cache = cache.clone();
            let calls = calls.clone();
            async move {
                cache
                    .cached_api_call(
                        "products_1",
                        move || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            async move { Ok::<_, io::Error>(rx.await.unwrap()) }
                        },
                        TTL,
                    )
                    .await
            }
        });
        wait_until_loading(&cache, "products_1").await;

        cache.invalidate("products_");
        assert!(cache.is_loading("products_1"));

        tx.send(3).unwrap();
        assert_eq!(waiter.await.unwrap().unwrap(), 3);
        assert_eq!(cache.get("products_1"), Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_set_with_unbounded_ttl() {
        let cache = KeyedFetchCache::new();

        cache.set("key1", 1u32, Duration::MAX);

        assert_eq!(cache.get("key1"), Some(1));
        assert!(cache.ttl_remaining("key1").is_some());
    }

    #[tokio::test]
    async fn test_cached_call_with_unbounded_ttl() {
        let cache: KeyedFetchCache<u32> = KeyedFetchCache::new();

        let value = cache
            .cached_api_call("key", || async { Ok::<_, io::Error>(7) }, Duration::MAX)
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(cache.get("key"), Some(7));
        assert!(!cache.is_loading("key"));
    }

    #[test]
    fn test_runtime_shutdown_releases_pending_fetch() {
        let fetch_runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let waiter_runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let cache: KeyedFetchCache<u32> = KeyedFetchCache::new();

        // The fetch task lives on the runtime that gets shut down
        fetch_runtime.block_on({
            let cache = cache.clone();
            async move {
                tokio::spawn({
                    let cache = cache.clone();
                    async move {
                        cache
                            .cached_api_call(
                                "key",
                                || std::future::pending::<Result<u32, io::Error>>(),
                                TTL,
                            )
                            .await
                    }
                });
                wait_until_loading(&cache, "key").await;
            }
        });

        let follower = waiter_runtime.spawn({
            let cache = cache.clone();
            async move {
                cache
                    .cached_api_call("key", || async { Ok::<_, io::Error>(1) }, TTL)
                    .await
            }
        });
        waiter_runtime.block_on(async {
            while cache.stats().coalesced == 0 {
                tokio::task::yield_now().await;
            }
        });

        fetch_runtime.shutdown_background();
        assert!(!cache.is_loading("key"));

        let err = waiter_runtime.block_on(follower).unwrap().unwrap_err();
        assert!(matches!(err, FetchError::Cancelled));
        assert_eq!(cache.get("key"), None);
        assert_eq!(cache.stats().fetches, 1);
    }
}
