//! Keyed, cached, deduplicated remote reads
//!
//! A [`QueryCache`] holds one entry per key. Concurrent fetches of the same
//! key share a single in-flight future; the last successful payload stays
//! readable while a refetch runs, and a failed refetch keeps it. Entries
//! nobody has fetched for a while are dropped on the next fetch.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::api::TmdbError;

/// Shared error handed to every waiter of a failed fetch
pub type QueryError = Arc<TmdbError>;

/// Outcome of a fetch
pub type QueryResult<V> = Result<Arc<V>, QueryError>;

type InFlight<V> = Shared<BoxFuture<'static, QueryResult<V>>>;

/// Settled entries are kept for this many `max_age` periods
const RETAIN_FACTOR: u32 = 5;

/// Lower bound on retention so a zero `max_age` does not drop live entries
const MIN_RETAIN: Duration = Duration::from_secs(60);

/// Snapshot of one cache entry
#[derive(Debug)]
pub struct QueryState<V> {
    /// Last successful payload for the key
    pub data: Option<Arc<V>>,
    /// True while nothing is cached yet and a request is in flight
    pub is_fetching: bool,
    /// True while cached data is shown and a refetch is in flight
    pub is_refetching: bool,
    /// Error of the most recent fetch, cleared by the next success
    pub error: Option<QueryError>,
    /// Grows on every successful store, also across eviction; 0 means never loaded
    pub version: u64,
}

impl<V> Default for QueryState<V> {
    fn default() -> Self {
        Self {
            data: None,
            is_fetching: false,
            is_refetching: false,
            error: None,
            version: 0,
        }
    }
}

impl<V> Clone for QueryState<V> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            is_fetching: self.is_fetching,
            is_refetching: self.is_refetching,
            error: self.error.clone(),
            version: self.version,
        }
    }
}

impl<V> QueryState<V> {
    /// Payload, or `None` when not loaded
    pub fn data(&self) -> Option<&V> {
        self.data.as_deref()
    }
}

struct Entry<V> {
    data: Option<Arc<V>>,
    error: Option<QueryError>,
    version: u64,
    fetched_at: Option<Instant>,
    settled_at: Option<Instant>,
    stale: bool,
    in_flight: Option<(u64, InFlight<V>)>,
}

impl<V> Entry<V> {
    fn is_expired(&self, retain: Duration) -> bool {
        self.in_flight.is_none() && self.settled_at.is_some_and(|t| t.elapsed() >= retain)
    }
}

impl<V> Default for Entry<V> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            version: 0,
            fetched_at: None,
            settled_at: None,
            stale: false,
            in_flight: None,
        }
    }
}

/// Cache of remote reads keyed by their full argument set
pub struct QueryCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    max_age: Duration,
    retain: Duration,
    next_request: AtomicU64,
}

impl<K, V> fmt::Debug for QueryCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.lock().len();
        f.debug_struct("QueryCache")
            .field("entries", &len)
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl<K, V> QueryCache<K, V> {
    /// Create a cache whose entries are fresh for `max_age`
    pub fn new(max_age: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_age,
            retain: (max_age * RETAIN_FACTOR).max(MIN_RETAIN),
            next_request: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        // Entries hold no invariants a panicking writer could break halfway.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Send + Sync + 'static,
{
    /// Current state of `key`
    pub fn snapshot(&self, key: &K) -> QueryState<V> {
        let entries = self.lock();
        let Some(entry) = entries.get(key) else {
            return QueryState::default();
        };
        let in_flight = entry.in_flight.is_some();
        QueryState {
            data: entry.data.clone(),
            is_fetching: in_flight && entry.data.is_none(),
            is_refetching: in_flight && entry.data.is_some(),
            error: entry.error.clone(),
            version: entry.version,
        }
    }

    /// Whether `key` has data younger than `max_age` and is not invalidated
    pub fn is_fresh(&self, key: &K) -> bool {
        self.fresh_data(key).is_some()
    }

    fn fresh_data(&self, key: &K) -> Option<Arc<V>> {
        let entries = self.lock();
        entries
            .get(key)
            .filter(|e| !e.stale && e.fetched_at.is_some_and(|t| t.elapsed() < self.max_age))
            .and_then(|e| e.data.clone())
    }

    /// Mark `key` stale so the next [`ensure`](Self::ensure) refetches it
    ///
    /// Cached data stays readable until the refetch succeeds.
    pub fn invalidate(&self, key: &K) {
        if let Some(entry) = self.lock().get_mut(key) {
            entry.stale = true;
        }
    }

    /// Return fresh cached data, or fetch it
    pub async fn ensure<F, Fut>(&self, key: K, fetcher: F) -> QueryResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, TmdbError>> + Send + 'static,
    {
        if let Some(data) = self.fresh_data(&key) {
            return Ok(data);
        }
        self.fetch(key, fetcher).await
    }

    /// Fetch `key`, joining a request already in flight for it
    ///
    /// `fetcher` is only invoked when no request for the key is in flight.
    pub async fn fetch<F, Fut>(&self, key: K, fetcher: F) -> QueryResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, TmdbError>> + Send + 'static,
    {
        let (request_id, shared) = {
            let mut entries = self.lock();
            let retain = self.retain;
            entries.retain(|k, entry| k == &key || !entry.is_expired(retain));
            let entry = entries.entry(key.clone()).or_default();
            match &entry.in_flight {
                Some((id, fut)) => (*id, fut.clone()),
                None => {
                    let id = self.next_request.fetch_add(1, Ordering::Relaxed);
                    let fut = fetcher()
                        .map(|r| r.map(Arc::new).map_err(Arc::new))
                        .boxed()
                        .shared();
                    entry.in_flight = Some((id, fut.clone()));
                    (id, fut)
                }
            }
        };

        let result = shared.await;
        self.settle(&key, request_id, &result);
        result
    }

    /// Store the outcome of a request; only the first waiter to settle it writes
    fn settle(&self, key: &K, request_id: u64, result: &QueryResult<V>) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if !matches!(entry.in_flight, Some((id, _)) if id == request_id) {
            return;
        }
        entry.in_flight = None;
        entry.settled_at = Some(Instant::now());

        match result {
            Ok(data) => {
                entry.data = Some(Arc::clone(data));
                entry.error = None;
                // Request ids are unique per cache, so a re-created entry
                // never repeats a version a reader has already seen.
                entry.version = request_id;
                entry.fetched_at = Some(Instant::now());
                entry.stale = false;
            }
            Err(e) => {
                entry.error = Some(Arc::clone(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn cache() -> QueryCache<u64, String> {
        QueryCache::new(Duration::from_secs(60))
    }

    #[test]
    fn test_unknown_key_is_idle() {
        let cache = cache();
        let state = cache.snapshot(&1);
        assert!(state.data.is_none());
        assert!(!state.is_fetching);
        assert!(state.error.is_none());
        assert_eq!(state.version, 0);
    }

    #[test]
    fn test_fetch_stores_data_and_bumps_version() {
        let cache = cache();
        let result = tokio_test::block_on(cache.fetch(1, || async { Ok("one".to_string()) }));

        assert_eq!(result.unwrap().as_str(), "one");
        let state = cache.snapshot(&1);
        assert_eq!(state.data().map(String::as_str), Some("one"));
        assert_eq!(state.version, 1);
        assert!(cache.is_fresh(&1));
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_call() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |calls: Arc<AtomicUsize>| {
            cache.fetch(7, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Ok("seven".to_string())
            })
        };

        let (a, b) = futures::join!(fetch(calls.clone()), fetch(calls.clone()));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap(), b.unwrap());
        // Settled once, not once per waiter
        assert_eq!(cache.snapshot(&7).version, 1);
    }

    #[tokio::test]
    async fn test_is_fetching_only_without_cached_data() {
        let cache = Arc::new(cache());
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let bg = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .fetch(3, || async move {
                        let _ = rx.await;
                        Ok("three".to_string())
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;

        assert!(cache.snapshot(&3).is_fetching);
        let _ = tx.send(());
        bg.await.unwrap().unwrap();

        let state = cache.snapshot(&3);
        assert!(!state.is_fetching);
        assert!(!state.is_refetching);
    }

    #[tokio::test]
    async fn test_refetch_serves_stale_data() {
        let cache = Arc::new(cache());
        cache.fetch(5, || async { Ok("old".to_string()) }).await.unwrap();

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let bg = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .fetch(5, || async move {
                        let _ = rx.await;
                        Ok("new".to_string())
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;

        let during = cache.snapshot(&5);
        assert_eq!(during.data().map(String::as_str), Some("old"));
        assert!(!during.is_fetching);
        assert!(during.is_refetching);

        let _ = tx.send(());
        bg.await.unwrap().unwrap();
        assert_eq!(cache.snapshot(&5).data().map(String::as_str), Some("new"));
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_data() {
        let cache = cache();
        cache.fetch(9, || async { Ok("good".to_string()) }).await.unwrap();
        let result = cache.fetch(9, || async { Err(TmdbError::ServerError(503)) }).await;

        assert!(result.is_err());
        let state = cache.snapshot(&9);
        assert_eq!(state.data().map(String::as_str), Some("good"));
        assert!(state.error.is_some());
        assert_eq!(state.version, 1);
    }

    #[tokio::test]
    async fn test_ensure_uses_fresh_cache_until_invalidated() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            cache
                .ensure(11, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("eleven".to_string())
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate(&11);
        assert!(!cache.is_fresh(&11));
        let calls_after = calls.clone();
        cache
            .ensure(11, move || async move {
                calls_after.fetch_add(1, Ordering::SeqCst);
                Ok("eleven".to_string())
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_idle_entries_are_evicted_on_next_fetch() {
        let mut cache = cache();
        cache.retain = Duration::from_millis(5);

        cache.fetch(1, || async { Ok("old".to_string()) }).await.unwrap();
        let _ = cache.fetch(2, || async { Err(TmdbError::NotFound) }).await;
        assert_eq!(cache.snapshot(&1).version, 1);
        tokio::time::sleep(Duration::from_millis(20)).await;

        cache.fetch(3, || async { Ok("new".to_string()) }).await.unwrap();

        let evicted = cache.snapshot(&1);
        assert!(evicted.data.is_none());
        assert_eq!(evicted.version, 0);
        assert!(cache.snapshot(&2).error.is_none());
        assert!(cache.snapshot(&3).data.is_some());

        // Reloading an evicted key yields a version it never had before
        cache.fetch(1, || async { Ok("again".to_string()) }).await.unwrap();
        assert!(cache.snapshot(&1).version > 1);
    }

    #[tokio::test]
    async fn test_in_flight_entries_survive_eviction() {
        let mut cache = cache();
        cache.retain = Duration::ZERO;
        let cache = Arc::new(cache);
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let bg = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .fetch(4, || async move {
                        let _ = rx.await;
                        Ok("four".to_string())
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;

        cache.fetch(5, || async { Ok("five".to_string()) }).await.unwrap();
        assert!(cache.snapshot(&4).is_fetching);

        let _ = tx.send(());
        bg.await.unwrap().unwrap();
        assert_eq!(cache.snapshot(&4).data().map(String::as_str), Some("four"));
    }

    #[test]
    fn test_zero_max_age_keeps_minimum_retention() {
        let eager: QueryCache<u64, String> = QueryCache::new(Duration::ZERO);
        assert_eq!(eager.retain, MIN_RETAIN);
        assert_eq!(cache().retain, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let cache = cache();
        cache.fetch(1, || async { Ok("a".to_string()) }).await.unwrap();
        let _ = cache.fetch(2, || async { Err(TmdbError::NotFound) }).await;

        assert!(cache.snapshot(&1).error.is_none());
        assert!(cache.snapshot(&2).data.is_none());
        assert!(cache.snapshot(&2).error.is_some());
    }
}
