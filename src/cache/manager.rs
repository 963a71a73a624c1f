//! Time-expiry cache manager
//!
//! Provides a `CacheManager` that stores values with the instant they were
//! cached. Entries younger than the TTL are served as-is; older entries are
//! recomputed on read and purged by `cleanup`.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;
use tracing::debug;

/// A cached value together with the instant it was stored
#[derive(Debug)]
struct CacheEntry<V> {
    /// The cached data
    data: V,
    /// When the data was cached
    cached_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() < ttl
    }
}

/// Keyed store whose entries expire after a fixed TTL
///
/// The cache owns every stored value until it is overwritten, deleted or
/// purged. Readers always receive a clone, so large values should be stored
/// behind an `Arc`.
///
/// `get_or_refresh` serializes recomputation per key: while one caller runs
/// the update function for a key, other callers for the same key wait and then
/// receive the freshly stored value.
#[derive(Debug)]
pub struct CacheManager<K, V> {
    /// How long an entry stays fresh
    ttl: Duration,
    /// Stored entries
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    /// One async lock per key with a refresh in flight (or recently finished)
    refresh_locks: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K, V> CacheManager<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// Creates an empty cache whose entries stay fresh for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Returns true if `key` holds a value younger than the TTL
    pub fn contains_fresh(&self, key: &K) -> bool {
        self.entries()
            .get(key)
            .is_some_and(|entry| entry.is_fresh(self.ttl))
    }

    /// Returns a clone of the stored value if it is still fresh
    ///
    /// Stale entries are never returned; they stay in place until a refresh
    /// replaces them or `cleanup` removes them.
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries()
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.data.clone())
    }

    /// Returns the fresh value for `key`, recomputing it if absent or stale
    ///
    /// # Arguments
    /// * `key` - The cache key to read
    /// * `update` - Called with the key when the value must be recomputed
    ///
    /// # Returns
    /// * `Ok(V)` - The cached or freshly computed value
    /// * `Err(E)` - The update function failed; nothing was stored
    pub async fn get_or_refresh<F, Fut, E>(&self, key: &K, update: F) -> Result<V, E>
    where
        F: FnOnce(&K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(data) = self.get(key) {
            debug!(?key, "cache hit");
            return Ok(data);
        }

        let lock = self.refresh_lock(key);
        let _guard = lock.lock().await;

        // Another caller may have refreshed the key while we waited
        if let Some(data) = self.get(key) {
            debug!(?key, "cache filled by concurrent refresh");
            return Ok(data);
        }

        debug!(?key, "cache miss, refreshing");
        let data = update(key).await?;
        self.set(key.clone(), data.clone());
        Ok(data)
    }

    /// Stores `data` under `key`, replacing any previous entry
    pub fn set(&self, key: K, data: V) {
        let entry = CacheEntry {
            data,
            cached_at: Instant::now(),
        };
        self.entries().insert(key, entry);
    }

    /// Removes `key` and returns its value, fresh or not
    pub fn delete(&self, key: &K) -> Option<V> {
        self.entries().remove(key).map(|entry| entry.data)
    }

    /// Removes every entry whose age has reached the TTL
    ///
    /// Fresh entries are left untouched. Returns the number of entries removed.
    pub fn cleanup(&self) -> usize {
        let removed = {
            let mut entries = self.entries();
            let before = entries.len();
            entries.retain(|_, entry| entry.is_fresh(self.ttl));
            before - entries.len()
        };

        // Locks nobody else holds a handle to are idle
        self.locks().retain(|_, lock| Arc::strong_count(lock) > 1);

        if removed > 0 {
            debug!(removed, "purged expired cache entries");
        }
        removed
    }

    /// Returns the refresh lock for `key`, creating it if needed
    fn refresh_lock(&self, key: &K) -> Arc<AsyncMutex<()>> {
        self.locks()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn locks(&self) -> MutexGuard<'_, HashMap<K, Arc<AsyncMutex<()>>>> {
        self.refresh_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
