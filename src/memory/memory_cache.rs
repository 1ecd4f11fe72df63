//! Memory Cache Module
//!
//! Typed facade over the LRU engine: typed keys, type-erased values,
//! expiration checked on read, and an eviction delegate.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::cache::{CacheStats, EvictionSink, Lookup, LruCache};
use crate::config::{default_total_cost_limit, CacheConfig};
use crate::error::{MemoryCacheError, Result};
use crate::memory::{AnyCache, AnyKey, Expiration, KeyType};

// == Delegate ==
/// Observer told about every value that leaves the cache through eviction
/// or removal.
///
/// Called synchronously while the cache is locked, on the thread that caused
/// the eviction. Calling back into the same cache from `will_evict`
/// deadlocks.
pub trait MemoryCacheDelegate: Send + Sync {
    fn will_evict(&self, value: &(dyn Any + Send + Sync));
}

/// Engine sink that hands the original payload to the delegate, if it is
/// still alive.
#[derive(Default)]
struct DelegateForwarder {
    delegate: RwLock<Option<Weak<dyn MemoryCacheDelegate>>>,
}

impl EvictionSink<AnyCache> for DelegateForwarder {
    fn on_evict(&self, cell: &AnyCache) {
        let delegate = self.delegate.read().as_ref().and_then(Weak::upgrade);
        if let Some(delegate) = delegate {
            delegate.will_evict(&*cell.value);
        }
    }
}

// == Entry ==
/// A live value returned by [`MemoryCache::value`].
pub struct Entry<K: KeyType> {
    pub key: K,
    pub value: Arc<K::Value>,
    pub expiration: Expiration,
    /// Instant the expiration resolved to when the value was stored
    pub expires_at: DateTime<Utc>,
}

impl<K: KeyType> Clone for Entry<K> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: Arc::clone(&self.value),
            expiration: self.expiration,
            expires_at: self.expires_at,
        }
    }
}

impl<K> fmt::Debug for Entry<K>
where
    K: KeyType + fmt::Debug,
    K::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("expiration", &self.expiration)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// == Memory Cache ==
/// Thread-safe typed cache.
///
/// Each instance owns its own engine; share one across threads with `Arc`.
pub struct MemoryCache {
    cache: LruCache<AnyKey, AnyCache>,
    forwarder: Arc<DelegateForwarder>,
}

impl MemoryCache {
    // == Constructor ==
    /// Creates a cache with the memory-derived default cost limit and no
    /// count limit.
    pub fn new() -> Self {
        Self::with_limits(default_total_cost_limit(), 0)
    }

    /// Creates a cache with explicit limits (0 disables a limit).
    pub fn with_limits(total_cost_limit: usize, count_limit: usize) -> Self {
        let cache = LruCache::with_limits(total_cost_limit, count_limit);
        let forwarder = Arc::new(DelegateForwarder::default());
        cache.set_sink(Some(forwarder.clone() as Arc<dyn EvictionSink<AnyCache>>));

        Self { cache, forwarder }
    }

    /// Creates a cache with the limits from `config`.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_limits(config.total_cost_limit, config.count_limit)
    }

    // == Delegate ==
    /// Registers the eviction delegate. Only a weak reference is kept.
    pub fn set_delegate<D: MemoryCacheDelegate + 'static>(&self, delegate: &Arc<D>) {
        let weak = Arc::downgrade(delegate);
        let weak: Weak<dyn MemoryCacheDelegate> = weak;
        *self.forwarder.delegate.write() = Some(weak);
    }

    /// Stops forwarding evictions to any delegate.
    pub fn clear_delegate(&self) {
        *self.forwarder.delegate.write() = None;
    }

    // == Set ==
    /// Stores `value` under `key`. `None` removes the key instead.
    pub fn set<K: KeyType>(
        &self,
        value: Option<K::Value>,
        key: &K,
        expiration: Expiration,
        cost: usize,
    ) {
        match value {
            Some(value) => {
                let cell = AnyCache::new(value, expiration);
                self.cache.set(cell, AnyKey::new(key), cost);
            }
            None => self.remove(key),
        }
    }

    // == Value ==
    /// Looks up the value stored under `key`.
    ///
    /// The entry is promoted before its expiration is checked. An expired
    /// entry of the requested type is removed and reported as `Expired`;
    /// later reads see `NotFound`.
    ///
    /// Only a read that returns a value counts as a hit; every error counts
    /// as a miss.
    pub fn value<K: KeyType>(&self, key: &K) -> Result<Entry<K>> {
        let result = self.lookup(key);
        match result {
            Ok(_) => self.cache.record_hit(),
            Err(_) => self.cache.record_miss(),
        }
        result
    }

    fn lookup<K: KeyType>(&self, key: &K) -> Result<Entry<K>> {
        let lookup = self
            .cache
            .get_with(&AnyKey::new(key), |cell| {
                cell.holds::<K::Value>() && cell.is_expired()
            })
            .ok_or(MemoryCacheError::NotFound)?;

        match lookup {
            Lookup::Purged(cell) => Err(MemoryCacheError::Expired(cell.expires_at)),
            Lookup::Hit(cell) => {
                let value = cell
                    .value
                    .downcast::<K::Value>()
                    .map_err(MemoryCacheError::UnexpectedType)?;

                Ok(Entry {
                    key: key.clone(),
                    value,
                    expiration: cell.expiration,
                    expires_at: cell.expires_at,
                })
            }
        }
    }

    // == Subscript ==
    /// `value` with every error collapsed to `None`.
    pub fn get<K: KeyType>(&self, key: &K) -> Option<Arc<K::Value>> {
        self.value(key).ok().map(|entry| entry.value)
    }

    /// `set` with no expiration and zero cost.
    pub fn put<K: KeyType>(&self, key: &K, value: Option<K::Value>) {
        self.set(value, key, Expiration::Never, 0);
    }

    // == Remove ==
    /// Removes the entry under `key`, notifying the delegate.
    pub fn remove<K: KeyType>(&self, key: &K) {
        self.cache.remove(&AnyKey::new(key));
    }

    /// Removes the entry under `key` only if it has expired.
    ///
    /// Promotes a live entry like a read does, but is not counted in stats.
    pub fn remove_if_expired<K: KeyType>(&self, key: &K) {
        self.cache.get_with(&AnyKey::new(key), |cell| cell.is_expired());
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn remove_expired(&self) -> usize {
        let removed = self.cache.remove_where(|cell| cell.is_expired());
        if removed > 0 {
            debug!(removed, "expired entries removed");
        }
        removed
    }

    /// Empties the cache. The delegate is not notified.
    ///
    /// This is the hook for memory-pressure signals.
    pub fn remove_all(&self) {
        self.cache.remove_all();
    }

    // == Limits ==
    /// Returns the cost limit (0 = unlimited).
    pub fn total_cost_limit(&self) -> usize {
        self.cache.total_cost_limit()
    }

    /// Sets the cost limit, evicting right away if it is now exceeded.
    pub fn set_total_cost_limit(&self, limit: usize) {
        self.cache.set_total_cost_limit(limit);
    }

    /// Returns the count limit (0 = unlimited).
    pub fn count_limit(&self) -> usize {
        self.cache.count_limit()
    }

    /// Sets the count limit, evicting right away if it is now exceeded.
    pub fn set_count_limit(&self, limit: usize) {
        self.cache.set_count_limit(limit);
    }

    // == Accessors ==
    /// Sum of the costs of all entries.
    pub fn total_cost(&self) -> usize {
        self.cache.total_cost()
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn count(&self) -> usize {
        self.cache.count()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    // == Stats ==
    /// Returns current hit/miss/eviction counters and totals.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("count", &self.count())
            .field("total_cost", &self.total_cost())
            .field("count_limit", &self.count_limit())
            .field("total_cost_limit", &self.total_cost_limit())
            .finish()
    }
}
