//! LRU Engine Module
//!
//! Main cache engine combining a hash index with a recency list, cost/count
//! accounting and limit-driven eviction.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::cache::{CacheStats, EvictionSink, NodeHandle, RecencyList};

// == Cache Entry ==
/// A stored value together with its key and cost. Owned by its list node.
#[derive(Debug)]
struct CacheEntry<K, V> {
    key: K,
    value: V,
    cost: usize,
}

// == Lookup ==
/// Outcome of [`LruCache::get_with`] when the key was present.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    /// The entry was promoted and is still live
    Hit(V),
    /// The entry was promoted, matched the purge predicate and was removed
    Purged(V),
}

struct Inner<K, V> {
    /// Key to list node
    index: HashMap<K, NodeHandle>,
    /// Entries ordered by recency
    list: RecencyList<CacheEntry<K, V>>,
    /// Wider than any single cost so unbounded caches never overflow
    total_cost: u128,
    /// 0 = unlimited
    total_cost_limit: usize,
    /// 0 = unlimited
    count_limit: usize,
    stats: CacheStats,
    sink: Option<Arc<dyn EvictionSink<V>>>,
}

impl<K, V> Inner<K, V>
where
    K: Hash + Eq,
{
    /// Unlinks an entry, updates the index and cost, and notifies the sink
    /// while the value is still alive.
    fn detach(&mut self, handle: NodeHandle) -> Option<CacheEntry<K, V>> {
        let entry = self.list.remove(handle)?;
        if let Some(sink) = &self.sink {
            sink.on_evict(&entry.value);
        }
        self.total_cost -= entry.cost as u128;
        self.index.remove(&entry.key);
        Some(entry)
    }

    fn evict_last(&mut self) -> bool {
        let Some(handle) = self.list.last() else {
            return false;
        };
        match self.detach(handle) {
            Some(entry) => {
                self.stats.record_eviction();
                debug!(
                    cost = entry.cost,
                    total_cost = self.reported_cost(),
                    count = self.list.len(),
                    "evicted least recently used entry"
                );
                true
            }
            None => false,
        }
    }

    /// Running cost as callers see it, saturating at `usize::MAX`.
    fn reported_cost(&self) -> usize {
        usize::try_from(self.total_cost).unwrap_or(usize::MAX)
    }

    /// Evicts from the LRU end until both limits hold or the list is empty.
    fn sync(&mut self) {
        if self.total_cost_limit > 0 {
            while self.total_cost > self.total_cost_limit as u128 {
                if !self.evict_last() {
                    break;
                }
            }
        }
        if self.count_limit > 0 {
            while self.list.len() > self.count_limit {
                if !self.evict_last() {
                    break;
                }
            }
        }
    }
}

// == LRU Cache ==
/// Thread-safe LRU cache bounded by entry count and total cost.
///
/// Every operation, `get` included, takes the same exclusive lock: reads
/// reorder the recency list. The eviction sink runs under that lock.
pub struct LruCache<K, V> {
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an unbounded cache with no eviction sink.
    pub fn new() -> Self {
        Self::with_limits(0, 0)
    }

    /// Creates a cache with the given limits (0 disables a limit).
    pub fn with_limits(total_cost_limit: usize, count_limit: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                index: HashMap::new(),
                list: RecencyList::new(),
                total_cost: 0,
                total_cost_limit,
                count_limit,
                stats: CacheStats::new(),
                sink: None,
            }),
        }
    }

    /// Installs or clears the eviction sink.
    pub fn set_sink(&self, sink: Option<Arc<dyn EvictionSink<V>>>) {
        self.inner.lock().sink = sink;
    }

    // == Set ==
    /// Stores a value as the most recently used entry.
    ///
    /// An existing entry under the same key is removed first (the sink is
    /// notified for it). Limits are enforced afterwards, which may evict the
    /// new entry itself if its cost alone exceeds the cost limit.
    pub fn set(&self, value: V, key: K, cost: usize) {
        let mut inner = self.inner.lock();

        if let Some(handle) = inner.index.get(&key).copied() {
            inner.detach(handle);
        }

        let handle = inner.list.push_front(CacheEntry {
            key: key.clone(),
            value,
            cost,
        });
        inner.index.insert(key, handle);
        inner.total_cost += cost as u128;
        trace!(cost, total_cost = inner.reported_cost(), "entry stored");

        inner.sync();
    }

    // == Get ==
    /// Returns a clone of the value and marks the entry most recently used.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let mut inner = self.inner.lock();

        let Some(handle) = inner.index.get(key).copied() else {
            inner.stats.record_miss();
            return None;
        };

        inner.list.move_to_front(handle);
        inner.stats.record_hit();
        inner.list.get(handle).map(|entry| entry.value.clone())
    }

    /// Promotes the entry, then removes it if `purge_if` holds for its value.
    ///
    /// Both steps happen under one lock acquisition. A purge notifies the
    /// sink. No hit or miss is recorded; callers that treat this as a lookup
    /// report the outcome through [`record_hit`](Self::record_hit) and
    /// [`record_miss`](Self::record_miss).
    pub fn get_with<F>(&self, key: &K, purge_if: F) -> Option<Lookup<V>>
    where
        V: Clone,
        F: FnOnce(&V) -> bool,
    {
        let mut inner = self.inner.lock();

        let handle = inner.index.get(key).copied()?;

        inner.list.move_to_front(handle);
        let purge = inner.list.get(handle).map(|entry| purge_if(&entry.value))?;

        if purge {
            inner.detach(handle).map(|entry| Lookup::Purged(entry.value))
        } else {
            inner
                .list
                .get(handle)
                .map(|entry| Lookup::Hit(entry.value.clone()))
        }
    }

    // == Stats Recording ==
    /// Counts a lookup that returned a value.
    pub fn record_hit(&self) {
        self.inner.lock().stats.record_hit();
    }

    /// Counts a lookup that returned nothing.
    pub fn record_miss(&self) {
        self.inner.lock().stats.record_miss();
    }

    // == Remove ==
    /// Removes an entry and returns its value. The sink is notified.
    pub fn remove(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let handle = inner.index.get(key).copied()?;
        let entry = inner.detach(handle)?;
        trace!(cost = entry.cost, "entry removed");
        Some(entry.value)
    }

    /// Removes every entry whose value matches `pred`, notifying the sink for
    /// each. Returns the number removed. O(n).
    pub fn remove_where<F>(&self, mut pred: F) -> usize
    where
        F: FnMut(&V) -> bool,
    {
        let mut inner = self.inner.lock();

        let doomed: Vec<NodeHandle> = inner
            .list
            .iter()
            .filter(|(_, entry)| pred(&entry.value))
            .map(|(handle, _)| handle)
            .collect();

        for handle in &doomed {
            inner.detach(*handle);
        }
        doomed.len()
    }

    // == Remove All ==
    /// Empties the cache without notifying the sink.
    pub fn remove_all(&self) {
        let mut inner = self.inner.lock();
        let dropped = inner.list.len();

        inner.index.clear();
        inner.list.remove_all();
        inner.total_cost = 0;

        debug!(dropped, "cache cleared");
    }

    // == Limits ==
    /// Returns the cost limit (0 = unlimited).
    pub fn total_cost_limit(&self) -> usize {
        self.inner.lock().total_cost_limit
    }

    /// Sets the cost limit (0 = unlimited) and evicts immediately if needed.
    pub fn set_total_cost_limit(&self, limit: usize) {
        let mut inner = self.inner.lock();
        inner.total_cost_limit = limit;
        inner.sync();
    }

    /// Returns the count limit (0 = unlimited).
    pub fn count_limit(&self) -> usize {
        self.inner.lock().count_limit
    }

    /// Sets the count limit (0 = unlimited) and evicts immediately if needed.
    pub fn set_count_limit(&self, limit: usize) {
        let mut inner = self.inner.lock();
        inner.count_limit = limit;
        inner.sync();
    }

    // == Accessors ==
    /// Sum of the costs of all entries, saturating at `usize::MAX`.
    pub fn total_cost(&self) -> usize {
        self.inner.lock().reported_cost()
    }

    /// Number of stored entries.
    pub fn count(&self) -> usize {
        self.inner.lock().index.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().list.is_empty()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.total_entries = inner.index.len();
        stats.total_cost = inner.reported_cost();
        stats
    }

    /// Keys from most to least recently used.
    #[cfg(test)]
    pub(crate) fn keys(&self) -> Vec<K> {
        let inner = self.inner.lock();
        inner.list.iter().map(|(_, entry)| entry.key.clone()).collect()
    }

    /// Checks that index, list and cost accounting agree.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let inner = self.inner.lock();
        inner.list.assert_consistent();
        assert_eq!(inner.index.len(), inner.list.len());

        for (key, handle) in &inner.index {
            let entry = inner.list.get(*handle).expect("index points at a freed node");
            assert!(entry.key == *key, "index points at another key's node");
        }

        let cost: u128 = inner.list.iter().map(|(_, entry)| entry.cost as u128).sum();
        assert_eq!(cost, inner.total_cost);
    }
}

impl<K, V> Default for LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
