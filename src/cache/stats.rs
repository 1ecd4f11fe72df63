//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of engine counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of lookups that found an entry
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Number of entries evicted because a limit was exceeded
    pub evictions: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Current sum of entry costs
    pub total_cost: usize,
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

    // == Recording ==
    /// Counts a lookup that returned a value.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Counts a lookup that returned nothing.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Counts an entry dropped to satisfy a limit.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}
