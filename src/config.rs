//! Configuration Module
//!
//! Handles loading cache limits from environment variables and computing the
//! default total cost limit from physical memory.

use std::env;

use sysinfo::{MemoryRefreshKind, RefreshKind, System};

/// Machines at or below this much RAM get the smaller default ratio.
const SMALL_MEMORY_BYTES: u64 = 512 * 1024 * 1024;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum total cost before eviction starts (0 = unlimited)
    pub total_cost_limit: usize,
    /// Maximum number of entries (0 = unlimited)
    pub count_limit: usize,
    /// Expired-entry sweep interval in seconds (at least 1)
    pub sweep_interval: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TOTAL_COST_LIMIT` - Total cost limit (default: share of physical memory)
    /// - `CACHE_COUNT_LIMIT` - Maximum entries (default: 0, unlimited)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60; 0 is ignored)
    pub fn from_env() -> Self {
        Self {
            total_cost_limit: env::var("CACHE_TOTAL_COST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_total_cost_limit),
            count_limit: env::var("CACHE_COUNT_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            sweep_interval: env::var("CACHE_SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&secs| secs > 0)
                .unwrap_or(60),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            total_cost_limit: default_total_cost_limit(),
            count_limit: 0,
            sweep_interval: 60,
        }
    }
}

// == Default Cost Limit ==
/// Returns the cost limit new caches get when none is given: 10% of physical
/// memory on machines with at most 512 MiB, 20% otherwise.
pub fn default_total_cost_limit() -> usize {
    let sys = System::new_with_specifics(
        RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram()),
    );
    cost_limit_for_memory(sys.total_memory())
}

/// Clamped to `usize::MAX` on targets where the share does not fit.
fn cost_limit_for_memory(physical_memory: u64) -> usize {
    let divisor = if physical_memory <= SMALL_MEMORY_BYTES { 10 } else { 5 };
    usize::try_from(physical_memory / divisor).unwrap_or(usize::MAX)
}
