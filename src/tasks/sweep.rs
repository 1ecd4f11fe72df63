//! Expiration Sweep Task
//!
//! Background task that periodically removes expired cache entries, so
//! values nobody reads again still free their cost.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::memory::MemoryCache;

/// Spawns a background task that periodically removes expired entries.
///
/// The task runs until aborted, sleeping for the specified interval between
/// sweeps. Each sweep takes the cache lock once and walks every entry. An
/// interval of 0 is raised to 1 second.
///
/// # Arguments
/// * `cache` - Shared cache to sweep
/// * `sweep_interval_secs` - Interval in seconds between sweeps
///
/// # Example
/// ```ignore
/// let cache = Arc::new(MemoryCache::new());
/// let sweep_handle = spawn_sweep_task(cache.clone(), 60);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(cache: Arc<MemoryCache>, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = sweep_period(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiration sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.remove_expired();

            if removed > 0 {
                info!("Expiration sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiration sweep: no expired entries found");
            }
        }
    })
}

fn sweep_period(sweep_interval_secs: u64) -> Duration {
    if sweep_interval_secs == 0 {
        warn!("Sweep interval of 0 seconds raised to 1 second");
        return Duration::from_secs(1);
    }
    Duration::from_secs(sweep_interval_secs)
}
