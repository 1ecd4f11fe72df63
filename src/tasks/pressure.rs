//! Memory Pressure Task
//!
//! Clears a shared cache whenever the embedding application reports memory
//! pressure. Where the signal comes from (cgroup events, an OS hook, an admin
//! command) is up to the application; it only needs the sending half of the
//! channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::memory::MemoryCache;

/// A single memory-pressure notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryPressure;

/// Spawns a task that empties `cache` on every [`MemoryPressure`] received.
///
/// The task ends once every sender has been dropped.
///
/// # Example
/// ```ignore
/// let (tx, rx) = tokio::sync::mpsc::channel(4);
/// let pressure_handle = spawn_pressure_task(cache.clone(), rx);
/// // From the platform hook:
/// let _ = tx.try_send(MemoryPressure);
/// ```
pub fn spawn_pressure_task(
    cache: Arc<MemoryCache>,
    mut signals: mpsc::Receiver<MemoryPressure>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting memory pressure listener");

        while signals.recv().await.is_some() {
            let dropped = cache.count();
            cache.remove_all();
            warn!("Memory pressure: cleared {} cache entries", dropped);
        }

        info!("Memory pressure listener stopped");
    })
}
