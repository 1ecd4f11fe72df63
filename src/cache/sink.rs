//! Eviction Sink Module
//!
//! Observer hook the engine notifies whenever an entry leaves the cache.

// == Eviction Sink ==
/// Receives every value the engine evicts or removes.
///
/// `on_evict` is called synchronously, once per entry, while the engine's
/// lock is held and before the value is dropped. It runs on whichever thread
/// drove the mutation. Implementations must not block indefinitely and must
/// not call back into the same engine, or the calling thread deadlocks.
///
/// Bulk clears (`remove_all`) do not notify.
pub trait EvictionSink<V>: Send + Sync {
    fn on_evict(&self, value: &V);
}

impl<V, F> EvictionSink<V> for F
where
    F: Fn(&V) + Send + Sync,
{
    fn on_evict(&self, value: &V) {
        self(value)
    }
}
