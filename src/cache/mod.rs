//! Cache Module
//!
//! The untyped LRU engine: a hash index over an arena-backed recency list,
//! with count and cost limits and an eviction hook.

mod engine;
mod list;
mod sink;
mod stats;


// Re-export public types
pub use engine::{Lookup, LruCache};
pub use list::{NodeHandle, RecencyList};
pub use sink::EvictionSink;
pub use stats::CacheStats;
