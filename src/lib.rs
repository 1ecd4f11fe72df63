//! Memory Cache - A bounded in-process typed cache
//!
//! Provides an O(1) LRU engine bounded by entry count and total cost, and a
//! typed facade with per-entry expiration and an eviction delegate.

pub mod cache;
pub mod config;
pub mod error;
pub mod memory;
pub mod tasks;

pub use cache::{CacheStats, EvictionSink, LruCache};
pub use config::CacheConfig;
pub use error::{MemoryCacheError, Result};
pub use memory::{
    AnyKey, Entry, Expiration, HashKey, KeyType, MemoryCache, MemoryCacheDelegate, StringKey,
};
pub use tasks::{spawn_pressure_task, spawn_sweep_task, MemoryPressure};
