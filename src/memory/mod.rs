//! Memory Module
//!
//! Typed cache facade: key descriptors, expiration policies and the
//! type-erased cells stored in the engine.

mod cell;
mod expiration;
mod key;
mod memory_cache;

pub use cell::AnyCache;
pub use expiration::Expiration;
pub use key::{AnyKey, HashKey, KeyType, StringKey};
pub use memory_cache::{Entry, MemoryCache, MemoryCacheDelegate};
