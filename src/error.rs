//! Error types for the typed cache
//!
//! Provides unified error handling using thiserror. The engine itself never
//! fails; these are produced only where type and expiration checks happen.

use std::any::Any;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

// == Memory Cache Error Enum ==
/// Unified error type for typed cache lookups.
#[derive(Error, Debug, Clone)]
pub enum MemoryCacheError {
    /// No live entry for the key
    #[error("Key not found")]
    NotFound,

    /// An entry exists but holds a value of another type
    #[error("Unexpected value type stored under key")]
    UnexpectedType(Arc<dyn Any + Send + Sync>),

    /// The entry's expiration instant had passed; it has been removed
    #[error("Key expired at {0}")]
    Expired(DateTime<Utc>),
}

impl MemoryCacheError {
    /// Returns true for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MemoryCacheError::NotFound)
    }

    /// Returns true for `Expired`.
    pub fn is_expired(&self) -> bool {
        matches!(self, MemoryCacheError::Expired(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the typed cache.
pub type Result<T> = std::result::Result<T, MemoryCacheError>;
