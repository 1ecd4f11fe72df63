//! Cache Cell Module
//!
//! Type-erased value stored in the engine, with its expiration fixed at the
//! moment it was set.

use std::any::Any;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::memory::Expiration;

// == Any Cache ==
/// A stored value with its type erased.
#[derive(Debug, Clone)]
pub struct AnyCache {
    /// The stored value
    pub value: Arc<dyn Any + Send + Sync>,
    /// Policy the value was stored with
    pub expiration: Expiration,
    /// Instant the policy resolved to at set time
    pub expires_at: DateTime<Utc>,
}

impl AnyCache {
    // == Constructor ==
    pub fn new<V: Send + Sync + 'static>(value: V, expiration: Expiration) -> Self {
        Self::at(value, expiration, Utc::now())
    }

    /// Builds a cell as if it had been stored at `now`.
    pub fn at<V: Send + Sync + 'static>(
        value: V,
        expiration: Expiration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            value: Arc::new(value),
            expiration,
            expires_at: expiration.resolve(now),
        }
    }

    // == Is Expired ==
    /// True once the stored expiration instant has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// True if the payload is a `V`.
    pub fn holds<V: 'static>(&self) -> bool {
        self.value.is::<V>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_cell_never_expires() {
        let cell = AnyCache::new("value".to_string(), Expiration::Never);
        assert!(!cell.is_expired());
        assert!(cell.holds::<String>());
        assert!(!cell.holds::<u32>());
    }

    #[test]
    fn test_cell_relative_expiration_is_fixed_at_set_time() {
        let cell = AnyCache::new(1u8, Expiration::After(Duration::from_millis(50)));
        assert!(!cell.is_expired());

        sleep(Duration::from_millis(100));

        assert!(cell.is_expired());
    }

    #[test]
    fn test_cell_stored_in_the_past() {
        let then = Utc::now() - chrono::Duration::seconds(120);
        let cell = AnyCache::at(1u8, Expiration::seconds(60), then);

        assert!(cell.is_expired());
        assert_eq!(cell.expires_at, then + chrono::Duration::seconds(60));
    }
}
