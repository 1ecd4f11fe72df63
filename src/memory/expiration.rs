//! Expiration Module
//!
//! Per-entry expiration policies.

use std::time::Duration;

use chrono::{DateTime, Utc};

// == Expiration ==
/// When a cached value stops being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Never expires
    Never,
    /// Expires this long after it is stored
    After(Duration),
    /// Expires at a fixed instant
    At(DateTime<Utc>),
}

impl Expiration {
    /// Shorthand for `Expiration::After` in whole seconds.
    pub fn seconds(secs: u64) -> Self {
        Expiration::After(Duration::from_secs(secs))
    }

    // == Resolution ==
    /// Absolute instant this policy expires at, measuring relative policies
    /// from `now`. `Never` resolves to the latest representable instant.
    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Expiration::Never => DateTime::<Utc>::MAX_UTC,
            Expiration::After(ttl) => chrono::Duration::from_std(*ttl)
                .ok()
                .and_then(|ttl| now.checked_add_signed(ttl))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            Expiration::At(at) => *at,
        }
    }

    /// Absolute instant measured from the current time.
    pub fn date(&self) -> DateTime<Utc> {
        self.resolve(Utc::now())
    }

    /// True once the resolved instant lies in the past.
    ///
    /// A relative policy re-resolves on every call and so never expires by
    /// itself; stored entries fix their instant when they are set.
    pub fn is_expired(&self) -> bool {
        let now = Utc::now();
        self.resolve(now) < now
    }
}

impl Default for Expiration {
    fn default() -> Self {
        Expiration::Never
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_does_not_expire() {
        assert!(!Expiration::Never.is_expired());
        assert_eq!(Expiration::Never.date(), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_past_date_is_expired() {
        let at = Utc::now() - chrono::Duration::seconds(60);
        assert!(Expiration::At(at).is_expired());
        assert_eq!(Expiration::At(at).date(), at);
    }

    #[test]
    fn test_future_date_is_live() {
        let at = Utc::now() + chrono::Duration::seconds(60);
        assert!(!Expiration::At(at).is_expired());
    }

    #[test]
    fn test_relative_resolves_from_now() {
        let now = Utc::now();
        let resolved = Expiration::seconds(10).resolve(now);
        assert_eq!(resolved - now, chrono::Duration::seconds(10));
    }

    #[test]
    fn test_huge_relative_saturates() {
        let now = Utc::now();
        let resolved = Expiration::After(Duration::MAX).resolve(now);
        assert_eq!(resolved, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_default_is_never() {
        assert_eq!(Expiration::default(), Expiration::Never);
    }
}
