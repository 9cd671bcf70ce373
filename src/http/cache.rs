//! HTTP cache control module
//!
//! Derives `ETag` / `Last-Modified` validators from file metadata and
//! evaluates conditional request headers.

use chrono::{DateTime, Utc};
use std::time::{Duration, SystemTime};

/// Fixed freshness lifetime advertised with every file response (seconds)
pub const MAX_AGE_SECS: u64 = 30;

/// `Cache-Control` header value sent with every file response
pub const CACHE_CONTROL: &str = "max-age=30";

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp as an HTTP date (`Mon, 01 Jan 2024 00:00:00 GMT`)
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE_FORMAT).to_string()
}

/// Validators for one representation of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheValidator {
    pub etag: String,
    pub last_modified: String,
}

impl CacheValidator {
    /// Build validators from modification time and size.
    ///
    /// The `ETag` is the `Last-Modified` date with the byte size appended,
    /// so any change to either produces a new tag.
    pub fn new(modified: SystemTime, size: u64) -> Self {
        let last_modified = http_date(modified);
        Self {
            etag: format!("{last_modified}{size}"),
            last_modified,
        }
    }

    /// Returns true when the client's cached copy may be reused (304).
    ///
    /// Both `If-None-Match` and `If-Modified-Since` have to match exactly;
    /// a missing or different value on either side means a full resend.
    pub fn is_fresh(&self, if_none_match: Option<&str>, if_modified_since: Option<&str>) -> bool {
        if_none_match.is_some_and(|tag| tag.trim() == self.etag)
            && if_modified_since.is_some_and(|date| date.trim() == self.last_modified)
    }
}

/// `Expires` header value relative to `now`
pub fn expires_at(now: SystemTime) -> String {
    http_date(now + Duration::from_secs(MAX_AGE_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mon, 01 Jan 2024 00:00:00 GMT
    fn jan_first() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_704_067_200)
    }

    #[test]
    fn test_http_date_format() {
        assert_eq!(http_date(jan_first()), "Mon, 01 Jan 2024 00:00:00 GMT");
    }

    #[test]
    fn test_etag_is_date_plus_size() {
        let v = CacheValidator::new(jan_first(), 100);
        assert_eq!(v.last_modified, "Mon, 01 Jan 2024 00:00:00 GMT");
        assert_eq!(v.etag, "Mon, 01 Jan 2024 00:00:00 GMT100");
    }

    #[test]
    fn test_validator_consistency() {
        assert_eq!(
            CacheValidator::new(jan_first(), 42),
            CacheValidator::new(jan_first(), 42)
        );
    }

    #[test]
    fn test_validator_difference() {
        let base = CacheValidator::new(jan_first(), 42);
        assert_ne!(base, CacheValidator::new(jan_first(), 43));
        assert_ne!(
            base,
            CacheValidator::new(jan_first() + Duration::from_secs(1), 42)
        );
    }

    #[test]
    fn test_fresh_requires_both_validators() {
        let v = CacheValidator::new(jan_first(), 100);
        let etag = v.etag.clone();
        let date = v.last_modified.clone();

        assert!(v.is_fresh(Some(&etag), Some(&date)));
        assert!(!v.is_fresh(Some(&etag), Some("Tue, 02 Jan 2024 00:00:00 GMT")));
        assert!(!v.is_fresh(Some("other"), Some(&date)));
        assert!(!v.is_fresh(Some(&etag), None));
        assert!(!v.is_fresh(None, Some(&date)));
        assert!(!v.is_fresh(None, None));
    }

    #[test]
    fn test_expires_is_thirty_seconds_later() {
        assert_eq!(expires_at(jan_first()), "Mon, 01 Jan 2024 00:00:30 GMT");
    }
}
