//! Timestamp display helpers.
//!
//! The relay is the sole timestamp source; it reports wall-clock time as
//! Unix milliseconds. These helpers only convert that value for display.

use chrono::{DateTime, Utc};

/// Convert a Unix timestamp (milliseconds) to RFC 3339 format in UTC.
///
/// Out-of-range values fall back to the epoch rather than panicking, since
/// the timestamp comes from the relay and is untrusted.
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_millis)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .to_rfc3339()
}

/// Convert a Unix timestamp (milliseconds) to a short `HH:MM:SS` clock time
/// for inline chat display.
pub fn timestamp_to_clock(timestamp_millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_millis)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .format("%H:%M:%S")
        .to_string()
}
