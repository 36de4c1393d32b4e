//! Core types for cwtail-core.
//!
//! [`LogRecord`] is the only value that crosses stage boundaries. It is moved,
//! never shared: the poller builds it, the merge point buffers it, the
//! consumer renders and drops it.

use chrono::{DateTime, Utc};

/// A single log event delivered by one region's poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Region the record was fetched from (e.g. `eu-west-1`).
    pub region: String,
    /// Event message with surrounding whitespace trimmed.
    pub message: String,
    /// Event timestamp as reported by the remote source (millisecond resolution).
    pub timestamp: DateTime<Utc>,
    /// Opaque identifier assigned by the remote source, unique within a region.
    pub record_id: String,
}

impl LogRecord {
    /// Build a record, trimming the message.
    pub fn new(
        region: impl Into<String>,
        record_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        message: &str,
    ) -> Self {
        Self {
            region: region.into(),
            message: message.trim().to_string(),
            timestamp,
            record_id: record_id.into(),
        }
    }
}

/// Convert epoch milliseconds to a UTC timestamp. Returns `None` when the value
/// is outside chrono's representable range.
pub fn millis_to_time(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// Convert a timestamp to epoch milliseconds, truncating sub-millisecond precision.
pub fn time_to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}
