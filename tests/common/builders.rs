//! Test builders: terse constructors for events, records, and settings.
//!
//! Designed for readability in test bodies, not for production use. They panic
//! on invalid input rather than returning `Result`.

use chrono::{DateTime, TimeZone, Utc};
use cwtail_core::{Config, LogRecord, TailSettings};
use cwtail_feeds::{SourceError, SourceEvent};

/// Fixed epoch for all harnesses: 2024-01-15T10:00:00Z.
pub const EPOCH_SECS: i64 = 1_705_312_800;

/// `EPOCH + secs`.
pub fn t(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(EPOCH_SECS + secs, 0).unwrap()
}

/// A source event `id` at `t(secs)` whose message is the id itself.
pub fn ev(id: &str, secs: i64) -> SourceEvent {
    SourceEvent::new(id, t(secs), format!("message {id}"))
}

pub fn record(region: &str, id: &str, secs: i64) -> LogRecord {
    LogRecord::new(region, id, t(secs), &format!("message {id}"))
}

/// Default settings tailing `/aws/lambda/orders` from `t(0)` in `regions`.
pub fn settings(regions: &[&str]) -> TailSettings {
    TailSettings::from_config(
        &Config::defaults(),
        "/aws/lambda/orders",
        regions.iter().map(|r| r.to_string()).collect(),
        t(0),
    )
    .unwrap()
}

pub fn permanent(region: &str, message: &str) -> SourceError {
    SourceError::Permanent {
        region: region.to_string(),
        message: message.to_string(),
    }
}

pub fn transient(region: &str) -> SourceError {
    SourceError::Transient {
        region: region.to_string(),
        message: "ThrottlingException: Rate exceeded".to_string(),
    }
}
