//! Parsing of starting points and durations given on the command line.

use crate::error::ConfigError;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::Duration;

/// Parse a starting point for tailing.
///
/// Accepted forms:
/// - RFC 3339: `2024-01-15T10:00:00Z`, `2024-01-15T12:00:00+02:00`
/// - naive `YYYY-MM-DDTHH:MM:SS`, interpreted as UTC
/// - a relative offset before `now`: `-30s`, `-15m`, `-2h`, `-1d`
pub fn parse_starting_point(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ConfigError> {
    let input = input.trim();
    let invalid = || ConfigError::InvalidStartingPoint {
        input: input.to_string(),
    };

    if let Some(offset) = input.strip_prefix('-') {
        let offset = parse_duration(offset).map_err(|_| invalid())?;
        let offset = chrono::Duration::from_std(offset).map_err(|_| invalid())?;
        return now.checked_sub_signed(offset).ok_or_else(invalid);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| invalid())
}

/// Parse a human duration: `500ms`, `2s`, `5m`, `1h`, `1d`. A bare number is
/// taken as milliseconds.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let input = input.trim();
    let invalid = || ConfigError::InvalidDuration {
        input: input.to_string(),
    };

    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, unit) = input.split_at(split);
    if digits.is_empty() {
        return Err(invalid());
    }
    let value: u64 = digits.parse().map_err(|_| invalid())?;

    let millis = match unit {
        "" | "ms" => Some(value),
        "s" => value.checked_mul(1000),
        "m" => value.checked_mul(60_000),
        "h" => value.checked_mul(3_600_000),
        "d" => value.checked_mul(86_400_000),
        _ => None,
    };
    millis.map(Duration::from_millis).ok_or_else(invalid)
}
