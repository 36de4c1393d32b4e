//! Per-region polling cursor and deduplication state.
//!
//! The remote source is queried with an inclusive lower bound (`timestamp >=
//! lower_bound`), so consecutive query windows overlap and the same event can
//! come back several times. [`PollerCursor`] turns that at-least-once delivery
//! into at-most-once delivery per region.
//!
//! # Memory
//!
//! Seen IDs are kept only for a sliding window behind the lower bound. An
//! event whose timestamp is older than `lower_bound` can never be returned by
//! a later query, so entries older than `lower_bound - window` are evicted by
//! [`PollerCursor::evict_expired`]. The window is slack for sources that hand
//! back events slightly behind the requested bound.

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap};

/// Lower bound plus seen-ID set for a single region.
#[derive(Debug, Clone)]
pub struct PollerCursor {
    lower_bound: DateTime<Utc>,
    window: Duration,
    seen: HashMap<String, DateTime<Utc>>,
    /// Same entries as `seen`, ordered by event timestamp for eviction.
    by_time: BTreeSet<(DateTime<Utc>, String)>,
}

impl PollerCursor {
    /// Create a cursor starting at `start` that retains seen IDs for `window`
    /// behind the lower bound.
    pub fn new(start: DateTime<Utc>, window: Duration) -> Self {
        Self {
            lower_bound: start,
            window: window.max(Duration::zero()),
            seen: HashMap::new(),
            by_time: BTreeSet::new(),
        }
    }

    /// The earliest timestamp the next query should request.
    pub fn lower_bound(&self) -> DateTime<Utc> {
        self.lower_bound
    }

    /// Number of record IDs currently remembered.
    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    pub fn has_seen(&self, record_id: &str) -> bool {
        self.seen.contains_key(record_id)
    }

    /// Record an event. Returns `true` if the ID had not been seen before and
    /// the event should be delivered, `false` for a duplicate.
    ///
    /// Only fresh events move the lower bound, and only forward.
    pub fn observe(&mut self, record_id: &str, timestamp: DateTime<Utc>) -> bool {
        if self.seen.contains_key(record_id) {
            return false;
        }
        self.seen.insert(record_id.to_string(), timestamp);
        self.by_time.insert((timestamp, record_id.to_string()));

        if timestamp > self.lower_bound {
            self.lower_bound = timestamp;
        }
        true
    }

    /// Forget IDs whose event timestamp is older than `lower_bound - window`.
    /// Returns the number of entries evicted.
    /// Nothing is evicted while the horizon lies before the earliest
    /// representable time.
    pub fn evict_expired(&mut self) -> usize {
        let Some(horizon) = self.lower_bound.checked_sub_signed(self.window) else {
            return 0;
        };
        let mut evicted = 0;
        while let Some((ts, _)) = self.by_time.first() {
            if *ts >= horizon {
                break;
            }
            if let Some((_, id)) = self.by_time.pop_first() {
                self.seen.remove(&id);
                evicted += 1;
            }
        }
        evicted
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
