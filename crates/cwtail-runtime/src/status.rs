//! Per-region status published by pollers and read by diagnostics.
//!
//! Each poller owns a `watch::Sender<PollerSnapshot>`; nothing else writes to
//! it. The [`StatusBoard`] only holds receivers, so reading status never
//! blocks a poller.

use chrono::{DateTime, Utc};
use cwtail_core::merge::MergeGauge;
use serde::Serialize;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerState {
    Polling,
    Sleeping,
    Retrying,
    Terminated,
    Cancelled,
}

impl PollerState {
    /// `true` once the poller will never query again.
    pub fn is_final(self) -> bool {
        matches!(self, PollerState::Terminated | PollerState::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PollerSnapshot {
    pub region: String,
    pub state: PollerState,
    pub lower_bound: DateTime<Utc>,
    /// Record IDs currently held for dedup.
    pub seen: usize,
    pub delivered: u64,
    pub cycles: u64,
    pub last_error: Option<String>,
}

impl PollerSnapshot {
    pub fn new(region: impl Into<String>, lower_bound: DateTime<Utc>) -> Self {
        Self {
            region: region.into(),
            state: PollerState::Polling,
            lower_bound,
            seen: 0,
            delivered: 0,
            cycles: 0,
            last_error: None,
        }
    }
}

/// Merge point occupancy plus a summary of poller states.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSnapshot {
    pub buffer_capacity: usize,
    pub buffered: usize,
    pub regions: usize,
    pub active_pollers: usize,
}

/// Read-only view over every poller's latest snapshot.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    pollers: Vec<watch::Receiver<PollerSnapshot>>,
    gauge: MergeGauge,
}

impl StatusBoard {
    pub fn new(pollers: Vec<watch::Receiver<PollerSnapshot>>, gauge: MergeGauge) -> Self {
        Self { pollers, gauge }
    }

    pub fn pollers(&self) -> Vec<PollerSnapshot> {
        self.pollers.iter().map(|rx| rx.borrow().clone()).collect()
    }

    pub fn pipeline(&self) -> PipelineSnapshot {
        let active = self
            .pollers
            .iter()
            .filter(|rx| !rx.borrow().state.is_final())
            .count();
        PipelineSnapshot {
            buffer_capacity: self.gauge.capacity(),
            buffered: self.gauge.depth().min(self.gauge.capacity()),
            regions: self.pollers.len(),
            active_pollers: active,
        }
    }
}
