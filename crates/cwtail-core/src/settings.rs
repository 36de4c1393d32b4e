//! Fully resolved, validated settings for one tailing session.
//!
//! [`TailSettings`] is built from a [`Config`] plus the values that only come
//! from the command line (log group, regions, filter, starting point). Once
//! built it is immutable and shared by every pipeline stage.

use crate::config::{Config, RenderConfig};
use crate::error::ConfigError;
use crate::render::is_valid_timestamp_format;
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::time::Duration;

/// Longest accepted dedup window: one day.
pub const MAX_DEDUP_WINDOW_MS: u64 = 24 * 60 * 60 * 1000;

/// Bounded exponential backoff for transient query failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base: Duration,
    pub max: Duration,
}

impl RetryPolicy {
    /// No retries: the first failure is terminal.
    pub const NONE: RetryPolicy = RetryPolicy {
        max_retries: 0,
        base: Duration::ZERO,
        max: Duration::ZERO,
    };

    /// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
    /// capped at `max`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(31);
        self.base
            .checked_mul(1u32 << shift)
            .unwrap_or(self.max)
            .min(self.max)
    }
}

#[derive(Debug, Clone)]
pub struct TailSettings {
    pub log_group: String,
    pub regions: Vec<String>,
    /// Credential profile; `None` uses the default credential chain.
    pub profile: Option<String>,
    /// Passed to the remote source verbatim.
    pub filter_pattern: Option<String>,
    /// Initial lower bound for every region.
    pub start: DateTime<Utc>,
    /// `None` renders eagerly.
    pub render_interval: Option<Duration>,
    pub poll_interval: Duration,
    pub dedup_window: Duration,
    pub retry: RetryPolicy,
    pub buffer_capacity: usize,
    pub shutdown_grace: Duration,
    pub render: RenderConfig,
    /// Bind address for the diagnostics endpoint, when enabled.
    pub diagnostics: Option<SocketAddr>,
}

impl TailSettings {
    /// Start from `config`, tailing `log_group` in `regions` from `start`.
    pub fn from_config(
        config: &Config,
        log_group: impl Into<String>,
        regions: Vec<String>,
        start: DateTime<Utc>,
    ) -> Result<Self, ConfigError> {
        let log_group = log_group.into();
        if log_group.trim().is_empty() {
            return Err(ConfigError::MissingLogGroup);
        }
        if regions.is_empty() {
            return Err(ConfigError::NoRegions);
        }
        if config.pipeline.buffer_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if config.poller.interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if config.poller.dedup_window_ms > MAX_DEDUP_WINDOW_MS {
            return Err(ConfigError::DedupWindowTooLarge {
                ms: config.poller.dedup_window_ms,
                max_ms: MAX_DEDUP_WINDOW_MS,
            });
        }
        if !is_valid_timestamp_format(&config.render.timestamp_format) {
            return Err(ConfigError::InvalidTimestampFormat {
                format: config.render.timestamp_format.clone(),
            });
        }

        let poller = &config.poller;
        Ok(Self {
            log_group,
            regions,
            profile: None,
            filter_pattern: None,
            start,
            render_interval: None,
            poll_interval: Duration::from_millis(poller.interval_ms),
            dedup_window: Duration::from_millis(poller.dedup_window_ms),
            retry: RetryPolicy {
                max_retries: poller.max_retries,
                base: Duration::from_millis(poller.retry_backoff_ms),
                max: Duration::from_millis(poller.retry_backoff_max_ms),
            },
            buffer_capacity: config.pipeline.buffer_capacity,
            shutdown_grace: Duration::from_millis(config.pipeline.shutdown_grace_ms),
            render: config.render.clone(),
            diagnostics: None,
        })
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile.filter(|p| !p.is_empty());
        self
    }

    /// An empty pattern means no filter.
    pub fn with_filter_pattern(mut self, pattern: Option<String>) -> Self {
        self.filter_pattern = pattern.filter(|p| !p.is_empty());
        self
    }

    /// A zero interval means eager rendering.
    pub fn with_render_interval(mut self, interval: Option<Duration>) -> Self {
        self.render_interval = interval.filter(|d| !d.is_zero());
        self
    }

    pub fn with_diagnostics(mut self, addr: Option<SocketAddr>) -> Self {
        self.diagnostics = addr;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        self.buffer_capacity = capacity;
        Ok(self)
    }
}

/// Split a comma-separated region list, trimming entries and dropping empty
/// ones and duplicates (first occurrence wins).
pub fn parse_region_list(input: &str) -> Vec<String> {
    let mut regions: Vec<String> = Vec::new();
    for region in input.split(',').map(str::trim).filter(|r| !r.is_empty()) {
        if !regions.iter().any(|r| r == region) {
            regions.push(region.to_string());
        }
    }
    regions
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
