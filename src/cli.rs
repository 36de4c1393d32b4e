//! Command-line interface.
//!
//! Flags override the config file, which overrides the built-in defaults.

use chrono::{DateTime, Utc};
use clap::Parser;
use cwtail_core::settings::parse_region_list;
use cwtail_core::time::{parse_duration, parse_starting_point};
use cwtail_core::{Config, ConfigError, TailSettings};
use cwtail_feeds::regions::resolve_regions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "cwtail",
    version,
    about = "Tail a CloudWatch Logs group across regions as one deduplicated stream"
)]
pub struct Cli {
    /// Log group to tail.
    #[arg(short, long)]
    pub group: String,

    /// Comma-separated regions. Defaults to every supported region.
    #[arg(short, long, alias = "regs")]
    pub regions: Option<String>,

    /// Credential profile. Defaults to the standard credential chain.
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Server-side filter pattern, passed through verbatim.
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Start from this point instead of now: RFC 3339, YYYY-MM-DDTHH:MM:SS
    /// (UTC), or a relative offset such as -15m.
    #[arg(short, long, allow_hyphen_values = true)]
    pub since: Option<String>,

    /// Render at most one record per interval (e.g. 500ms, 2s). 0 renders eagerly.
    #[arg(short, long, value_parser = parse_duration)]
    pub every: Option<Duration>,

    /// Time between queries per region.
    #[arg(long, value_parser = parse_duration)]
    pub poll_interval: Option<Duration>,

    /// Retries for throttling and other transient query failures.
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Records buffered between pollers and output before pollers block.
    #[arg(long)]
    pub buffer: Option<usize>,

    /// Config file. Defaults to ~/.config/cwtail/config.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Serve poller status over HTTP on the diagnostics address.
    #[arg(long)]
    pub diagnostics: bool,

    /// Override the diagnostics bind address.
    #[arg(long, requires = "diagnostics")]
    pub diagnostics_addr: Option<String>,

    /// Write debug logs to this file instead of stderr.
    #[arg(long)]
    pub debug_log: Option<PathBuf>,
}

impl Cli {
    /// Resolve flags against `config` into validated settings. `now` is the
    /// default starting point and the anchor for relative offsets.
    pub fn settings(&self, config: &Config, now: DateTime<Utc>) -> Result<TailSettings, ConfigError> {
        let regions = resolve_regions(parse_region_list(self.regions.as_deref().unwrap_or("")));
        let start = match self.since.as_deref() {
            Some(since) => parse_starting_point(since, now)?,
            None => now,
        };

        let mut settings = TailSettings::from_config(config, &self.group, regions, start)?
            .with_profile(self.profile.clone())
            .with_filter_pattern(self.filter.clone())
            .with_render_interval(self.every);

        if let Some(interval) = self.poll_interval {
            if interval.is_zero() {
                return Err(ConfigError::ZeroPollInterval);
            }
            settings = settings.with_poll_interval(interval);
        }
        if let Some(max_retries) = self.max_retries {
            let retry = cwtail_core::RetryPolicy {
                max_retries,
                ..settings.retry
            };
            settings = settings.with_retry(retry);
        }
        if let Some(capacity) = self.buffer {
            settings = settings.with_buffer_capacity(capacity)?;
        }
        if self.diagnostics {
            let addr = self
                .diagnostics_addr
                .as_deref()
                .unwrap_or(&config.diagnostics.addr);
            let addr: SocketAddr = addr.parse().map_err(|_| ConfigError::InvalidAddress {
                input: addr.to_string(),
            })?;
            settings = settings.with_diagnostics(Some(addr));
        }

        Ok(settings)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
