//! Configuration types for cwtail.
//!
//! [`Config::load`] layers an optional TOML file (by default
//! `~/.config/cwtail/config.toml`) on top of the embedded defaults.
//! [`Config::defaults`] returns the same defaults without touching the
//! filesystem (useful in tests). Command-line flags are applied afterwards,
//! when [`TailSettings`](crate::TailSettings) are resolved.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[poller]
interval_ms          = 2000
dedup_window_ms      = 60000
max_retries          = 0
retry_backoff_ms     = 500
retry_backoff_max_ms = 8000

[pipeline]
buffer_capacity   = 100
shutdown_grace_ms = 1000

[render]
region_width     = 20
timestamp_format = "%Y-%m-%dT%H:%M:%S%:z"
local_time       = false

[diagnostics]
addr = "127.0.0.1:6060"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration, loaded from `~/.config/cwtail/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// `[poller]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    /// Sleep between query cycles.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// How far behind the lower bound seen IDs are retained.
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,
    /// Retries for transient query failures. `0` terminates the poller on the
    /// first failure.
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_retry_backoff_max_ms")]
    pub retry_backoff_max_ms: u64,
}

fn default_interval_ms() -> u64 { 2000 }
fn default_dedup_window_ms() -> u64 { 60_000 }
fn default_retry_backoff_ms() -> u64 { 500 }
fn default_retry_backoff_max_ms() -> u64 { 8000 }

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            dedup_window_ms: default_dedup_window_ms(),
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            retry_backoff_max_ms: default_retry_backoff_max_ms(),
        }
    }
}

/// `[pipeline]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    /// How long the consumer may keep rendering after every poller has stopped.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

fn default_buffer_capacity() -> usize { 100 }
fn default_shutdown_grace_ms() -> u64 { 1000 }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

/// `[render]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_region_width")]
    pub region_width: usize,
    /// chrono `strftime` format for the timestamp column.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    /// Render timestamps in the local time zone instead of UTC.
    #[serde(default)]
    pub local_time: bool,
}

fn default_region_width() -> usize { 20 }
fn default_timestamp_format() -> String { "%Y-%m-%dT%H:%M:%S%:z".to_string() }

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            region_width: default_region_width(),
            timestamp_format: default_timestamp_format(),
            local_time: false,
        }
    }
}

/// `[diagnostics]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default = "default_diagnostics_addr")]
    pub addr: String,
}

fn default_diagnostics_addr() -> String { "127.0.0.1:6060".to_string() }

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            addr: default_diagnostics_addr(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load configuration layered on top of the built-in defaults.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// read if present and silently skipped otherwise. Either file is parsed
    /// as TOML whatever its extension.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(config_path().as_path()).required(false),
        }
        .format(config::FileFormat::Toml);

        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(file)
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("cwtail")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
