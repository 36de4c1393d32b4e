//! Configuration errors.
//!
//! Everything here is fatal and reported before any poller starts.

/// An invalid or unloadable configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("log group name is required")]
    MissingLogGroup,

    #[error(
        "invalid starting point {input:?}: expected RFC 3339, YYYY-MM-DDTHH:MM:SS, \
         or a relative offset such as -15m"
    )]
    InvalidStartingPoint { input: String },

    #[error("invalid duration {input:?}: expected e.g. 500ms, 2s, 5m, 1h")]
    InvalidDuration { input: String },

    #[error("invalid timestamp format {format:?}")]
    InvalidTimestampFormat { format: String },

    #[error("buffer capacity must be at least 1")]
    ZeroCapacity,

    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,

    #[error("dedup window of {ms}ms exceeds the maximum of {max_ms}ms")]
    DedupWindowTooLarge { ms: u64, max_ms: u64 },

    #[error("invalid socket address {input:?}")]
    InvalidAddress { input: String },

    #[error("no regions to poll")]
    NoRegions,

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
