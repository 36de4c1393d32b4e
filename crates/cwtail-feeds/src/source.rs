//! The [`LogSource`] seam between pollers and a remote logging service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One query against one region.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub region: &'a str,
    pub log_group: &'a str,
    pub filter_pattern: Option<&'a str>,
    /// Inclusive lower bound on event timestamps.
    pub since: DateTime<Utc>,
}

/// A raw event as returned by the remote service, before the poller turns it
/// into a [`LogRecord`](cwtail_core::LogRecord).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl SourceEvent {
    pub fn new(event_id: impl Into<String>, timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            timestamp,
            message: message.into(),
        }
    }
}

/// Failure of a single fetch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// Throttling, timeouts, dropped connections, 5xx. Worth retrying.
    #[error("transient failure in {region}: {message}")]
    Transient { region: String, message: String },

    /// Bad filter syntax, missing log group, access denied. Retrying won't help.
    #[error("query failed in {region}: {message}")]
    Permanent { region: String, message: String },

    /// Credentials could not be resolved or were rejected for this region.
    #[error("authentication failed in {region}: {message}")]
    Auth { region: String, message: String },

    #[error("no client configured for region {0}")]
    UnknownRegion(String),
}

impl SourceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Transient { .. })
    }

    pub fn region(&self) -> &str {
        match self {
            SourceError::Transient { region, .. }
            | SourceError::Permanent { region, .. }
            | SourceError::Auth { region, .. } => region,
            SourceError::UnknownRegion(region) => region,
        }
    }
}

/// A remote log service that can be queried per region.
///
/// Implementations must be safe to call concurrently for different regions.
/// A call returns every matching event across all result pages, in the order
/// the service produced them.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn fetch(&self, request: FetchRequest<'_>) -> Result<Vec<SourceEvent>, SourceError>;
}
