//! cwtail-feeds: remote log source adapters for cwtail.
//!
//! A source answers one question for one region: "which events in this log
//! group, matching this filter, are at or after this instant?". Pollers in
//! `cwtail-runtime` ask it repeatedly and handle dedup themselves.

pub mod cloudwatch;
pub mod regions;
pub mod source;

pub use cloudwatch::CloudWatchSource;
pub use regions::SUPPORTED_REGIONS;
pub use source::{FetchRequest, LogSource, SourceError, SourceEvent};
