//! cwtail-core: shared types and pipeline primitives for cwtail.
//!
//! This crate holds everything the pipeline stages agree on: the
//! [`LogRecord`] value that flows between them, the per-region
//! [`PollerCursor`], the bounded [`merge`] point connecting pollers to the
//! consumer, rendering, and configuration.
//!
//! # Architecture
//!
//! ```text
//! LogSource ──► RegionPoller ──┐
//! LogSource ──► RegionPoller ──┼──► MergePoint ──► Consumer ──► stdout
//! LogSource ──► RegionPoller ──┘
//! ```
//!
//! All hand-off between stages uses `tokio` channels. Pollers and the consumer
//! live in `cwtail-runtime`; this crate has no task spawning of its own.

pub mod config;
pub mod cursor;
pub mod error;
pub mod merge;
pub mod render;
pub mod settings;
pub mod time;
pub mod types;

pub use config::Config;
pub use cursor::PollerCursor;
pub use error::ConfigError;
pub use merge::{merge_point, MergeClosed, MergeGauge, MergeReceiver, MergeSender, TryPop};
pub use render::{LineSink, RecordSink, Renderer};
pub use settings::{RetryPolicy, TailSettings};
pub use types::LogRecord;
