//! cwtail-runtime: the concurrent fan-in pipeline.
//!
//! ```text
//!            ┌─ RegionPoller(eu-west-1) ─┐
//! Pipeline ──┼─ RegionPoller(us-east-1) ─┼──► MergePoint ──► Consumer ──► RecordSink
//!            └─ RegionPoller(…)         ─┘
//! ```
//!
//! Every poller and the consumer run as separate tokio tasks and share only
//! the merge point. A single [`CancellationToken`](tokio_util::sync::CancellationToken)
//! reaches every suspension point, so an interrupt drains buffered records and
//! returns instead of relying on process termination.

pub mod consumer;
pub mod diagnostics;
pub mod pipeline;
pub mod poller;
pub mod status;

pub use consumer::{Consumer, RenderMode};
pub use pipeline::{Pipeline, PipelineReport};
pub use poller::{PollerExit, PollerReport, RegionPoller};
pub use status::{PollerSnapshot, PollerState, StatusBoard};
