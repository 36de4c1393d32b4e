//! cwtail: tail a CloudWatch Logs group across many regions at once.
//!
//! One poller per region queries the log group every couple of seconds,
//! drops events it has already delivered, and pushes the rest into a bounded
//! merge point. A single consumer renders them to stdout, either as they
//! arrive or at a fixed cadence.
//!
//! # Architecture
//!
//! ```text
//! cwtail-feeds ──► cwtail-runtime ──► stdout
//!  (LogSource)    (pollers, merge,
//!                  consumer)
//!        └──────── cwtail-core ───────┘
//!          (records, cursor, config)
//! ```

pub mod cli;
pub mod logging;

use cwtail_core::{LineSink, Renderer, TailSettings};
use cwtail_feeds::CloudWatchSource;
use cwtail_runtime::{Pipeline, PipelineReport};
use std::sync::Arc;
use tracing::info;

/// Tail CloudWatch Logs with `settings` until every poller stops or the
/// process is interrupted.
pub async fn run(settings: TailSettings) -> PipelineReport {
    let source = CloudWatchSource::connect(settings.profile.as_deref(), &settings.regions).await;
    let sink = LineSink::stdout(Renderer::new(&settings.render));

    let pipeline = Pipeline::new(settings, Arc::new(source));
    let cancel = pipeline.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            cancel.cancel();
        }
    });

    pipeline.run(sink).await
}
