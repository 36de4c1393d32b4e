//! Pipeline: starts one poller per region plus the consumer, waits for the
//! pollers, then tears the rest down.
//!
//! Shutdown order:
//! 1. every poller has returned (failed, cancelled, or merge closed);
//! 2. their senders are gone, so the merge point is closed;
//! 3. the consumer gets `shutdown_grace` to finish rendering, then is stopped.

use crate::consumer::{Consumer, RenderMode};
use crate::diagnostics;
use crate::poller::{PollerExit, PollerReport, RegionPoller};
use crate::status::StatusBoard;
use cwtail_core::{merge_point, RecordSink, TailSettings};
use cwtail_feeds::LogSource;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Outcome of a finished pipeline.
#[derive(Debug)]
pub struct PipelineReport {
    /// One entry per region, in configured order.
    pub pollers: Vec<PollerReport>,
    pub rendered: u64,
}

impl PipelineReport {
    /// `true` if there was at least one poller and every one of them failed.
    pub fn all_failed(&self) -> bool {
        !self.pollers.is_empty()
            && self
                .pollers
                .iter()
                .all(|p| p.exit.is_failure())
    }

    pub fn delivered(&self) -> u64 {
        self.pollers.iter().map(|p| p.delivered).sum()
    }
}

pub struct Pipeline {
    settings: Arc<TailSettings>,
    source: Arc<dyn LogSource>,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(settings: TailSettings, source: Arc<dyn LogSource>) -> Self {
        Self {
            settings: Arc::new(settings),
            source,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops every poller and the consumer when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run<K: RecordSink + 'static>(self, sink: K) -> PipelineReport {
        let settings = self.settings;
        let (merge_tx, merge_rx) = merge_point(settings.buffer_capacity);
        let gauge = merge_tx.gauge();

        let mut pollers = JoinSet::new();
        let mut statuses = Vec::with_capacity(settings.regions.len());
        let mut snapshots = Vec::with_capacity(settings.regions.len());
        for (index, region) in settings.regions.iter().enumerate() {
            let (poller, status) = RegionPoller::new(
                region.clone(),
                settings.clone(),
                self.source.clone(),
                merge_tx.clone(),
                self.cancel.clone(),
            );
            snapshots.push(status.clone());
            statuses.push(status);
            pollers.spawn(async move { (index, poller.run().await) });
        }
        // The merge point closes once the last poller drops its clone.
        drop(merge_tx);

        info!(
            log_group = %settings.log_group,
            regions = settings.regions.len(),
            "pipeline started"
        );

        let diagnostics_stop = self.cancel.child_token();
        if let Some(addr) = settings.diagnostics {
            let board = StatusBoard::new(statuses, gauge);
            let stop = diagnostics_stop.clone();
            tokio::spawn(async move {
                if let Err(err) = diagnostics::serve(addr, board, stop).await {
                    warn!(%addr, error = %err, "diagnostics endpoint unavailable");
                }
            });
        }

        let consumer_stop = self.cancel.child_token();
        let consumer = Consumer::new(
            merge_rx,
            sink,
            RenderMode::from_interval(settings.render_interval),
            consumer_stop.clone(),
        );
        let rendered = consumer.rendered_counter();
        let mut consumer_task = tokio::spawn(consumer.run());

        let mut reports: Vec<Option<PollerReport>> =
            settings.regions.iter().map(|_| None).collect();
        while let Some(joined) = pollers.join_next().await {
            match joined {
                Ok((index, report)) => reports[index] = Some(report),
                Err(err) => error!(error = %err, "poller task panicked"),
            }
        }
        // A panicked poller leaves its slot empty; report it from its last
        // published snapshot.
        let reports: Vec<PollerReport> = reports
            .into_iter()
            .zip(&snapshots)
            .map(|(report, status)| {
                report.unwrap_or_else(|| {
                    let snap = status.borrow();
                    PollerReport {
                        region: snap.region.clone(),
                        exit: PollerExit::Panicked,
                        delivered: snap.delivered,
                    }
                })
            })
            .collect();
        info!(pollers = reports.len(), "all pollers finished");

        match tokio::time::timeout(settings.shutdown_grace, &mut consumer_task).await {
            Ok(Ok(_sink)) => {}
            Ok(Err(err)) => error!(error = %err, "consumer task panicked"),
            Err(_) => {
                warn!(
                    grace_ms = settings.shutdown_grace.as_millis() as u64,
                    "consumer did not finish within grace period"
                );
                consumer_stop.cancel();
                consumer_task.abort();
            }
        }
        diagnostics_stop.cancel();

        let report = PipelineReport {
            pollers: reports,
            rendered: rendered.load(Ordering::Relaxed),
        };
        info!(
            delivered = report.delivered(),
            rendered = report.rendered,
            "pipeline stopped"
        );
        report
    }
}
