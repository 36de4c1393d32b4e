//! RegionPoller: one region's query loop.
//!
//! ```text
//! Polling ──ok──► Sleeping ──► Polling
//!    │  └─transient, retries left─► Retrying ──► Polling
//!    └─error──► Terminated
//! any suspension point ──cancel──► Cancelled
//! ```
//!
//! Each cycle queries the source from the cursor's lower bound (inclusive),
//! drops IDs already seen, and pushes the rest into the merge point in the
//! order the source returned them. A full merge point blocks the poller, which
//! slows the query cadence instead of losing records.

use crate::status::{PollerSnapshot, PollerState};
use cwtail_core::{LogRecord, MergeSender, PollerCursor, TailSettings};
use cwtail_feeds::{FetchRequest, LogSource, SourceError, SourceEvent};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Why a poller stopped.
#[derive(Debug)]
pub enum PollerExit {
    /// Stop signal observed at a suspension point.
    Cancelled,
    /// Query failed and no retry applied.
    Failed(SourceError),
    /// The consumer went away; nothing left to push into.
    MergeClosed,
    /// The poller task panicked. Recorded by the pipeline, never by the
    /// poller itself.
    Panicked,
}

impl PollerExit {
    /// Stopped by an error rather than by a stop signal or the consumer.
    pub fn is_failure(&self) -> bool {
        matches!(self, PollerExit::Failed(_) | PollerExit::Panicked)
    }
}

#[derive(Debug)]
pub struct PollerReport {
    pub region: String,
    pub exit: PollerExit,
    pub delivered: u64,
}

pub struct RegionPoller {
    region: String,
    settings: Arc<TailSettings>,
    source: Arc<dyn LogSource>,
    merge: MergeSender,
    cursor: PollerCursor,
    cancel: CancellationToken,
    status: watch::Sender<PollerSnapshot>,
    delivered: u64,
    cycles: u64,
}

impl RegionPoller {
    /// Build a poller for `region`. The returned receiver observes its status.
    pub fn new(
        region: impl Into<String>,
        settings: Arc<TailSettings>,
        source: Arc<dyn LogSource>,
        merge: MergeSender,
        cancel: CancellationToken,
    ) -> (Self, watch::Receiver<PollerSnapshot>) {
        let region = region.into();
        // Out-of-range windows keep every ID rather than none.
        let window =
            chrono::Duration::from_std(settings.dedup_window).unwrap_or(chrono::Duration::MAX);
        let cursor = PollerCursor::new(settings.start, window);
        let (status, status_rx) = watch::channel(PollerSnapshot::new(&region, settings.start));

        let poller = Self {
            region,
            settings,
            source,
            merge,
            cursor,
            cancel,
            status,
            delivered: 0,
            cycles: 0,
        };
        (poller, status_rx)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Run until cancelled, the merge point closes, or a query fails for good.
    pub async fn run(mut self) -> PollerReport {
        info!(region = %self.region, since = %self.cursor.lower_bound(), "poller started");

        let exit = loop {
            self.publish(PollerState::Polling, None);

            let events = match self.fetch().await {
                Ok(events) => events,
                Err(exit) => break exit,
            };
            if let Err(exit) = self.deliver(events).await {
                break exit;
            }

            let evicted = self.cursor.evict_expired();
            if evicted > 0 {
                debug!(region = %self.region, evicted, "evicted expired record ids");
            }
            self.cycles += 1;

            self.publish(PollerState::Sleeping, None);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break PollerExit::Cancelled,
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        };

        self.finish(exit)
    }

    /// Query the source, retrying transient failures per the retry policy.
    async fn fetch(&mut self) -> Result<Vec<SourceEvent>, PollerExit> {
        let mut attempt = 0u32;
        loop {
            let request = FetchRequest {
                region: &self.region,
                log_group: &self.settings.log_group,
                filter_pattern: self.settings.filter_pattern.as_deref(),
                since: self.cursor.lower_bound(),
            };

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(PollerExit::Cancelled),
                result = self.source.fetch(request) => result,
            };

            let err = match result {
                Ok(events) => {
                    if attempt > 0 {
                        self.status.send_modify(|snap| snap.last_error = None);
                    }
                    return Ok(events);
                }
                Err(err) => err,
            };

            let retry = self.settings.retry;
            if !err.is_transient() || attempt >= retry.max_retries {
                error!(region = %self.region, error = %err, "can not get events, stopping poller");
                return Err(PollerExit::Failed(err));
            }

            attempt += 1;
            let delay = retry.backoff(attempt);
            warn!(
                region = %self.region,
                attempt,
                max_retries = retry.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "transient query failure, retrying"
            );
            self.publish(PollerState::Retrying, Some(err.to_string()));

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(PollerExit::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Push every not-yet-seen event into the merge point, in order.
    async fn deliver(&mut self, events: Vec<SourceEvent>) -> Result<(), PollerExit> {
        let total = events.len();
        let mut fresh = 0usize;

        for event in events {
            if !self.cursor.observe(&event.event_id, event.timestamp) {
                continue;
            }
            let record = LogRecord::new(
                self.region.clone(),
                event.event_id,
                event.timestamp,
                &event.message,
            );

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(PollerExit::Cancelled),
                pushed = self.merge.push(record) => {
                    if pushed.is_err() {
                        return Err(PollerExit::MergeClosed);
                    }
                }
            }
            fresh += 1;
            self.delivered += 1;
        }

        if total > 0 {
            debug!(
                region = %self.region,
                total,
                fresh,
                lower_bound = %self.cursor.lower_bound(),
                "delivered events"
            );
        }
        Ok(())
    }

    fn publish(&self, state: PollerState, last_error: Option<String>) {
        let lower_bound = self.cursor.lower_bound();
        let seen = self.cursor.seen_len();
        let delivered = self.delivered;
        let cycles = self.cycles;
        self.status.send_modify(|snap| {
            snap.state = state;
            snap.lower_bound = lower_bound;
            snap.seen = seen;
            snap.delivered = delivered;
            snap.cycles = cycles;
            if last_error.is_some() {
                snap.last_error = last_error;
            }
        });
    }

    fn finish(self, exit: PollerExit) -> PollerReport {
        let (state, last_error) = match &exit {
            PollerExit::Failed(err) => (PollerState::Terminated, Some(err.to_string())),
            PollerExit::MergeClosed | PollerExit::Panicked => (PollerState::Terminated, None),
            PollerExit::Cancelled => (PollerState::Cancelled, None),
        };
        self.publish(state, last_error);
        info!(region = %self.region, delivered = self.delivered, ?state, "poller stopped");

        PollerReport {
            region: self.region,
            exit,
            delivered: self.delivered,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use cwtail_core::{merge_point, Config};
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_705_312_800 + secs, 0).unwrap()
    }

    /// Replays one scripted response per fetch, then returns empty pages.
    struct Script {
        responses: Mutex<VecDeque<Result<Vec<SourceEvent>, SourceError>>>,
        requests: Mutex<Vec<DateTime<Utc>>>,
    }

    impl Script {
        fn new(responses: Vec<Result<Vec<SourceEvent>, SourceError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LogSource for Script {
        async fn fetch(&self, request: FetchRequest<'_>) -> Result<Vec<SourceEvent>, SourceError> {
            self.requests.lock().unwrap().push(request.since);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn settings() -> Arc<TailSettings> {
        Arc::new(
            TailSettings::from_config(&Config::defaults(), "group", vec!["eu-west-1".into()], t(0))
                .unwrap(),
        )
    }

    fn transient() -> SourceError {
        SourceError::Transient {
            region: "eu-west-1".into(),
            message: "ThrottlingException".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn requests_use_the_advancing_lower_bound() {
        let script = Script::new(vec![
            Ok(vec![SourceEvent::new("e1", t(1), "one"), SourceEvent::new("e2", t(2), "two")]),
            Ok(vec![SourceEvent::new("e2", t(2), "two"), SourceEvent::new("e3", t(3), "three")]),
            Err(SourceError::Permanent {
                region: "eu-west-1".into(),
                message: "ResourceNotFoundException".into(),
            }),
        ]);
        let (tx, mut rx) = merge_point(16);
        let (poller, status) =
            RegionPoller::new("eu-west-1", settings(), script.clone(), tx, CancellationToken::new());

        let report = poller.run().await;
        assert!(matches!(report.exit, PollerExit::Failed(_)));
        assert_eq!(report.delivered, 3);
        assert_eq!(*script.requests.lock().unwrap(), vec![t(0), t(2), t(3)]);

        let mut ids = Vec::new();
        while let cwtail_core::TryPop::Item(r) = rx.try_pop() {
            ids.push(r.record_id);
        }
        assert_eq!(ids, vec!["e1", "e2", "e3"]);

        let snap = status.borrow().clone();
        assert_eq!(snap.state, PollerState::Terminated);
        assert_eq!(snap.cycles, 2);
        assert!(snap.last_error.unwrap().contains("ResourceNotFoundException"));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_terminate_without_retry_policy() {
        let script = Script::new(vec![Err(transient()), Ok(vec![SourceEvent::new("e1", t(1), "x")])]);
        let (tx, _rx) = merge_point(4);
        let (poller, _) =
            RegionPoller::new("eu-west-1", settings(), script.clone(), tx, CancellationToken::new());

        let report = poller.run().await;
        assert!(matches!(report.exit, PollerExit::Failed(ref e) if e.is_transient()));
        assert_eq!(script.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried_when_enabled() {
        let script = Script::new(vec![
            Err(transient()),
            Err(transient()),
            Ok(vec![SourceEvent::new("e1", t(1), "x")]),
            Err(transient()),
            Err(transient()),
            Err(transient()),
        ]);
        let mut s = (*settings()).clone();
        s.retry = cwtail_core::RetryPolicy {
            max_retries: 2,
            base: Duration::from_millis(100),
            max: Duration::from_secs(1),
        };
        let (tx, _rx) = merge_point(4);
        let (poller, _) =
            RegionPoller::new("eu-west-1", Arc::new(s), script.clone(), tx, CancellationToken::new());

        let report = poller.run().await;
        // two retries succeed, the counter resets, then three failures exceed the budget
        assert_eq!(report.delivered, 1);
        assert!(matches!(report.exit, PollerExit::Failed(_)));
        assert_eq!(script.requests.lock().unwrap().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_retry_clears_the_published_error() {
        let script = Script::new(vec![Err(transient()), Ok(vec![SourceEvent::new("e1", t(1), "x")])]);
        let mut s = (*settings()).clone();
        s.retry = cwtail_core::RetryPolicy {
            max_retries: 1,
            base: Duration::from_millis(100),
            max: Duration::from_secs(1),
        };
        let (tx, _rx) = merge_point(4);
        let cancel = CancellationToken::new();
        let (poller, mut status) =
            RegionPoller::new("eu-west-1", Arc::new(s), script, tx, cancel.clone());
        let handle = tokio::spawn(poller.run());

        status
            .wait_for(|snap| snap.state == PollerState::Retrying)
            .await
            .unwrap();
        assert!(status.borrow().last_error.is_some());

        status
            .wait_for(|snap| snap.state == PollerState::Sleeping)
            .await
            .unwrap();
        let snap = status.borrow().clone();
        assert_eq!(snap.delivered, 1);
        assert_eq!(snap.last_error, None);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_a_sleeping_poller() {
        let script = Script::new(Vec::new());
        let (tx, _rx) = merge_point(4);
        let cancel = CancellationToken::new();
        let (poller, status) =
            RegionPoller::new("eu-west-1", settings(), script, tx, cancel.clone());

        let handle = tokio::spawn(poller.run());
        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.cancel();

        let report = handle.await.unwrap();
        assert!(matches!(report.exit, PollerExit::Cancelled));
        assert_eq!(status.borrow().state, PollerState::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_merge_point_stops_the_poller() {
        let script = Script::new(vec![Ok(vec![SourceEvent::new("e1", t(1), "x")])]);
        let (tx, mut rx) = merge_point(4);
        rx.close();
        let (poller, _) =
            RegionPoller::new("eu-west-1", settings(), script, tx, CancellationToken::new());

        let report = poller.run().await;
        assert!(matches!(report.exit, PollerExit::MergeClosed));
        assert_eq!(report.delivered, 0);
    }
}
