//! Consumer: drains the merge point into a [`RecordSink`].
//!
//! Two modes:
//! - [`RenderMode::Eager`]: render each record as soon as it is popped.
//! - [`RenderMode::Throttled`]: on each tick of a fixed period, render at most
//!   one record. Anything beyond that waits in the merge point; once it fills
//!   up, pollers block.

use cwtail_core::{MergeReceiver, RecordSink, TryPop};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Eager,
    Throttled(Duration),
}

impl RenderMode {
    /// `None` or a zero interval selects eager rendering.
    pub fn from_interval(interval: Option<Duration>) -> Self {
        match interval {
            Some(period) if !period.is_zero() => RenderMode::Throttled(period),
            _ => RenderMode::Eager,
        }
    }
}

pub struct Consumer<K> {
    receiver: MergeReceiver,
    sink: K,
    mode: RenderMode,
    cancel: CancellationToken,
    rendered: Arc<AtomicU64>,
}

impl<K: RecordSink> Consumer<K> {
    pub fn new(receiver: MergeReceiver, sink: K, mode: RenderMode, cancel: CancellationToken) -> Self {
        Self {
            receiver,
            sink,
            mode,
            cancel,
            rendered: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shared count of records rendered so far.
    pub fn rendered_counter(&self) -> Arc<AtomicU64> {
        self.rendered.clone()
    }

    /// Drain until the merge point closes, the sink fails, or the stop signal
    /// fires. Returns the sink.
    pub async fn run(mut self) -> K {
        debug!(mode = ?self.mode, "consumer started");
        match self.mode {
            RenderMode::Eager => self.run_eager().await,
            RenderMode::Throttled(period) => self.run_throttled(period).await,
        }
        // Producers still blocked on a full buffer see the close and exit.
        self.receiver.close();
        debug!(rendered = self.rendered.load(Ordering::Relaxed), "consumer stopped");
        self.sink
    }

    async fn run_eager(&mut self) {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                next = self.receiver.pop() => next,
            };
            match next {
                Some(record) => {
                    if !self.emit(&record) {
                        return;
                    }
                }
                None => return,
            }
        }

        // Stop requested: refuse new records, render what is already buffered.
        self.receiver.close();
        while let Some(record) = self.receiver.pop().await {
            if !self.emit(&record) {
                return;
            }
        }
    }

    async fn run_throttled(&mut self, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }
            match self.receiver.try_pop() {
                TryPop::Item(record) => {
                    if !self.emit(&record) {
                        return;
                    }
                }
                TryPop::Empty => {}
                TryPop::Closed => return,
            }
        }
    }

    /// Returns `false` when the sink can no longer be written to.
    fn emit(&mut self, record: &cwtail_core::LogRecord) -> bool {
        match self.sink.emit(record) {
            Ok(()) => {
                self.rendered.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(err) => {
                error!(error = %err, "failed to write record, stopping consumer");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
