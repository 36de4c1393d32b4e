//! MergePoint: the bounded hand-off between region pollers and the consumer.
//!
//! A thin wrapper over a bounded `tokio::sync::mpsc` channel. Every poller
//! holds a cloned [`MergeSender`]; the single consumer owns the
//! [`MergeReceiver`]. When the buffer is full, [`MergeSender::push`] waits
//! instead of dropping, which is the pipeline's only backpressure mechanism.
//!
//! The merge point closes once every sender is dropped (or the receiver calls
//! [`MergeReceiver::close`]); the receiver then drains what is left and
//! reports end of stream.

use crate::types::LogRecord;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Create a merge point with room for `capacity` records.
///
/// # Panics
///
/// Panics if `capacity` is zero. [`TailSettings`](crate::TailSettings)
/// rejects a zero capacity before the pipeline is built.
pub fn merge_point(capacity: usize) -> (MergeSender, MergeReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    let depth = Arc::new(AtomicIsize::new(0));
    (
        MergeSender {
            tx,
            depth: depth.clone(),
        },
        MergeReceiver { rx, depth },
    )
}

/// Returned by [`MergeSender::push`] when the consumer side has gone away.
/// Carries the record back to the caller.
#[derive(Debug, thiserror::Error)]
#[error("merge point closed")]
pub struct MergeClosed(pub LogRecord);

/// Producer handle. Cheap to clone; one per poller.
#[derive(Debug, Clone)]
pub struct MergeSender {
    tx: mpsc::Sender<LogRecord>,
    depth: Arc<AtomicIsize>,
}

impl MergeSender {
    /// Push a record, waiting while the buffer is full.
    pub async fn push(&self, record: LogRecord) -> Result<(), MergeClosed> {
        // A cancelled send leaves the counter untouched.
        match self.tx.send(record).await {
            Ok(()) => {
                self.depth.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Err(mpsc::error::SendError(record)) => Err(MergeClosed(record)),
        }
    }

    /// Fixed capacity chosen at construction.
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// A read-only view of the buffer depth that does not keep the channel open.
    pub fn gauge(&self) -> MergeGauge {
        MergeGauge {
            depth: self.depth.clone(),
            capacity: self.capacity(),
        }
    }
}

/// Outcome of a non-blocking [`MergeReceiver::try_pop`].
#[derive(Debug, PartialEq)]
pub enum TryPop {
    Item(LogRecord),
    Empty,
    Closed,
}

/// Consumer handle.
#[derive(Debug)]
pub struct MergeReceiver {
    rx: mpsc::Receiver<LogRecord>,
    depth: Arc<AtomicIsize>,
}

impl MergeReceiver {
    /// Wait for the next record. Returns `None` once the merge point is closed
    /// and drained.
    pub async fn pop(&mut self) -> Option<LogRecord> {
        let record = self.rx.recv().await;
        if record.is_some() {
            self.depth.fetch_sub(1, Ordering::SeqCst);
        }
        record
    }

    /// Take a record if one is buffered right now.
    pub fn try_pop(&mut self) -> TryPop {
        match self.rx.try_recv() {
            Ok(record) => {
                self.depth.fetch_sub(1, Ordering::SeqCst);
                TryPop::Item(record)
            }
            Err(mpsc::error::TryRecvError::Empty) => TryPop::Empty,
            Err(mpsc::error::TryRecvError::Disconnected) => TryPop::Closed,
        }
    }

    /// Stop accepting new records. Already-buffered records can still be popped.
    pub fn close(&mut self) {
        self.rx.close();
    }

    /// Number of records currently buffered.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Buffer occupancy, for diagnostics.
#[derive(Debug, Clone)]
pub struct MergeGauge {
    depth: Arc<AtomicIsize>,
    capacity: usize,
}

impl MergeGauge {
    /// Records pushed and not yet popped. A pop can land before the matching
    /// push is counted, so the raw counter may briefly dip below zero.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst).max(0) as usize
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
