//! CaptureSink: a [`RecordSink`] that keeps every rendered record.
//!
//! Clones share the same buffer, so a test can hand one clone to the pipeline
//! and inspect the other afterwards.

use cwtail_core::{LogRecord, RecordSink, Renderer};
use std::io;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Captured {
    pub record: LogRecord,
    pub line: String,
    pub at: Instant,
}

#[derive(Clone, Default)]
pub struct CaptureSink {
    renderer: Renderer,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn captured(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.captured.lock().unwrap().len()
    }

    /// Record IDs in render order.
    pub fn ids(&self) -> Vec<String> {
        self.captured()
            .into_iter()
            .map(|c| c.record.record_id)
            .collect()
    }

    /// Record IDs rendered for one region, in render order.
    pub fn ids_for(&self, region: &str) -> Vec<String> {
        self.captured()
            .into_iter()
            .filter(|c| c.record.region == region)
            .map(|c| c.record.record_id)
            .collect()
    }

    pub fn lines(&self) -> Vec<String> {
        self.captured().into_iter().map(|c| c.line).collect()
    }

    pub fn times(&self) -> Vec<Instant> {
        self.captured().into_iter().map(|c| c.at).collect()
    }
}

impl RecordSink for CaptureSink {
    fn emit(&mut self, record: &LogRecord) -> io::Result<()> {
        let line = self.renderer.render(record);
        self.captured.lock().unwrap().push(Captured {
            record: record.clone(),
            line,
            at: Instant::now(),
        });
        Ok(())
    }
}
