//! Rendering of delivered records into output lines.
//!
//! Line format: `[{region:>width}] {timestamp}: {message}`.

use crate::config::RenderConfig;
use crate::types::LogRecord;
use chrono::Local;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Formats a [`LogRecord`] as a single output line (without trailing newline).
#[derive(Debug, Clone)]
pub struct Renderer {
    region_width: usize,
    timestamp_format: String,
    local_time: bool,
}

impl Renderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            region_width: config.region_width,
            timestamp_format: config.timestamp_format.clone(),
            local_time: config.local_time,
        }
    }

    pub fn render(&self, record: &LogRecord) -> String {
        let mut line = String::with_capacity(record.message.len() + 64);
        let _ = write!(line, "[{:>width$}] ", record.region, width = self.region_width);
        let prefix_len = line.len();

        let formatted = if self.local_time {
            write!(
                line,
                "{}",
                record
                    .timestamp
                    .with_timezone(&Local)
                    .format(&self.timestamp_format)
            )
        } else {
            write!(line, "{}", record.timestamp.format(&self.timestamp_format))
        };
        if formatted.is_err() {
            // Settings validation rejects bad formats; this only guards
            // renderers built directly from an unchecked config.
            line.truncate(prefix_len);
            line.push_str(&record.timestamp.to_rfc3339());
        }

        let _ = write!(line, ": {}", record.message);
        line
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

/// Returns `true` if chrono can render `format`.
pub fn is_valid_timestamp_format(format: &str) -> bool {
    let sample = chrono::DateTime::<chrono::Utc>::default();
    let mut out = String::new();
    write!(out, "{}", sample.format(format)).is_ok()
}

/// Destination for records drained by the consumer.
pub trait RecordSink: Send {
    fn emit(&mut self, record: &LogRecord) -> io::Result<()>;
}

/// Writes one rendered line per record to any [`Write`] target.
pub struct LineSink<W> {
    renderer: Renderer,
    writer: W,
}

impl<W: Write + Send> LineSink<W> {
    pub fn new(renderer: Renderer, writer: W) -> Self {
        Self { renderer, writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl LineSink<io::Stdout> {
    pub fn stdout(renderer: Renderer) -> Self {
        Self::new(renderer, io::stdout())
    }
}

impl<W: Write + Send> RecordSink for LineSink<W> {
    fn emit(&mut self, record: &LogRecord) -> io::Result<()> {
        writeln!(self.writer, "{}", self.renderer.render(record))?;
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
