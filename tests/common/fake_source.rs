//! ScriptedSource: a [`LogSource`] that replays canned responses per region.
//!
//! Each region has a queue of responses consumed one per fetch. What happens
//! once a region's script runs out is chosen per source:
//!
//! - [`Exhausted::Fail`] (default): a permanent error, so the poller stops and
//!   the pipeline finishes on its own.
//! - [`Exhausted::Idle`]: empty pages forever, for cancellation tests.
//!
//! A region registered with [`ScriptedSource::panic_in`] panics on its first
//! fetch instead.
//!
//! Every call is logged with the requested lower bound and the (tokio) time it
//! was made.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cwtail_feeds::{FetchRequest, LogSource, SourceError, SourceEvent};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exhausted {
    Fail,
    Idle,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub region: String,
    pub since: DateTime<Utc>,
    pub filter_pattern: Option<String>,
    pub at: Instant,
}

type Response = Result<Vec<SourceEvent>, SourceError>;

pub struct ScriptedSource {
    scripts: Mutex<HashMap<String, VecDeque<Response>>>,
    calls: Mutex<Vec<Call>>,
    exhausted: Exhausted,
    panics: Vec<String>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            exhausted: Exhausted::Fail,
            panics: Vec::new(),
        }
    }

    pub fn when_exhausted(mut self, exhausted: Exhausted) -> Self {
        self.exhausted = exhausted;
        self
    }

    /// Queue a successful page of events for `region`.
    pub fn respond(self, region: &str, events: Vec<SourceEvent>) -> Self {
        self.push(region, Ok(events));
        self
    }

    /// Make every fetch for `region` panic.
    pub fn panic_in(mut self, region: &str) -> Self {
        self.panics.push(region.to_string());
        self
    }

    /// Queue a failure for `region`.
    pub fn fail(self, region: &str, error: SourceError) -> Self {
        self.push(region, Err(error));
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn push(&self, region: &str, response: Response) {
        self.scripts
            .lock()
            .unwrap()
            .entry(region.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, region: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.region == region)
            .collect()
    }
}

#[async_trait]
impl LogSource for ScriptedSource {
    async fn fetch(&self, request: FetchRequest<'_>) -> Result<Vec<SourceEvent>, SourceError> {
        self.calls.lock().unwrap().push(Call {
            region: request.region.to_string(),
            since: request.since,
            filter_pattern: request.filter_pattern.map(str::to_string),
            at: Instant::now(),
        });

        if self.panics.iter().any(|r| r == request.region) {
            panic!("scripted panic in {}", request.region);
        }

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(request.region)
            .and_then(VecDeque::pop_front);

        match (next, self.exhausted) {
            (Some(response), _) => response,
            (None, Exhausted::Idle) => Ok(Vec::new()),
            (None, Exhausted::Fail) => Err(SourceError::Permanent {
                region: request.region.to_string(),
                message: "script exhausted".to_string(),
            }),
        }
    }
}
