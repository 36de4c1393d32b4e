//! CloudWatch Logs adapter.
//!
//! One `aws_sdk_cloudwatchlogs::Client` per region, all built from a single
//! shared AWS config loaded for the selected credential profile. Credentials
//! are resolved lazily by the SDK on the first call, so a region whose
//! credentials fail surfaces [`SourceError::Auth`] from its own fetch and
//! other regions keep running.

use crate::source::{FetchRequest, LogSource, SourceError, SourceEvent};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudwatchlogs::config::Region;
use aws_sdk_cloudwatchlogs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudwatchlogs::Client;
use cwtail_core::types::{millis_to_time, time_to_millis};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Error codes the service returns for throttling or temporary unavailability.
const TRANSIENT_CODES: &[&str] = &[
    "ThrottlingException",
    "ServiceUnavailableException",
    "LimitExceededException",
    "RequestTimeout",
    "RequestTimeoutException",
    "InternalFailure",
];

/// Error codes for rejected or missing credentials.
const AUTH_CODES: &[&str] = &[
    "UnrecognizedClientException",
    "AccessDeniedException",
    "ExpiredTokenException",
    "InvalidSignatureException",
    "IncompleteSignature",
];

pub struct CloudWatchSource {
    clients: HashMap<String, Client>,
}

impl CloudWatchSource {
    /// Load AWS configuration for `profile` (or the default chain) and create a
    /// client for every region in `regions`.
    pub async fn connect(profile: Option<&str>, regions: &[String]) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let shared = loader.load().await;

        let clients = regions
            .iter()
            .map(|region| {
                let conf = aws_sdk_cloudwatchlogs::config::Builder::from(&shared)
                    .region(Region::new(region.clone()))
                    .build();
                (region.clone(), Client::from_conf(conf))
            })
            .collect();

        Self { clients }
    }
}

#[async_trait]
impl LogSource for CloudWatchSource {
    async fn fetch(&self, request: FetchRequest<'_>) -> Result<Vec<SourceEvent>, SourceError> {
        let region = request.region;
        let client = self
            .clients
            .get(region)
            .ok_or_else(|| SourceError::UnknownRegion(region.to_string()))?;

        let mut pages = client
            .filter_log_events()
            .log_group_name(request.log_group)
            .start_time(time_to_millis(request.since))
            .set_filter_pattern(request.filter_pattern.map(str::to_string))
            .into_paginator()
            .send();

        let mut events = Vec::new();
        let mut skipped = 0usize;
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| classify_sdk_error(region, err))?;
            for event in page.events() {
                let parsed = match (event.event_id(), event.timestamp().and_then(millis_to_time)) {
                    (Some(id), Some(ts)) => {
                        SourceEvent::new(id, ts, event.message().unwrap_or_default())
                    }
                    _ => {
                        skipped += 1;
                        continue;
                    }
                };
                events.push(parsed);
            }
        }

        if skipped > 0 {
            debug!(region, skipped, "skipped events without id or timestamp");
        }
        trace!(region, count = events.len(), "fetched events");
        Ok(events)
    }
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

/// Coarse failure class, independent of the SDK error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorClass {
    Transient,
    Permanent,
    Auth,
}

fn classify_code(code: Option<&str>) -> ErrorClass {
    match code {
        Some(code) if TRANSIENT_CODES.contains(&code) => ErrorClass::Transient,
        Some(code) if AUTH_CODES.contains(&code) => ErrorClass::Auth,
        _ => ErrorClass::Permanent,
    }
}

/// Failures that happen before a response exists. Credential resolution
/// failures are reported here too, only recognisable by their text.
fn classify_pre_response(message: &str, default: ErrorClass) -> ErrorClass {
    if message.to_ascii_lowercase().contains("credential") {
        ErrorClass::Auth
    } else {
        default
    }
}

fn classify_sdk_error<E, R>(region: &str, err: SdkError<E, R>) -> SourceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    let class = match &err {
        SdkError::ServiceError(ctx) => classify_code(ctx.err().code()),
        SdkError::TimeoutError(_) | SdkError::ResponseError(_) => ErrorClass::Transient,
        SdkError::DispatchFailure(_) => classify_pre_response(&message, ErrorClass::Transient),
        SdkError::ConstructionFailure(_) => classify_pre_response(&message, ErrorClass::Permanent),
        _ => ErrorClass::Permanent,
    };

    let region = region.to_string();
    match class {
        ErrorClass::Transient => SourceError::Transient { region, message },
        ErrorClass::Permanent => SourceError::Permanent { region, message },
        ErrorClass::Auth => SourceError::Auth { region, message },
    }
}
