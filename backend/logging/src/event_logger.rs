//! Pipeline Event Logger
//!
//! One structured event per pipeline outcome, emitted under the
//! `pipeline_events` target so it can be routed separately.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    DescriptionCompleted {
        provider: String,
        chars: usize,
        elapsed_ms: u64,
    },
    NoTextFound {
        provider: String,
        elapsed_ms: u64,
    },
    TextExtracted {
        provider: String,
        chars: usize,
        elapsed_ms: u64,
    },
    SpeechSynthesized {
        provider: String,
        bytes: usize,
        elapsed_ms: u64,
    },
    Failed {
        stage: String,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct PipelineEventEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: PipelineEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redacts error text, stamps the event, and hands it to `tracing`.
    pub fn log_event(request_id: &str, mut event: PipelineEvent) {
        if let PipelineEvent::Failed { error_msg, .. } = &mut event {
            *error_msg = redact_sensitive_data(error_msg);
        }
        let failed = matches!(event, PipelineEvent::Failed { .. });

        let entry = PipelineEventEntry {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            event,
        };

        if failed {
            warn!(target: "pipeline_events", event = ?entry, "Pipeline event");
        } else {
            info!(target: "pipeline_events", event = ?entry, "Pipeline event");
        }
    }
}
