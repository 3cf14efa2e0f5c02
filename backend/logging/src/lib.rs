//! Structured logging for Iris.
//!
//! Console output, optional rolling JSON files, secret redaction, and
//! pipeline outcome events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogger, PipelineEvent, PipelineEventEntry};
pub use logger::{LoggerGuard, init_logger};
pub use redact::redact_sensitive_data;
