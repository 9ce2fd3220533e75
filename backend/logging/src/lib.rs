//! Structured logging for streamchat.
//!
//! Handles subscriber setup (console + rolling NDJSON file), log redaction,
//! and the chat event log.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{ChatEvent, ChatEventLogger, EventLogEntry};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
