//! Chat Event Logger
//!
//! Structured submission events written through `tracing` under the
//! `chat_events` target, so the JSON file layer records them as NDJSON.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Submitted {
        input: String,
        max_new_tokens: u32,
        temperature: f32,
    },
    Completed {
        output_chars: usize,
        latency_ms: u64,
    },
    Aborted {
        error_msg: String,
    },
    Cleared {
        turns: usize,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: ChatEvent,
}

pub struct ChatEventLogger;

impl ChatEventLogger {
    /// Redact free text in the event and build the log entry.
    pub fn entry(session_id: &str, mut event: ChatEvent) -> EventLogEntry {
        match &mut event {
            ChatEvent::Submitted { input, .. } => *input = redact_sensitive_data(input),
            ChatEvent::Aborted { error_msg } => *error_msg = redact_sensitive_data(error_msg),
            ChatEvent::Completed { .. } | ChatEvent::Cleared { .. } => {}
        }
        EventLogEntry {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    /// Log a chat event for a session.
    pub fn log_event(session_id: &str, event: ChatEvent) {
        let entry = Self::entry(session_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_default();
        match entry.event {
            ChatEvent::Aborted { .. } => warn!(target: "chat_events", event = %json, "Chat event"),
            _ => info!(target: "chat_events", event = %json, "Chat event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_redacts_input() {
        let entry = ChatEventLogger::entry(
            "s1",
            ChatEvent::Submitted {
                input: "my key is sk-aaaaaaaaaaaaaaaaaaaaaaaa".into(),
                max_new_tokens: 400,
                temperature: 0.1,
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "submitted");
        assert_eq!(json["event"]["input"], "my key is [REDACTED_TOKEN]");
        assert_eq!(json["session_id"], "s1");
    }

    #[test]
    fn test_completed_passes_through() {
        let event = ChatEvent::Completed {
            output_chars: 11,
            latency_ms: 250,
        };
        let entry = ChatEventLogger::entry("s1", event.clone());
        assert_eq!(entry.event, event);
    }
}
