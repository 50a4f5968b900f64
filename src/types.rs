use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

static MESSAGE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Next transcript identity. Monotonic for the lifetime of the process.
pub fn next_message_id() -> u64 {
    MESSAGE_COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: Role,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: next_message_id(),
            role,
            content: content.into(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Thumbs up / down on an assistant reply. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rating {
    Up,
    Down,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_are_monotonic() {
        let first = ChatMessage::user("a");
        let second = ChatMessage::assistant("b");
        assert!(second.id > first.id);
        assert_eq!(first.role, Role::User);
        assert_eq!(second.role, Role::Assistant);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }

    #[test]
    fn message_reads_back_rfc3339_timestamp() {
        let raw = r#"{"id":7,"role":"user","content":"hi","timestamp":"2024-05-01T12:30:00Z"}"#;
        let msg: ChatMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.id, 7);
        assert_eq!(msg.timestamp.unix_timestamp(), 1_714_566_600);

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["timestamp"], "2024-05-01T12:30:00Z");
    }
}
