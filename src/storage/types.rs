use crate::capabilities::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single persisted chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier for the message
    pub id: String,
    /// Author of the message
    pub role: Role,
    /// Message text (Markdown)
    pub content: String,
    /// When the message was created
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new user message with a fresh id and timestamp
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message with a fresh id and timestamp
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Metadata for a stored chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChat {
    /// Unique identifier for the chat
    pub id: String,
    /// Owner of the chat (always the local user in this client)
    pub user_id: String,
    /// User-friendly title derived from the first user message
    pub title: String,
    /// When the chat was created
    pub created_at: DateTime<Utc>,
    /// When the chat was last updated
    pub updated_at: DateTime<Utc>,
    /// Number of messages in the chat
    pub message_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_constructors() {
        let msg = ChatMessage::user("hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "hello");
        assert_eq!(msg.id.len(), 36);

        let msg = ChatMessage::assistant("hi");
        assert_eq!(msg.role, Role::Assistant);
    }

    #[test]
    fn test_chat_message_ids_are_unique() {
        let a = ChatMessage::user("a");
        let b = ChatMessage::user("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_chat_message_roundtrip() {
        let msg = ChatMessage::assistant("How can I help you today?");
        let json = serde_json::to_string(&msg).unwrap();
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, msg.id);
        assert_eq!(back.role, Role::Assistant);
        assert_eq!(back.content, msg.content);
    }
}
