use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

impl Author {
    /// Role string expected by the completion API
    pub fn api_role(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One entry in the append-only message log.
///
/// Messages are never edited or removed once created; the rate limiter can
/// only reject a would-be append before it exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub author: Author,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Author::User, text, timestamp)
    }

    pub fn assistant(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Author::Assistant, text, timestamp)
    }

    fn new(author: Author, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            author,
            text: text.into(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_role() {
        assert_eq!(Author::User.api_role(), "user");
        assert_eq!(Author::Assistant.api_role(), "assistant");
    }

    #[test]
    fn test_messages_get_distinct_ids() {
        let now = Utc::now();
        let a = ChatMessage::user("hi", now);
        let b = ChatMessage::user("hi", now);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let msg = ChatMessage::assistant("Sunny all day", Utc::now());
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"author\":\"assistant\""));
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.text, "Sunny all day");
    }
}
