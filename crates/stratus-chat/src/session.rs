//! Gated chat session holding the append-only message log.

use chrono::{DateTime, Utc};

use stratus_weather::types::{TemperatureUnit, WeatherSnapshot};

use crate::client::{ChatError, CompletionClient};
use crate::gate::RequestGate;
use crate::summary::{weather_context, SUMMARY_SYSTEM_PROMPT};
use crate::types::ChatMessage;

pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful weather assistant. \
Answer questions about weather, suggest outdoor activities based on weather conditions, \
and provide weather-related tips. Keep responses concise and friendly. \
Use emojis to make responses more engaging.";

const GREETING: &str = "Hello! I'm your AI weather assistant. Ask me anything about \
the weather, or get suggestions for outdoor activities based on current conditions!";

/// One chat conversation: the message log, the admission gate, and the
/// completion client. The gate also covers one-shot summaries; it shares no
/// state with the weather fetcher.
pub struct ChatSession {
    client: CompletionClient,
    gate: RequestGate,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(client: CompletionClient) -> Self {
        Self {
            client,
            gate: RequestGate::new(),
            messages: vec![ChatMessage::assistant(GREETING, Utc::now())],
        }
    }

    /// The full log, greeting first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Send a user message and append the assistant's reply.
    ///
    /// On any rejection (empty input, rate limit) the log is untouched and
    /// the caller keeps the input to resend. On a completion failure the
    /// user's message stays in the log and the error is surfaced.
    pub async fn send(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<ChatMessage, ChatError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        self.gate.try_admit(now).map_err(ChatError::RateLimited)?;

        self.messages.push(ChatMessage::user(trimmed, now));
        let reply_text = self.client.complete(CHAT_SYSTEM_PROMPT, &self.messages).await?;

        let reply = ChatMessage::assistant(reply_text, Utc::now());
        self.messages.push(reply.clone());
        Ok(reply)
    }

    /// Produce a one-shot summary of the snapshot. Gated like a chat
    /// message but not appended to the conversation log.
    pub async fn summarize(
        &mut self,
        snapshot: &WeatherSnapshot,
        location_name: &str,
        unit: TemperatureUnit,
        now: DateTime<Utc>,
    ) -> Result<String, ChatError> {
        self.gate.try_admit(now).map_err(ChatError::RateLimited)?;

        let request = ChatMessage::user(
            format!(
                "Please summarize this weather data:\n{}",
                weather_context(snapshot, location_name, unit)
            ),
            now,
        );
        self.client
            .complete(SUMMARY_SYSTEM_PROMPT, std::slice::from_ref(&request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Author;

    fn session() -> ChatSession {
        let client = CompletionClient::new(None, "openai/gpt-3.5-turbo", 150, 0.7)
            .expect("client builds");
        ChatSession::new(client)
    }

    #[test]
    fn test_session_seeds_greeting() {
        let session = session();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].author, Author::Assistant);
        assert!(session.messages()[0].text.contains("weather assistant"));
    }

    #[tokio::test]
    async fn test_empty_input_rejected_without_log_change() {
        let mut session = session();
        let result = session.send("   ", Utc::now()).await;
        assert!(matches!(result, Err(ChatError::EmptyInput)));
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_rejection_preserves_log() {
        let mut session = session();
        let t0 = Utc::now();
        // First send passes the gate, then fails on the missing key; the
        // user message is already committed at that point.
        let _ = session.send("Will it rain?", t0).await;
        let after_first = session.messages().len();

        // Immediate second send trips the cooldown before anything is
        // appended.
        let result = session.send("Still there?", t0).await;
        assert!(matches!(result, Err(ChatError::RateLimited(_))));
        assert_eq!(session.messages().len(), after_first);
    }
}
