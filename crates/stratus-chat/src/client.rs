//! Chat completion client (OpenRouter-compatible API).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::gate::Rejection;
use crate::types::ChatMessage;

const COMPLETIONS_URL: &str = "https://openrouter.ai";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Assistant errors
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Absence of the credential is a configuration problem the caller
    /// surfaces in place of the feature's output, never a crash.
    #[error("API key not configured")]
    MissingApiKey,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Completion API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Completion response contained no content")]
    EmptyCompletion,
    #[error("Rate limited: retry in {}s", .0.retry_after_secs)]
    RateLimited(Rejection),
    #[error("Message is empty")]
    EmptyInput,
}

#[derive(Debug, Serialize)]
struct MessageRequest {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<MessageRequest>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct CompletionMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoiceResponse {
    message: CompletionMessageResponse,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoiceResponse>,
}

/// Non-streaming chat completion client.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl CompletionClient {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: COMPLETIONS_URL.to_string(),
            api_key,
            model: model.into(),
            max_tokens,
            temperature,
        })
    }

    /// Point the client at an alternate host (used by integration tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Whether a credential is available.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Request a completion for the system prompt plus ordered history.
    ///
    /// The last history entry is expected to be the user's newest message.
    pub async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
    ) -> Result<String, ChatError> {
        let Some(api_key) = self.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Err(ChatError::MissingApiKey);
        };

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(MessageRequest {
            role: "system".to_string(),
            content: system_prompt.to_string(),
        });
        messages.extend(history.iter().map(|m| MessageRequest {
            role: m.author.api_role().to_string(),
            content: m.text.clone(),
        }));

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/api/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Completion API returned {}: {}", status, message);
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|_| ChatError::EmptyCompletion)?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ChatError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let client = CompletionClient::new(None, "openai/gpt-3.5-turbo", 150, 0.7).unwrap();
        assert!(!client.is_configured());

        let history = [ChatMessage::user("Will it rain?", Utc::now())];
        let result = client.complete("You are a weather assistant.", &history).await;
        assert!(matches!(result, Err(ChatError::MissingApiKey)));
    }

    #[test]
    fn test_empty_key_counts_as_missing() {
        let client =
            CompletionClient::new(Some(String::new()), "openai/gpt-3.5-turbo", 150, 0.7).unwrap();
        assert!(!client.is_configured());
    }
}
