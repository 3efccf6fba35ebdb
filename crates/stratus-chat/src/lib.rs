//! AI assistant for Stratus
//!
//! A rate-limited chat session and one-shot weather summarizer backed by an
//! OpenRouter-compatible completion API.

pub mod client;
pub mod gate;
pub mod session;
pub mod summary;
pub mod types;

pub use client::{ChatError, CompletionClient};
pub use gate::{RejectReason, Rejection, RequestGate};
pub use session::{ChatSession, CHAT_SYSTEM_PROMPT};
pub use summary::{weather_context, SUMMARY_SYSTEM_PROMPT};
pub use types::{Author, ChatMessage};
