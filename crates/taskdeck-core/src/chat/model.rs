//! Chat domain model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// First entry of every transcript.
pub const GREETING: &str =
    "Hi! I can help you with your projects and tasks. What would you like to know?";

/// Shown when the service answered without any text.
pub const NO_REPLY: &str = "Sorry, I could not process that request.";

/// Stands in for the reply when the request itself failed.
pub const REQUEST_FAILED: &str = "Sorry, I encountered an error. Please try again.";

/// Who wrote a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One line of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: usize,
    pub sender: Sender,
    pub text: String,
    /// Set on bot entries that stand in for a failed request.
    #[serde(default)]
    pub error: bool,
}

/// Payload for `POST /ai/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Snapshot of the user's projects and tasks, passed through as-is.
    pub context: Option<Value>,
}

/// Reply from `POST /ai/chat`; backends use either field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatReply {
    /// The reply text, preferring `response` over `message`.
    pub fn text(&self) -> Option<&str> {
        self.response
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.message.as_deref().filter(|s| !s.is_empty()))
    }
}
