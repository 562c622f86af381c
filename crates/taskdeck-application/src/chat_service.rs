use serde_json::{Value, json};
use std::sync::Arc;
use taskdeck_core::ApiError;
use taskdeck_core::chat::{
    ChatApi, ChatMessage, ChatRequest, GREETING, NO_REPLY, REQUEST_FAILED, Sender,
};
use taskdeck_core::project::Project;
use taskdeck_core::task::Task;
use tokio::sync::RwLock;

/// Builds the `context` payload the assistant receives.
pub fn chat_context(projects: &[Project], tasks: &[Task]) -> Value {
    json!({ "projects": projects, "tasks": tasks })
}

/// Keeps the assistant transcript and relays messages to `/ai/chat`.
///
/// The transcript always starts with a greeting from the bot.
pub struct ChatService {
    api: Arc<dyn ChatApi>,
    transcript: RwLock<Vec<ChatMessage>>,
}

impl ChatService {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            transcript: RwLock::new(vec![greeting()]),
        }
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.transcript.read().await.clone()
    }

    /// Appends `input` and the bot's answer to the transcript.
    ///
    /// Blank input is ignored and returns `Ok(None)`; otherwise the bot's
    /// entry is returned.
    ///
    /// # Errors
    ///
    /// A failed request still appends a bot entry flagged as an error
    /// before the error is returned.
    pub async fn send(
        &self,
        input: &str,
        context: Option<Value>,
    ) -> Result<Option<ChatMessage>, ApiError> {
        if input.trim().is_empty() {
            return Ok(None);
        }

        self.push(Sender::User, input.to_string(), false).await;

        let request = ChatRequest {
            message: input.to_string(),
            context,
        };
        match self.api.send_message(&request).await {
            Ok(reply) => {
                let text = reply.text().unwrap_or(NO_REPLY).to_string();
                Ok(Some(self.push(Sender::Bot, text, false).await))
            }
            Err(e) => {
                tracing::warn!("Chat request failed: {}", e);
                self.push(Sender::Bot, REQUEST_FAILED.to_string(), true)
                    .await;
                Err(e)
            }
        }
    }

    /// Resets the transcript to the greeting.
    pub async fn clear(&self) {
        *self.transcript.write().await = vec![greeting()];
    }

    async fn push(&self, sender: Sender, text: String, error: bool) -> ChatMessage {
        let mut transcript = self.transcript.write().await;
        let message = ChatMessage {
            id: transcript.len() + 1,
            sender,
            text,
            error,
        };
        transcript.push(message.clone());
        message
    }
}

fn greeting() -> ChatMessage {
    ChatMessage {
        id: 1,
        sender: Sender::Bot,
        text: GREETING.to_string(),
        error: false,
    }
}
