//! Chat endpoint trait.

use super::model::{ChatReply, ChatRequest};
use crate::error::ApiError;
use async_trait::async_trait;

#[async_trait]
pub trait ChatApi: Send + Sync {
    /// `POST /ai/chat`
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;
}
