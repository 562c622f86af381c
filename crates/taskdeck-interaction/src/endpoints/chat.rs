use crate::client::HttpApiClient;
use async_trait::async_trait;
use taskdeck_core::ApiError;
use taskdeck_core::chat::{ChatApi, ChatReply, ChatRequest};

#[async_trait]
impl ChatApi for HttpApiClient {
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.post("/ai/chat", request).await
    }
}
