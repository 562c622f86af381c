use crate::client::HttpApiClient;
use async_trait::async_trait;
use taskdeck_core::ApiError;
use taskdeck_core::auth::{AuthApi, Credentials, ProfileUpdate, Registration, TokenResponse, User};

#[async_trait]
impl AuthApi for HttpApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        self.post("/auth/login", credentials).await
    }

    async fn register(&self, registration: &Registration) -> Result<TokenResponse, ApiError> {
        self.post("/auth/register", registration).await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/auth/me").await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.put("/auth/me", update).await
    }
}
