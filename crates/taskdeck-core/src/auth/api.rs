//! Auth endpoints trait.

use super::model::{Credentials, ProfileUpdate, Registration, TokenResponse, User};
use crate::error::ApiError;
use async_trait::async_trait;

/// The `/auth/*` surface of the remote API.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError>;

    /// `POST /auth/register`. The response carries a token only when the
    /// backend logs the new account in immediately.
    async fn register(&self, registration: &Registration) -> Result<TokenResponse, ApiError>;

    /// `GET /auth/me`
    async fn current_user(&self) -> Result<User, ApiError>;

    /// `PUT /auth/me`
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError>;
}
