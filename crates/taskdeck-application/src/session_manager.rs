use async_trait::async_trait;
use std::sync::Arc;
use taskdeck_core::AuthError;
use taskdeck_core::auth::{
    AuthApi, AuthState, Credentials, ProfileUpdate, Registration, Session, SessionGate,
    TokenResponse, TokenStore, User,
};
use tokio::sync::RwLock;

/// Owns the bearer token lifecycle and the current user.
///
/// `SessionManager` is responsible for:
/// - Restoring a session from the persisted token on startup
/// - Logging in, registering and logging out
/// - Keeping the current user fresh
/// - Holding the last authentication error until it is cleared
///
/// State transitions:
///
/// ```text
/// Unauthenticated ──login/register──▶ Authenticating ──ok──▶ Authenticated
///        ▲                                  │                    │
///        └──────────────failure─────────────┘                    │
///        └────────logout / 401 / failed refresh──────────────────┘
/// ```
pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    tokens: Arc<dyn TokenStore>,
    session: RwLock<Session>,
    error: RwLock<Option<String>>,
}

impl SessionManager {
    /// Creates an unauthenticated manager. Call [`initialize`](Self::initialize)
    /// to restore a persisted session.
    pub fn new(api: Arc<dyn AuthApi>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            tokens,
            session: RwLock::new(Session::unauthenticated()),
            error: RwLock::new(None),
        }
    }

    /// Restores the session from the persisted token.
    ///
    /// Never fails: an unreadable, expired or rejected token is cleared and
    /// the result is an unauthenticated session.
    pub async fn initialize(&self) -> Session {
        let token = match self.tokens.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::debug!("No stored token, starting unauthenticated");
                return self.reset().await;
            }
            Err(e) => {
                tracing::warn!("Could not read stored token: {}", e);
                self.discard_token();
                return self.reset().await;
            }
        };

        match self.api.current_user().await {
            Ok(user) => {
                tracing::info!(username = %user.username, "Restored session");
                let session = Session::authenticated(token, user);
                *self.session.write().await = session.clone();
                session
            }
            Err(e) => {
                tracing::warn!("Stored token was not accepted: {}", e);
                self.discard_token();
                self.reset().await
            }
        }
    }

    /// Logs in, persists the returned token and loads the current user.
    ///
    /// # Errors
    ///
    /// On failure the session is unauthenticated and the message is also
    /// available from [`error`](Self::error) until cleared.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), AuthError> {
        self.begin().await;
        let outcome = match self.api.login(credentials).await {
            Ok(response) => self.complete(response, true).await,
            Err(e) => Err(e.into()),
        };
        self.settle(outcome).await
    }

    /// Creates an account.
    ///
    /// When the backend answers with a token the new account is logged in
    /// exactly like [`login`](Self::login); otherwise the session stays
    /// unauthenticated and the caller has to log in separately.
    pub async fn register(&self, registration: &Registration) -> Result<(), AuthError> {
        self.begin().await;
        let outcome = match self.api.register(registration).await {
            Ok(response) => self.complete(response, false).await,
            Err(e) => Err(e.into()),
        };
        self.settle(outcome).await
    }

    /// Clears the persisted token and the in-memory session. Makes no
    /// network call.
    pub async fn logout(&self) {
        self.discard_token();
        *self.session.write().await = Session::unauthenticated();
        *self.error.write().await = None;
        tracing::info!("Logged out");
    }

    /// Re-fetches the current user. Does nothing while unauthenticated.
    ///
    /// # Errors
    ///
    /// Any failure logs the session out before the error is returned.
    pub async fn refresh_user(&self) -> Result<(), AuthError> {
        if !self.is_authenticated().await {
            return Ok(());
        }

        match self.api.current_user().await {
            Ok(user) => {
                let mut session = self.session.write().await;
                if session.is_authenticated() {
                    session.user = Some(user);
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Refreshing the current user failed, logging out: {}", e);
                self.logout().await;
                Err(e.into())
            }
        }
    }

    /// Sends a profile update, then refreshes the current user.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, AuthError> {
        let updated = match self.api.update_profile(update).await {
            Ok(user) => user,
            Err(e) => {
                if e.is_unauthorized() {
                    self.logout().await;
                }
                return Err(e.into());
            }
        };

        self.refresh_user().await?;
        Ok(self.current_user().await.unwrap_or(updated))
    }

    /// A copy of the current session.
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn state(&self) -> AuthState {
        self.session.read().await.state
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    /// The message of the last failed login or registration.
    pub async fn error(&self) -> Option<String> {
        self.error.read().await.clone()
    }

    pub async fn clear_error(&self) {
        *self.error.write().await = None;
    }

    async fn begin(&self) {
        *self.error.write().await = None;
        *self.session.write().await = Session {
            token: None,
            user: None,
            state: AuthState::Authenticating,
        };
    }

    async fn complete(&self, response: TokenResponse, require_token: bool) -> Result<(), AuthError> {
        match response.access_token.filter(|token| !token.is_empty()) {
            Some(token) => self.establish(token).await,
            None if require_token => Err(AuthError::MissingToken),
            None => {
                tracing::info!("Account created; log in to continue");
                *self.session.write().await = Session::unauthenticated();
                Ok(())
            }
        }
    }

    async fn establish(&self, token: String) -> Result<(), AuthError> {
        self.tokens.save(&token)?;

        match self.api.current_user().await {
            Ok(user) => {
                tracing::info!(username = %user.username, "Logged in");
                *self.session.write().await = Session::authenticated(token, user);
                Ok(())
            }
            Err(e) => {
                self.discard_token();
                Err(e.into())
            }
        }
    }

    async fn settle(&self, outcome: Result<(), AuthError>) -> Result<(), AuthError> {
        if let Err(e) = &outcome {
            tracing::warn!("Authentication failed: {}", e);
            *self.session.write().await = Session::unauthenticated();
            *self.error.write().await = Some(e.to_string());
        }
        outcome
    }

    async fn reset(&self) -> Session {
        let session = Session::unauthenticated();
        *self.session.write().await = session.clone();
        session
    }

    fn discard_token(&self) {
        if let Err(e) = self.tokens.clear() {
            tracing::warn!("Failed to clear stored token: {}", e);
        }
    }
}

#[async_trait]
impl SessionGate for SessionManager {
    async fn is_authenticated(&self) -> bool {
        SessionManager::is_authenticated(self).await
    }

    async fn invalidate(&self) {
        tracing::warn!("Server rejected the session");
        self.logout().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{GOOD_PASSWORD, MockBackend, VALID_TOKEN};
    use taskdeck_core::{ApiError, ApiErrorKind};
    use taskdeck_infrastructure::FileTokenStore;
    use tempfile::TempDir;

    fn manager(backend: &Arc<MockBackend>) -> SessionManager {
        SessionManager::new(backend.clone(), Arc::new(backend.tokens()))
    }

    async fn signed_in() -> (Arc<MockBackend>, SessionManager) {
        let backend = Arc::new(MockBackend::new());
        backend.tokens().save(VALID_TOKEN).unwrap();
        let manager = manager(&backend);
        manager.initialize().await;
        (backend, manager)
    }

    #[tokio::test]
    async fn test_initialize_without_token() {
        let backend = Arc::new(MockBackend::new());

        let session = manager(&backend).initialize().await;
        assert_eq!(session.state, AuthState::Unauthenticated);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_restores_valid_token() {
        let (_backend, manager) = signed_in().await;

        assert!(manager.session().await.is_authenticated());
        assert_eq!(manager.current_user().await.unwrap().username, "ada");
    }

    #[tokio::test]
    async fn test_initialize_with_expired_token_clears_it() {
        let backend = Arc::new(MockBackend::new());
        backend.tokens().save("expired").unwrap();

        let session = manager(&backend).initialize().await;
        assert_eq!(session.state, AuthState::Unauthenticated);
        assert_eq!(backend.tokens().load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_initialize_with_corrupted_token_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        std::fs::write(&path, "{ not json").unwrap();

        let backend = Arc::new(MockBackend::new());
        let manager =
            SessionManager::new(backend.clone(), Arc::new(FileTokenStore::new(path.clone())));

        let session = manager.initialize().await;
        assert_eq!(session.state, AuthState::Unauthenticated);
        assert!(backend.calls().is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_login_success() {
        let backend = Arc::new(MockBackend::new());
        let manager = manager(&backend);

        manager
            .login(&Credentials::new("ada", GOOD_PASSWORD))
            .await
            .unwrap();

        assert_eq!(manager.state().await, AuthState::Authenticated);
        assert_eq!(backend.tokens().load().unwrap().as_deref(), Some(VALID_TOKEN));
        assert_eq!(manager.error().await, None);
    }

    #[tokio::test]
    async fn test_state_is_authenticating_while_login_is_in_flight() {
        let backend = Arc::new(MockBackend::new());
        let manager = manager(&backend);

        let release = backend.hold_next();
        let credentials = Credentials::new("ada", GOOD_PASSWORD);
        let (outcome, ()) = tokio::join!(manager.login(&credentials), async {
            backend.wait_until_paused().await;
            assert_eq!(manager.state().await, AuthState::Authenticating);
            assert!(!manager.is_authenticated().await);
            release.notify_one();
        });

        outcome.unwrap();
        assert_eq!(manager.state().await, AuthState::Authenticated);
    }

    #[tokio::test]
    async fn test_state_is_authenticating_while_register_is_in_flight() {
        let backend = Arc::new(MockBackend::new());
        let manager = manager(&backend);
        let registration = Registration {
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            password: GOOD_PASSWORD.to_string(),
        };

        let release = backend.hold_next();
        let (outcome, ()) = tokio::join!(manager.register(&registration), async {
            backend.wait_until_paused().await;
            assert_eq!(manager.state().await, AuthState::Authenticating);
            release.notify_one();
        });

        outcome.unwrap();
        assert_eq!(manager.state().await, AuthState::Authenticated);
    }

    #[tokio::test]
    async fn test_login_with_invalid_credentials() {
        let backend = Arc::new(MockBackend::new());
        let manager = manager(&backend);

        let err = manager
            .login(&Credentials::new("ada", "wrong"))
            .await
            .unwrap_err();

        assert!(matches!(&err, AuthError::Api(api) if api.kind == ApiErrorKind::Unauthorized));
        assert_eq!(manager.state().await, AuthState::Unauthenticated);
        assert_eq!(
            manager.error().await.as_deref(),
            Some("Incorrect username or password")
        );
        assert_eq!(backend.tokens().load().unwrap(), None);

        manager.clear_error().await;
        assert_eq!(manager.error().await, None);
        assert_eq!(manager.state().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_without_token_in_response() {
        let backend = Arc::new(MockBackend::new());
        backend.omit_tokens();
        let manager = manager(&backend);

        let err = manager
            .login(&Credentials::new("ada", GOOD_PASSWORD))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
        assert!(!manager.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_register_with_and_without_auto_login() {
        let backend = Arc::new(MockBackend::new());
        let manager = manager(&backend);
        let registration = Registration {
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            password: GOOD_PASSWORD.to_string(),
        };

        manager.register(&registration).await.unwrap();
        assert!(manager.is_authenticated().await);

        manager.logout().await;
        backend.omit_tokens();

        manager.register(&registration).await.unwrap();
        assert_eq!(manager.state().await, AuthState::Unauthenticated);
        assert_eq!(backend.tokens().load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_refresh_logs_out() {
        let (backend, manager) = signed_in().await;

        backend.fail_next(ApiError::network("Network Error"));
        assert!(manager.refresh_user().await.is_err());

        assert_eq!(manager.state().await, AuthState::Unauthenticated);
        assert_eq!(backend.tokens().load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_profile_refreshes_user() {
        let (_backend, manager) = signed_in().await;

        let update = ProfileUpdate {
            username: Some("lovelace".to_string()),
            ..Default::default()
        };
        let user = manager.update_profile(&update).await.unwrap();

        assert_eq!(user.username, "lovelace");
        assert_eq!(manager.current_user().await.unwrap().username, "lovelace");
    }

    #[tokio::test]
    async fn test_invalidate_drops_session() {
        let (backend, manager) = signed_in().await;

        SessionGate::invalidate(&manager).await;

        assert!(!SessionGate::is_authenticated(&manager).await);
        assert_eq!(backend.tokens().load().unwrap(), None);
    }
}
