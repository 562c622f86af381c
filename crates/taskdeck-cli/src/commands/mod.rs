pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod projects;
pub mod tasks;

use anyhow::{Result, bail};
use std::sync::Arc;
use taskdeck_application::{ChatService, DataStore, SessionManager};
use taskdeck_core::auth::{TokenStore, User};
use taskdeck_core::config::ClientConfig;
use taskdeck_infrastructure::{FileTokenStore, TaskdeckPaths};
use taskdeck_interaction::HttpApiClient;

/// Services shared by every command, wired to one HTTP client.
pub struct App {
    pub session: Arc<SessionManager>,
    pub store: DataStore,
    pub chat: ChatService,
    pub json: bool,
}

impl App {
    pub fn new(config: &ClientConfig, paths: &TaskdeckPaths, json: bool) -> Result<Self> {
        let tokens: Arc<dyn TokenStore> =
            Arc::new(FileTokenStore::new(paths.credentials_file()));
        let client = Arc::new(HttpApiClient::from_settings(&config.api, tokens.clone())?);
        tracing::debug!(base_url = client.base_url(), "API client ready");

        let session = Arc::new(SessionManager::new(client.clone(), tokens));
        let store = DataStore::new(client.clone(), client.clone(), session.clone());
        let chat = ChatService::new(client);

        Ok(Self {
            session,
            store,
            chat,
            json,
        })
    }

    /// The signed-in user, or an error telling how to sign in.
    pub async fn require_user(&self) -> Result<User> {
        match self.session.current_user().await {
            Some(user) if self.session.is_authenticated().await => Ok(user),
            _ => bail!("Not logged in. Run `taskdeck login` first."),
        }
    }
}
