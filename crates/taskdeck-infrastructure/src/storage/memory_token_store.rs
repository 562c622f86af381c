//! In-memory token store for tests.

use std::sync::{Arc, RwLock};
use taskdeck_core::auth::TokenStore;
use taskdeck_core::{DeckError, Result};

/// [`TokenStore`] that keeps the token in process memory.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Arc<RwLock<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token.into()))),
        }
    }
}

fn poisoned() -> DeckError {
    DeckError::internal("token store lock poisoned")
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let guard = self.token.read().map_err(|_| poisoned())?;
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        let mut guard = self.token.write().map_err(|_| poisoned())?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self.token.write().map_err(|_| poisoned())?;
        *guard = None;
        Ok(())
    }
}
