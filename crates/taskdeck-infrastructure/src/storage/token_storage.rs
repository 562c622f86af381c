//! Persisted token file storage.
//!
//! Stores the bearer token in `credentials.json` as `{"auth_token": "..."}`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use taskdeck_core::auth::TokenStore;
use taskdeck_core::{DeckError, Result};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    auth_token: Option<String>,
}

/// File-backed [`TokenStore`].
///
/// Responsibilities:
/// - Read and write the single token under a fixed key
/// - Restrict the file to its owner on Unix
///
/// Does NOT:
/// - Validate the token (the server does that)
/// - Cache the token in memory
///
/// A file that exists but cannot be parsed is an error; callers decide
/// whether to clear it.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, contents: &CredentialsFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(contents)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;

        // Set file permissions to 600 (user read/write only) on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let file: CredentialsFile = serde_json::from_str(&content)?;
        Ok(file.auth_token.filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(DeckError::internal("Refusing to store an empty token"));
        }
        self.write(&CredentialsFile {
            auth_token: Some(token.to_string()),
        })?;
        tracing::debug!("Stored auth token at {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("Removed auth token at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
