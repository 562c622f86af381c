//! Unified path management for taskdeck files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/taskdeck/          # Config directory (platform default)
//! ├── config.toml              # Client configuration
//! └── credentials.json         # Persisted bearer token (mode 600)
//! ```
//!
//! Every path can be rooted elsewhere by constructing [`TaskdeckPaths`] with
//! an explicit base directory, which is how tests and `--config-dir` work.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "taskdeck";
const CONFIG_FILE: &str = "config.toml";
const CREDENTIALS_FILE: &str = "credentials.json";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for taskdeck_core::DeckError {
    fn from(err: PathError) -> Self {
        taskdeck_core::DeckError::config(err.to_string())
    }
}

/// Resolves the files taskdeck reads and writes.
#[derive(Debug, Clone)]
pub struct TaskdeckPaths {
    config_dir: PathBuf,
}

impl TaskdeckPaths {
    /// Uses `base` when given, otherwise the platform config directory
    /// (e.g. `~/.config/taskdeck/`).
    pub fn new(base: Option<&Path>) -> Result<Self, PathError> {
        let config_dir = match base {
            Some(base) => base.to_path_buf(),
            None => dirs::config_dir()
                .ok_or(PathError::ConfigDirNotFound)?
                .join(APP_DIR),
        };
        Ok(Self { config_dir })
    }

    /// Paths rooted at an explicit directory.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: base.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path to `config.toml`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Path to the persisted token file.
    ///
    /// # Security Note
    ///
    /// The file is written with mode 600 on Unix.
    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join(CREDENTIALS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dir_ends_with_app_name() {
        // Skip on hosts without a resolvable config dir.
        if let Ok(paths) = TaskdeckPaths::new(None) {
            assert!(paths.config_dir().ends_with("taskdeck"));
        }
    }

    #[test]
    fn test_files_live_under_config_dir() {
        let paths = TaskdeckPaths::with_base("/tmp/deck");

        assert_eq!(paths.config_file(), PathBuf::from("/tmp/deck/config.toml"));
        assert_eq!(
            paths.credentials_file(),
            PathBuf::from("/tmp/deck/credentials.json")
        );
    }

    #[test]
    fn test_explicit_base_wins() {
        let paths = TaskdeckPaths::new(Some(Path::new("/srv/deck"))).unwrap();
        assert_eq!(paths.config_dir(), Path::new("/srv/deck"));
    }
}
