//! Local persistence for Taskdeck: config directory layout, the persisted
//! bearer token, and `config.toml` loading.

pub mod config_service;
pub mod paths;
pub mod storage;

pub use crate::config_service::{ConfigOverrides, ConfigService};
pub use crate::paths::TaskdeckPaths;
pub use crate::storage::{FileTokenStore, MemoryTokenStore};
