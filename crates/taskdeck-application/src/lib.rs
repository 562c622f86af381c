//! Stateful services for Taskdeck.
//!
//! - [`SessionManager`]: bearer token lifecycle and the current user
//! - [`DataStore`]: the in-memory project/task collections and every
//!   mutation of them
//! - [`ChatService`]: the assistant transcript
//!
//! Each service is an explicit value wired together by the caller; nothing
//! here is global.

pub mod chat_service;
pub mod data_store;
pub mod optimistic;
pub mod session_manager;

#[cfg(test)]
mod test_support;

pub use chat_service::{ChatService, chat_context};
pub use data_store::{DataStore, StoreSnapshot};
pub use session_manager::SessionManager;
