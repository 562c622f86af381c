//! Domain layer for Taskdeck.
//!
//! Holds the entity models shared by every other crate, the error taxonomy,
//! the traits that abstract the remote REST API and the persisted token, and
//! the pure query functions used to slice the task collection.

pub mod auth;
pub mod chat;
pub mod config;
pub mod dates;
pub mod error;
pub mod project;
pub mod stats;
pub mod task;
pub mod validation;

// Re-export common error types
pub use error::{ApiError, ApiErrorKind, AuthError, DeckError, Result};
