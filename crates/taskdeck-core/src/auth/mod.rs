//! Authentication domain module.
//!
//! # Module Structure
//!
//! - `model`: user, credentials and session state
//! - `api`: remote auth endpoints trait
//! - `token`: persisted bearer token trait
//! - `gate`: the view of the session other components consult

pub mod api;
pub mod gate;
mod model;
pub mod token;

// Re-export public API
pub use api::AuthApi;
pub use gate::SessionGate;
pub use model::{
    AuthState, Credentials, ProfileUpdate, Registration, Session, TokenResponse, User, UserId,
};
pub use token::TokenStore;
