//! Persisted token trait.

use crate::error::Result;

/// Durable storage for the single bearer token.
///
/// Implementations must never log the token value.
pub trait TokenStore: Send + Sync {
    /// Returns the stored token, if any.
    fn load(&self) -> Result<Option<String>>;

    /// Replaces the stored token.
    fn save(&self, token: &str) -> Result<()>;

    /// Removes the stored token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}
