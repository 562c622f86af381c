//! Session gate trait.

use async_trait::async_trait;

/// What the data layer needs to know about the session.
///
/// Fetches are skipped while not authenticated, and any `Unauthorized`
/// response observed by the data layer invalidates the session.
#[async_trait]
pub trait SessionGate: Send + Sync {
    /// True only when both a token and a current user are present.
    async fn is_authenticated(&self) -> bool;

    /// Drops the session after the server rejected the token.
    async fn invalidate(&self);
}
