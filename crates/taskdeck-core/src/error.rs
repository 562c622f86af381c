//! Error types for Taskdeck.
//!
//! Three families live here:
//! - [`ApiError`]: every failure of the remote REST API, normalized into a
//!   single shape with a display-ready message and a status classification.
//! - [`AuthError`]: failures surfaced by the session manager.
//! - [`DeckError`]: local faults (filesystem, config, serialization).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Message used when neither the response body nor the transport has anything to say.
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Classification of a remote API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// The request did not complete within the configured timeout.
    Timeout,
    /// Connection refused, DNS failure, reset, ...
    Network,
    /// HTTP 401. The persisted token has already been cleared.
    Unauthorized,
    /// HTTP 404.
    NotFound,
    /// Any other 4xx, usually carrying field-level detail.
    Validation,
    /// HTTP 5xx.
    Server,
    /// A 2xx response whose body could not be decoded.
    Decode,
    /// Anything else.
    Unknown,
}

impl ApiErrorKind {
    /// Maps an HTTP status code to an error kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            400..=499 => Self::Validation,
            500..=599 => Self::Server,
            _ => Self::Unknown,
        }
    }
}

/// A normalized remote API failure.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// Human-readable message, safe to show to the user.
    pub message: String,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Field name → message, extracted from list-style `detail` bodies.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_errors: BTreeMap<String, String>,
}

impl ApiError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            field_errors: BTreeMap::new(),
        }
    }

    /// Creates a Timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Timeout, message)
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    /// Creates a Decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    /// Builds an error from a non-2xx response.
    ///
    /// The message is taken from the body, checking `detail` then `message`,
    /// and falls back to `transport_message`.
    pub fn from_response(status: u16, body: Option<&Value>, transport_message: &str) -> Self {
        let message = body
            .and_then(extract_message)
            .or_else(|| {
                let trimmed = transport_message.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

        Self {
            kind: ApiErrorKind::from_status(status),
            message,
            status: Some(status),
            field_errors: body.map(extract_field_errors).unwrap_or_default(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ApiErrorKind::Timeout
    }
}

/// Pulls a display message out of an error body.
///
/// FastAPI-style backends send either `{"detail": "..."}` or
/// `{"detail": [{"loc": [...], "msg": "..."}]}`; others send `{"message": "..."}`.
fn extract_message(body: &Value) -> Option<String> {
    match body.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => {
            return Some(detail.clone());
        }
        Some(Value::Array(entries)) => {
            let joined = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                return Some(joined);
            }
        }
        _ => {}
    }

    body.get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}

fn extract_field_errors(body: &Value) -> BTreeMap<String, String> {
    let Some(entries) = body.get("detail").and_then(Value::as_array) else {
        return BTreeMap::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let field = match entry.get("loc")?.as_array()?.last()? {
                Value::String(name) => name.clone(),
                other => other.to_string(),
            };
            let message = entry.get("msg")?.as_str()?.to_string();
            Some((field, message))
        })
        .collect()
}

/// Failures surfaced by the session manager.
#[derive(Error, Debug, Clone)]
pub enum AuthError {
    /// The remote call failed.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// The login endpoint answered 2xx without an access token.
    #[error("Login response did not include an access token")]
    MissingToken,

    /// The token could not be persisted.
    #[error("Failed to store credentials: {0}")]
    Storage(DeckError),
}

/// A shared error type for local faults.
#[derive(Error, Debug, Clone)]
pub enum DeckError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote API error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Form validation error
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeckError {
    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for DeckError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for DeckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DeckError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for DeckError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DeckError> for AuthError {
    fn from(err: DeckError) -> Self {
        match err {
            DeckError::Api(api) => Self::Api(api),
            other => Self::Storage(other),
        }
    }
}

/// A type alias for `Result<T, DeckError>`.
pub type Result<T> = std::result::Result<T, DeckError>;
