//! HttpApiClient - REST transport for the Taskdeck backend.
//!
//! Every call goes through [`HttpApiClient::request`] (or its typed
//! wrappers), which:
//! - prefixes the configured base URL
//! - attaches `Authorization: Bearer <token>` when a token is stored
//! - applies the configured timeout
//! - normalizes every failure into an [`ApiError`]
//!
//! A 401 from any endpoint clears the persisted token. The client holds no
//! other session state, and never retries.

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use taskdeck_core::ApiError;
use taskdeck_core::auth::TokenStore;
use taskdeck_core::config::ApiSettings;

/// Client for the Taskdeck REST API.
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    tokens: Arc<dyn TokenStore>,
}

impl HttpApiClient {
    /// Creates a client rooted at `base_url` (e.g. `http://localhost:8001/api`).
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            tokens,
        })
    }

    /// Creates a client from the `[api]` config section.
    pub fn from_settings(
        settings: &ApiSettings,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ApiError> {
        Self::new(settings.base_url.clone(), settings.timeout(), tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends `body` (if any) to `path` and returns the decoded JSON body.
    ///
    /// An empty 2xx body decodes to `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        self.send::<(), Value>(method, path, None, body).await
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.send::<(), ()>(Method::GET, path, None, None).await?;
        decode(value)
    }

    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let value = self.send::<Q, ()>(Method::GET, path, Some(query), None).await?;
        decode(value)
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let value = self.send::<(), B>(Method::POST, path, None, Some(body)).await?;
        decode(value)
    }

    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let value = self.send::<(), B>(Method::PUT, path, None, Some(body)).await?;
        decode(value)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send::<(), ()>(Method::DELETE, path, None, None)
            .await
            .map(|_| ())
    }

    async fn send<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<Value, ApiError>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method.clone(), &url);

        if let Some(token) = self.stored_token() {
            request = request.bearer_auth(token);
        }
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, path, "Sending API request");

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        tracing::debug!(%method, path, status = status.as_u16(), "Received API response");

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| {
                ApiError::decode(format!("Failed to parse response from {}: {}", path, e))
            });
        }

        if status == StatusCode::UNAUTHORIZED {
            self.discard_token(path);
        }

        let body: Option<Value> = serde_json::from_str(&text).ok();
        Err(ApiError::from_response(
            status.as_u16(),
            body.as_ref(),
            &format!("Request failed with status code {}", status.as_u16()),
        ))
    }

    fn stored_token(&self) -> Option<String> {
        match self.tokens.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Could not read stored token, sending request without it: {}", e);
                None
            }
        }
    }

    fn discard_token(&self, path: &str) {
        tracing::warn!(path, "Server rejected credentials, clearing stored token");
        if let Err(e) = self.tokens.clear() {
            tracing::warn!("Failed to clear stored token: {}", e);
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::timeout(format!(
                "timeout of {}ms exceeded",
                self.timeout.as_millis()
            ))
        } else {
            ApiError::network(format!("Network Error: {}", err))
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::decode(format!("Unexpected response shape: {}", e)))
}
