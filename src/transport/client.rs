//! REST API client
//!
//! Thin wrapper around `reqwest::Client` shared by every resource client.
//! It prefixes paths with the configured base URL, attaches the bearer token
//! from the injected `SessionHandle`, tags requests with an id and maps
//! non-success responses onto `TransportError`.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{SessionHandle, TransportError, TransportResult};
use crate::config::ApiConfig;

/// HTTP client bound to one API server and one session
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionHandle,
}

impl ApiClient {
    /// Create a new API client with the given configuration
    pub fn new(config: &ApiConfig, session: SessionHandle) -> TransportResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Start a request to `path` (relative to the base URL)
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(request_id = %request_id, %method, %url, "sending API request");

        let mut builder = self
            .http
            .request(method, url)
            .header("X-Request-Id", request_id);
        if let Some(token) = self.session.access_token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a request and turn error statuses into `TransportError`
    pub(crate) async fn send(&self, builder: RequestBuilder) -> TransportResult<Response> {
        let response = builder.send().await.map_err(TransportError::from_send)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = error_message(&text);
        tracing::warn!(status = status.as_u16(), error_message = %message, "API request failed");

        Err(match status {
            StatusCode::NOT_FOUND => TransportError::NotFound(message),
            StatusCode::UNAUTHORIZED => TransportError::Unauthorized,
            _ => TransportError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Send a request and decode its JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> TransportResult<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await.map_err(TransportError::from_send)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Extract a human-readable message from an error body
fn error_message(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "no details".to_string();
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(value) => ["error", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}
