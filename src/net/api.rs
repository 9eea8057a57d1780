//! Remote API seam and its `reqwest` implementation.
//!
//! ARCHITECTURE
//! ============
//! The session store only sees [`CanteenApi`], so tests swap in mocks and
//! front-ends can route calls through any transport. [`HttpApi`] is the
//! production client: JSON over HTTP with bearer-token auth.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures and non-2xx statuses become [`ApiError`] values; a 404
//! on the user lookup is "absent" rather than an error.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Map, Value};

use super::envelope;
use super::types::{ApiError, AuthSuccess, Credentials, User};
use crate::config::{ApiTimeouts, ClientConfig};

/// Remote operations the session lifecycle depends on.
#[async_trait::async_trait]
pub trait CanteenApi: Send + Sync {
    /// `POST login`: exchange credentials for a user and bearer token.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-success status, or a
    /// response without a usable user/token.
    async fn login(&self, credentials: &Credentials) -> Result<AuthSuccess, ApiError>;

    /// `POST users`: create an account from the given fields, sent unmodified.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-success status.
    async fn register(&self, fields: &Map<String, Value>) -> Result<(), ApiError>;

    /// `POST logout`: invalidate `token` server-side.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or non-success status.
    async fn logout(&self, token: &str) -> Result<(), ApiError>;

    /// `GET users/{id}`. `Ok(None)` when the backend has no such user.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-success status other
    /// than 404, or a body that is not a user record.
    async fn get_user(&self, token: Option<&str>, id: &str) -> Result<Option<User>, ApiError>;
}

pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Build a client rooted at `base_url` (trailing `/` ignored).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the `reqwest` client fails to build.
    pub fn new(base_url: &str, timeouts: ApiTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    /// Build a client from a parsed [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the `reqwest` client fails to build.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url, config.timeouts)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `users/{id}` with `id` percent-encoded as a single path segment.
    fn user_url(&self, id: &str) -> Result<reqwest::Url, ApiError> {
        if matches!(id, "" | "." | "..") {
            return Err(ApiError::InvalidUrl(format!("unusable user id '{id}'")));
        }
        let mut url = reqwest::Url::parse(&self.url("users")).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(format!("{} cannot take path segments", self.base_url)))?
            .push(id);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(StatusCode, String), ApiError> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok((status, text))
    }
}

fn ensure_success(status: StatusCode, body: String) -> Result<String, ApiError> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(ApiError::Status { status: status.as_u16(), body })
    }
}

#[async_trait::async_trait]
impl CanteenApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSuccess, ApiError> {
        let request = self.http.post(self.url("login")).json(credentials);
        let (status, body) = self.send(request).await?;
        envelope::parse_auth_success(&ensure_success(status, body)?)
    }

    async fn register(&self, fields: &Map<String, Value>) -> Result<(), ApiError> {
        let request = self.http.post(self.url("users")).json(fields);
        let (status, body) = self.send(request).await?;
        ensure_success(status, body).map(|_| ())
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.url("logout"))
            .bearer_auth(token)
            .json(&Value::Object(Map::new()));
        let (status, body) = self.send(request).await?;
        ensure_success(status, body).map(|_| ())
    }

    async fn get_user(&self, token: Option<&str>, id: &str) -> Result<Option<User>, ApiError> {
        let mut request = self.http.get(self.user_url(id)?);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let (status, body) = self.send(request).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        envelope::parse_user(&ensure_success(status, body)?)
    }
}
