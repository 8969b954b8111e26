//! Login API client.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::credentials::Credentials;
use super::outcome::{AuthErrorCode, AuthOutcome, TransportError};
use crate::config::ApiConfig;

/// Standard User-Agent header for Travorama API requests.
pub const USER_AGENT: &str = concat!("travorama/", env!("CARGO_PKG_VERSION"));

const LOGIN_PATH: &str = "/v1/login";

/// The remote authentication call.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Sends one login request.
    ///
    /// # Errors
    /// Returns a [`TransportError`] when no usable answer was received.
    async fn login(
        &self,
        credentials: &Credentials,
        secret: &str,
    ) -> Result<AuthOutcome, TransportError>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    #[serde(flatten)]
    credentials: &'a Credentials,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP implementation of [`AuthClient`].
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    base_url: String,
    timeout: Option<Duration>,
    http: reqwest::Client,
}

impl HttpAuthClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            http: reqwest::Client::new(),
        }
    }

    /// Builds a client from the `[api]` config section.
    ///
    /// Base URL resolution order:
    /// 1. `TRAVORAMA_API_BASE_URL` env var (if set and non-empty)
    /// 2. `api.base_url` from config
    /// 3. Default: `https://api.travorama.com`
    ///
    /// # Errors
    /// Returns an error if the base URL is malformed.
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        let base_url = api
            .resolve_base_url()
            .context("Failed to resolve login API base URL")?;
        Ok(Self::new(base_url, api.timeout()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn interpret(status: reqwest::StatusCode, body: &str) -> Result<AuthOutcome, TransportError> {
        let parsed = match serde_json::from_str::<LoginResponse>(body) {
            Ok(parsed) => parsed,
            Err(err) if status.is_success() => {
                return Err(TransportError::decode(
                    format!("Invalid login response: {err}"),
                    body,
                ));
            }
            Err(_) => return Err(TransportError::http_status(status.as_u16(), body)),
        };

        if let Some(code) = parsed.error.as_deref().map(str::trim)
            && !code.is_empty()
        {
            return Ok(AuthOutcome::Failure(AuthErrorCode::parse(code)));
        }

        if !status.is_success() {
            return Err(TransportError::http_status(status.as_u16(), body));
        }

        match parsed.status {
            None | Some(200) => Ok(AuthOutcome::Success),
            Some(other) => Ok(AuthOutcome::Failure(AuthErrorCode::Unrecognized(format!(
                "status {other}"
            )))),
        }
    }
}

#[async_trait]
impl AuthClient for HttpAuthClient {
    async fn login(
        &self,
        credentials: &Credentials,
        secret: &str,
    ) -> Result<AuthOutcome, TransportError> {
        let url = format!("{}{LOGIN_PATH}", self.base_url);
        let body = LoginRequest {
            credentials,
            password: secret,
        };

        tracing::debug!(url = %url, credentials = %credentials.redacted(), "sending login request");

        let mut request = self
            .http
            .post(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let outcome = Self::interpret(status, &text);
        tracing::debug!(http_status = status.as_u16(), ?outcome, "login response");
        outcome
    }
}
