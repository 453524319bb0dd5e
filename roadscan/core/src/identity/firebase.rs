//! Firebase Identity Provider
//!
//! Email/password authentication through the Identity Toolkit REST API.
//!
//! # Identity Toolkit API
//!
//! - `accounts:signInWithPassword` - verify credentials
//! - `accounts:signUp` - create an account
//!
//! Both take `{email, password, returnSecureToken}` and authenticate the
//! project with the `key` query parameter. Failures come back as
//! `{"error": {"code": 400, "message": "EMAIL_EXISTS"}}`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::traits::{Credentials, IdentityProvider, ProviderConfig};
use crate::session::{Session, UserHandle};

/// Public Identity Toolkit endpoint
pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    id_token: String,
    /// Seconds, encoded as a string
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Firebase Identity Toolkit client
#[derive(Clone)]
pub struct FirebaseProvider {
    /// Project Web API key
    api_key: String,
    /// REST base URL
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl FirebaseProvider {
    /// Create a provider for the public endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a provider against a custom base URL (emulator, proxy)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Create from `ProviderConfig`
    #[must_use]
    pub fn from_config(config: &ProviderConfig) -> Option<Self> {
        match config {
            ProviderConfig::Firebase { api_key, base_url } => Some(match base_url {
                Some(url) => Self::with_base_url(api_key.clone(), url.clone()),
                None => Self::new(api_key.clone()),
            }),
            ProviderConfig::InMemory => None,
        }
    }

    fn endpoint_url(&self, method: &str) -> String {
        format!("{}/accounts:{}?key={}", self.base_url, method, self.api_key)
    }

    async fn password_call(
        &self,
        method: &str,
        credentials: &Credentials,
    ) -> Result<Session, AuthError> {
        let body = PasswordRequest {
            email: credentials.email(),
            password: credentials.password(),
            return_secure_token: true,
        };

        let response = self
            .http_client
            .post(self.endpoint_url(method))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::debug!(%status, method, "Identity Toolkit rejected request");
            return Err(error_from_body(&text));
        }

        let data: AuthResponse = response.json().await?;
        Ok(session_from_response(data, credentials.email()))
    }
}

fn error_from_body(body: &str) -> AuthError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => AuthError::from_provider_code(&envelope.error.message),
        Err(_) => AuthError::Unknown(body.to_string()),
    }
}

fn session_from_response(data: AuthResponse, fallback_email: &str) -> Session {
    let expires_in = data
        .expires_in
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok());

    let session = Session::new(UserHandle {
        uid: data.local_id,
        email: data.email.unwrap_or_else(|| fallback_email.to_string()),
        id_token: data.id_token,
    });

    // Lifetimes that do not fit a timestamp are treated as no expiry
    let expires_at = expires_in
        .and_then(chrono::TimeDelta::try_seconds)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));

    match expires_at {
        Some(at) => session.with_expiry(at),
        None => session,
    }
}

#[async_trait]
impl IdentityProvider for FirebaseProvider {
    fn name(&self) -> &str {
        "Firebase"
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        self.password_call("signInWithPassword", credentials).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        self.password_call("signUp", credentials).await
    }
}
