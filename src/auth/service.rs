//! Login and logout flows.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::AuthError;
use super::store::CredentialStore;
use super::token::CredentialPair;

/// Login and logout flows: the only writers of the credential store besides
/// the client's refresh handling.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use salon_client::auth::{AuthService, MemoryCredentialStore};
///
/// # async fn example() -> Result<(), salon_client::auth::AuthError> {
/// let svc = AuthService::new(
///     Arc::new(MemoryCredentialStore::new()),
///     "https://api.example.com/auth/login",
/// );
/// svc.login("owner@example.com", "hunter2").await?;
/// # Ok(())
/// # }
/// ```
pub struct AuthService {
    client: reqwest::Client,
    login_url: String,
    store: Arc<dyn CredentialStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, login_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            login_url: login_url.into(),
            store,
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Exchange email/password for a credential pair and store it.
    pub async fn login(&self, email: &str, password: &str) -> Result<CredentialPair, AuthError> {
        let resp = self
            .client
            .post(&self.login_url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let status = resp.status();
        if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(AuthError::AccessDenied);
        }
        if !status.is_success() {
            return Err(AuthError::InvalidResponse(format!(
                "Login request failed with status {status}"
            )));
        }
        let payload: LoginResponse = resp.json().await?;
        let pair = CredentialPair::new(payload.access_token, payload.refresh_token);
        self.store.set_credentials(&pair)?;
        info!("login succeeded");
        Ok(pair)
    }

    /// Remove stored credentials. Succeeds when already logged out.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.clear_credentials()
    }

    /// Currently stored credential pair, if any.
    pub fn status(&self) -> Result<Option<CredentialPair>, AuthError> {
        self.store.load()
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(alias = "accessToken")]
    access_token: String,
    #[serde(alias = "refreshToken")]
    refresh_token: String,
}
