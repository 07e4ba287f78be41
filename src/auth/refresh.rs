//! Exchange of a refresh token for a new access token.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::AuthError;
use super::token::RefreshedToken;

/// Remote endpoint that exchanges a refresh token for a new access token.
///
/// Calling it repeatedly is allowed (each call may mint a new access token);
/// the client only calls it once per refresh wave.
#[async_trait]
pub trait RefreshEndpoint: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken, AuthError>;
}

/// Refresh endpoint that POSTs `{ "refresh_token": ... }` as JSON.
///
/// # Example
/// ```
/// use salon_client::auth::HttpRefreshEndpoint;
///
/// let endpoint = HttpRefreshEndpoint::new("https://api.example.com/auth/refresh");
/// assert_eq!(endpoint.url(), "https://api.example.com/auth/refresh");
/// ```
#[derive(Debug, Clone)]
pub struct HttpRefreshEndpoint {
    client: reqwest::Client,
    url: String,
}

impl HttpRefreshEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RefreshEndpoint for HttpRefreshEndpoint {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken, AuthError> {
        debug!(url = %self.url, "calling refresh endpoint");
        let resp = self
            .client
            .post(&self.url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AuthError::RefreshRejected {
                status: status.as_u16(),
            });
        }
        let body = resp.text().await?;
        parse_refresh_response(&body)
    }
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(default, alias = "accessToken")]
    access_token: Option<String>,
    #[serde(default, alias = "refreshToken")]
    refresh_token: Option<String>,
}

fn parse_refresh_response(body: &str) -> Result<RefreshedToken, AuthError> {
    let payload: RefreshResponse = serde_json::from_str(body)
        .map_err(|err| AuthError::InvalidResponse(format!("malformed refresh body: {err}")))?;
    let access_token = payload
        .access_token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| {
            AuthError::InvalidResponse("refresh response missing access_token".to_string())
        })?;
    Ok(RefreshedToken {
        access_token,
        refresh_token: payload.refresh_token.filter(|token| !token.trim().is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snake_case_body() {
        let token = parse_refresh_response(r#"{"access_token":"a2"}"#).unwrap();
        assert_eq!(token.access_token, "a2");
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn parses_camel_case_body_with_rotation() {
        let token =
            parse_refresh_response(r#"{"accessToken":"a2","refreshToken":"r2"}"#).unwrap();
        assert_eq!(token.access_token, "a2");
        assert_eq!(token.refresh_token.as_deref(), Some("r2"));
    }

    #[test]
    fn missing_access_token_is_invalid() {
        let result = parse_refresh_response(r#"{"message":"ok"}"#);
        assert!(matches!(result, Err(AuthError::InvalidResponse(_))));
    }

    #[test]
    fn empty_access_token_is_invalid() {
        let result = parse_refresh_response(r#"{"access_token":"  "}"#);
        assert!(matches!(result, Err(AuthError::InvalidResponse(_))));
    }

    #[test]
    fn non_json_body_is_invalid() {
        let result = parse_refresh_response("<html>gateway</html>");
        assert!(matches!(result, Err(AuthError::InvalidResponse(_))));
    }
}
