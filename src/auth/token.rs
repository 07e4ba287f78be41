//! Credential types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The access/refresh token pair that identifies the current session.
///
/// # Example
/// ```
/// use salon_client::auth::CredentialPair;
///
/// let pair = CredentialPair::new("access", "refresh");
/// assert_eq!(pair.access_token, "access");
/// assert!(pair.last_refresh.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
    /// When the access token was last replaced by a refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            last_refresh: None,
        }
    }
}

/// Result of a successful call to the refresh endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedToken {
    pub access_token: String,
    /// Present when the backend rotates refresh tokens.
    pub refresh_token: Option<String>,
}
