//! Client configuration (layered: code > env > config file).

use std::path::Path;
use std::time::Duration;

use bon::Builder;
use serde::Deserialize;

use crate::error::ClientError;
use crate::http::RevocationMarker;

pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(15);

/// Settings for [`crate::http::AuthenticatedHttpClient`].
///
/// # Example
/// ```
/// use salon_client::config::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("https://api.example.com/")
///     .build();
/// assert_eq!(config.refresh_url(), "https://api.example.com/auth/refresh");
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ClientConfig {
    #[builder(into)]
    pub base_url: String,
    #[builder(into, default = DEFAULT_REFRESH_PATH.to_string())]
    pub refresh_path: String,
    #[builder(into, default = DEFAULT_LOGIN_PATH.to_string())]
    pub login_path: String,
    /// Login surface handed to the session-termination hook.
    #[builder(into, default = DEFAULT_LOGIN_ROUTE.to_string())]
    pub login_route: String,
    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,
    #[builder(default = DEFAULT_REFRESH_TIMEOUT)]
    pub refresh_timeout: Duration,
    #[builder(default)]
    pub revocation_marker: RevocationMarker,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::builder().base_url(base_url).build()
    }

    /// Load from environment variables, reading `.env` if present.
    ///
    /// `SALON_API_BASE_URL` is required.
    pub fn from_env() -> Result<Self, ClientError> {
        let _ = dotenvy::dotenv();
        let base_url = std::env::var("SALON_API_BASE_URL").map_err(|_| {
            ClientError::Configuration("SALON_API_BASE_URL is not set".to_string())
        })?;
        Self::new(base_url).with_env_overrides()
    }

    /// Load from a TOML file. Missing keys fall back to defaults.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&raw).map_err(|err| {
            ClientError::Configuration(format!("invalid config at {}: {err}", path.display()))
        })?;
        Ok(file.into_config())
    }

    /// Apply `SALON_*` environment overrides on top of this config.
    pub fn with_env_overrides(mut self) -> Result<Self, ClientError> {
        if let Ok(url) = std::env::var("SALON_API_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(value) = std::env::var("SALON_REFRESH_PATH") {
            self.refresh_path = value;
        }
        if let Ok(value) = std::env::var("SALON_LOGIN_PATH") {
            self.login_path = value;
        }
        if let Ok(value) = std::env::var("SALON_LOGIN_ROUTE") {
            self.login_route = value;
        }
        if let Some(secs) = env_secs("SALON_REQUEST_TIMEOUT_SECS")? {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_secs("SALON_REFRESH_TIMEOUT_SECS")? {
            self.refresh_timeout = Duration::from_secs(secs);
        }
        if let Ok(value) = std::env::var("SALON_REVOCATION_FIELD") {
            self.revocation_marker.field = value;
        }
        if let Ok(value) = std::env::var("SALON_REVOCATION_VALUE") {
            self.revocation_marker.value = value;
        }
        Ok(self)
    }

    /// Join a path onto the base URL with exactly one slash between them.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn refresh_url(&self) -> String {
        self.url_for(&self.refresh_path)
    }

    pub fn login_url(&self) -> String {
        self.url_for(&self.login_path)
    }
}

fn env_secs(var: &str) -> Result<Option<u64>, ClientError> {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse::<u64>().map(Some).map_err(|_| {
            ClientError::Configuration(format!("{var} must be a whole number of seconds"))
        }),
        Err(_) => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: String,
    refresh_path: Option<String>,
    login_path: Option<String>,
    login_route: Option<String>,
    request_timeout_secs: Option<u64>,
    refresh_timeout_secs: Option<u64>,
    revocation_field: Option<String>,
    revocation_value: Option<String>,
}

impl ConfigFile {
    fn into_config(self) -> ClientConfig {
        let mut marker = RevocationMarker::default();
        if let Some(field) = self.revocation_field {
            marker.field = field;
        }
        if let Some(value) = self.revocation_value {
            marker.value = value;
        }
        ClientConfig::builder()
            .base_url(self.base_url)
            .refresh_path(self.refresh_path.unwrap_or_else(|| DEFAULT_REFRESH_PATH.to_string()))
            .login_path(self.login_path.unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string()))
            .login_route(self.login_route.unwrap_or_else(|| DEFAULT_LOGIN_ROUTE.to_string()))
            .request_timeout(
                self.request_timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            )
            .refresh_timeout(
                self.refresh_timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_REFRESH_TIMEOUT),
            )
            .revocation_marker(marker)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builder_applies_defaults() {
        let config = ClientConfig::new("https://api.example.com");
        assert_eq!(config.refresh_path, DEFAULT_REFRESH_PATH);
        assert_eq!(config.login_route, "/login");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.refresh_timeout, Duration::from_secs(15));
        assert_eq!(config.revocation_marker, RevocationMarker::default());
    }

    #[test]
    fn url_for_joins_with_single_slash() {
        let config = ClientConfig::new("https://api.example.com/v1/");
        assert_eq!(
            config.url_for("/salons/42"),
            "https://api.example.com/v1/salons/42"
        );
        assert_eq!(config.url_for("bookings"), "https://api.example.com/v1/bookings");
    }

    #[test]
    fn url_for_passes_absolute_urls_through() {
        let config = ClientConfig::new("https://api.example.com");
        assert_eq!(
            config.url_for("https://cdn.example.com/x"),
            "https://cdn.example.com/x"
        );
    }

    #[test]
    fn load_from_path_reads_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(
            &path,
            r#"
base_url = "http://localhost:8080"
refresh_path = "/token/refresh"
refresh_timeout_secs = 5
revocation_value = "SESSION_REVOKED"
"#,
        )
        .unwrap();

        let config = ClientConfig::load_from_path(&path).unwrap();
        assert_eq!(config.refresh_url(), "http://localhost:8080/token/refresh");
        assert_eq!(config.refresh_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.revocation_marker.field, "code");
        assert_eq!(config.revocation_marker.value, "SESSION_REVOKED");
    }

    #[test]
    fn load_from_path_rejects_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, "base_url = \"http://x\"\nretries = 3\n").unwrap();

        let result = ClientConfig::load_from_path(&path);
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }
}
