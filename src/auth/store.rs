//! Credential storage backends.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::token::CredentialPair;

/// Storage abstraction for the current session's credential pair.
///
/// Only the login/logout flows and the client's refresh paths write to it.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<CredentialPair>, AuthError>;
    fn set_credentials(&self, pair: &CredentialPair) -> Result<(), AuthError>;
    fn clear_credentials(&self) -> Result<(), AuthError>;

    fn access_token(&self) -> Result<Option<String>, AuthError> {
        Ok(self.load()?.map(|pair| pair.access_token))
    }

    fn refresh_token(&self) -> Result<Option<String>, AuthError> {
        Ok(self.load()?.map(|pair| pair.refresh_token))
    }

    /// Replace the access token, keeping the stored refresh token.
    ///
    /// Fails with [`AuthError::NotLoggedIn`] when the session was cleared.
    fn set_access_token(&self, access_token: &str) -> Result<(), AuthError> {
        let mut pair = self.load()?.ok_or(AuthError::NotLoggedIn)?;
        pair.access_token = access_token.to_string();
        pair.last_refresh = Some(Utc::now());
        self.set_credentials(&pair)
    }
}

/// Process-local credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    pair: RwLock<Option<CredentialPair>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(pair: CredentialPair) -> Self {
        Self {
            pair: RwLock::new(Some(pair)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<CredentialPair>, AuthError> {
        Ok(self
            .pair
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn set_credentials(&self, pair: &CredentialPair) -> Result<(), AuthError> {
        *self.pair.write().unwrap_or_else(PoisonError::into_inner) = Some(pair.clone());
        Ok(())
    }

    fn clear_credentials(&self) -> Result<(), AuthError> {
        *self.pair.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Configuration for file-backed credential storage.
#[derive(Debug, Clone)]
pub struct CredentialStoreConfig {
    pub base_dir: PathBuf,
    pub profile: String,
}

impl CredentialStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            profile: "default".to_string(),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn default_dir() -> PathBuf {
        default_salon_dir()
    }
}

/// File-backed credential store using a TOML file per profile.
///
/// # Example
/// ```no_run
/// use salon_client::auth::{CredentialPair, CredentialStore, FileCredentialStore};
///
/// let store = FileCredentialStore::new_default();
/// store.set_credentials(&CredentialPair::new("access", "refresh"))?;
/// # Ok::<(), salon_client::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(config: CredentialStoreConfig) -> Self {
        let profile = normalize_label(&config.profile);
        let name = if profile == "default" {
            "credentials.toml".to_string()
        } else {
            format!("credentials.{profile}.toml")
        };
        Self {
            path: config.base_dir.join(name),
        }
    }

    pub fn new_default() -> Self {
        Self::new(CredentialStoreConfig::new(default_salon_dir()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<CredentialPair>, AuthError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: CredentialFile = toml::from_str(&raw)?;
        if file.version != CREDENTIAL_FILE_VERSION {
            return Err(AuthError::Serialization(format!(
                "unsupported credentials file version {} at {}",
                file.version,
                self.path.display()
            )));
        }
        Ok(Some(file.credentials))
    }

    fn set_credentials(&self, pair: &CredentialPair) -> Result<(), AuthError> {
        Self::ensure_parent(&self.path)?;
        let file = CredentialFile {
            version: CREDENTIAL_FILE_VERSION,
            saved_at: Utc::now(),
            credentials: pair.clone(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&self.path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear_credentials(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

const CREDENTIAL_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialFile {
    version: u32,
    saved_at: DateTime<Utc>,
    credentials: CredentialPair,
}

fn default_salon_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".salon"))
        .unwrap_or_else(|| PathBuf::from(".salon"))
}

fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() || lower == '-' {
            out.push(lower);
        } else {
            out.push('-');
        }
    }
    if out.trim_matches('-').is_empty() {
        "default".to_string()
    } else {
        out
    }
}
