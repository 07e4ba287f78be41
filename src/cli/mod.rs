//! CLI entry point for the salon client.

pub mod auth;
pub mod request;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::auth::{CredentialStoreConfig, FileCredentialStore};
use crate::config::ClientConfig;
use crate::error::Result;

/// Salon booking API client
#[derive(Parser, Debug)]
#[command(name = "salon-client", version, about = "Authenticated client for the salon booking API")]
pub struct Cli {
    /// TOML config file; SALON_* environment variables override it
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Credential profile (e.g. customer, owner)
    #[arg(long, global = true, default_value = "default")]
    pub profile: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Session management
    Auth(AuthArgs),
    /// Send an authenticated request
    Request(RequestArgs),
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth subcommands for login, status, and logout.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Log in with email and password
    Login(LoginArgs),
    /// Show whether credentials are stored
    Status,
    /// Remove stored credentials
    Logout,
}

/// Arguments for `salon-client auth login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

/// Arguments for `salon-client request`.
#[derive(Parser, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: String,
    /// Path relative to the API base URL
    pub path: String,
    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,
}

impl Cli {
    pub fn client_config(&self) -> Result<ClientConfig> {
        match &self.config {
            Some(path) => ClientConfig::load_from_path(path)?.with_env_overrides(),
            None => ClientConfig::from_env(),
        }
    }

    pub fn credential_store(&self) -> Arc<FileCredentialStore> {
        Arc::new(FileCredentialStore::new(
            CredentialStoreConfig::new(CredentialStoreConfig::default_dir())
                .with_profile(&self.profile),
        ))
    }
}
