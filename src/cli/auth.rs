//! CLI auth command handlers for login, status, and logout.

use std::sync::Arc;

use crate::auth::{AuthService, CredentialStore};
use crate::config::ClientConfig;

/// Handle `salon-client auth login`.
pub async fn handle_login(
    config: &ClientConfig,
    store: Arc<dyn CredentialStore>,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let svc = AuthService::new(store, config.login_url());
    svc.login(email, password).await?;
    println!("Logged in as {email}");
    Ok(())
}

/// Handle `salon-client auth status`.
pub fn handle_status(store: Arc<dyn CredentialStore>) -> Result<(), Box<dyn std::error::Error>> {
    match store.load()? {
        Some(pair) => {
            let refreshed = pair
                .last_refresh
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| "never".to_string());
            println!("Logged in (last refresh: {refreshed})");
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

/// Handle `salon-client auth logout`.
pub fn handle_logout(store: Arc<dyn CredentialStore>) -> Result<(), Box<dyn std::error::Error>> {
    store.clear_credentials()?;
    println!("Logged out");
    Ok(())
}
