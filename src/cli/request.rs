//! CLI handler that sends one request through the authenticated client.

use std::str::FromStr;
use std::sync::Arc;

use reqwest::Method;

use crate::auth::{CredentialStore, SessionTermination};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{ApiRequest, AuthenticatedHttpClient};

/// Handle `salon-client request <METHOD> <PATH>`.
pub async fn handle_request(
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let method = Method::from_str(&method.to_ascii_uppercase())
        .map_err(|_| ClientError::InvalidArgument(format!("unknown HTTP method: {method}")))?;
    let mut request = ApiRequest::new(method, path);
    if let Some(raw) = body {
        let json: serde_json::Value = serde_json::from_str(raw)?;
        request = request.json(&json)?;
    }

    let client = AuthenticatedHttpClient::new(config, store)?.with_terminator(Arc::new(
        |t: &SessionTermination| {
            eprintln!("{} Log in again at {}.", t.message, t.login_route);
        },
    ));
    let response = client.request(request).await?;
    println!("{}", response.body);
    Ok(())
}
