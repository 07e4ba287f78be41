//! Salon client: authenticated HTTP access to the salon booking API.
//!
//! The [`http::AuthenticatedHttpClient`] attaches the stored bearer token to
//! every call and transparently recovers from access-token expiry. Concurrent
//! 401s share a single refresh call; requests that failed while it was in
//! flight are replayed with the new token. When the refresh fails, or the
//! server marks the credential as revoked, stored credentials are cleared and
//! a session-termination hook sends the user back to the login surface.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use salon_client::prelude::*;
//!
//! # async fn example() -> salon_client::error::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let store = Arc::new(FileCredentialStore::new_default());
//! let client = AuthenticatedHttpClient::new(config, store)?;
//! let bookings = client.get("/bookings/mine").await?;
//! println!("{}", bookings.body);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod prelude;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
