//! Authenticated HTTP transport with single-flight token refresh.

pub mod client;
pub(crate) mod coordinator;
pub mod request;
pub mod revocation;

pub use client::AuthenticatedHttpClient;
pub use request::{ApiRequest, ApiResponse};
pub use revocation::RevocationMarker;
