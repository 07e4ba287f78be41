//! Convenience re-exports for common use.

pub use crate::auth::{
    AuthService, CredentialPair, CredentialStore, FileCredentialStore, MemoryCredentialStore,
    SessionTermination, SessionTerminator, TerminationCause,
};
pub use crate::config::ClientConfig;
pub use crate::error::{ClientError, Result};
pub use crate::http::{ApiRequest, ApiResponse, AuthenticatedHttpClient, RevocationMarker};
