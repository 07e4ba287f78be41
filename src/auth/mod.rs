//! Credential storage, token refresh, login flows and session termination.

pub mod error;
pub mod refresh;
pub mod service;
pub mod session;
pub mod store;
pub mod token;

pub use error::AuthError;
pub use refresh::{HttpRefreshEndpoint, RefreshEndpoint};
pub use service::AuthService;
pub use session::{LogTerminator, SessionTermination, SessionTerminator, TerminationCause};
pub use store::{CredentialStore, CredentialStoreConfig, FileCredentialStore, MemoryCredentialStore};
pub use token::{CredentialPair, RefreshedToken};
