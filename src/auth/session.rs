//! Session-termination hook invoked on unrecoverable auth failures.

use strum::{Display, EnumString};

/// Why the client tore the session down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum TerminationCause {
    /// The refresh wave failed (network, timeout, rejected or malformed response).
    RefreshFailed,
    /// The server marked the credential as revoked.
    Revoked,
}

/// Details handed to a [`SessionTerminator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTermination {
    pub cause: TerminationCause,
    /// Login surface the user should be sent to.
    pub login_route: String,
    /// User-facing explanation.
    pub message: String,
}

impl SessionTermination {
    pub fn new(cause: TerminationCause, login_route: impl Into<String>) -> Self {
        let message = match cause {
            TerminationCause::RefreshFailed => "Your session has expired. Please log in again.",
            TerminationCause::Revoked => {
                "Your session was ended by the server. Please log in again."
            }
        };
        Self {
            cause,
            login_route: login_route.into(),
            message: message.to_string(),
        }
    }
}

/// Fire-and-forget callback that sends the user back to the login surface.
pub trait SessionTerminator: Send + Sync {
    fn terminate(&self, termination: &SessionTermination);
}

impl<F> SessionTerminator for F
where
    F: Fn(&SessionTermination) + Send + Sync,
{
    fn terminate(&self, termination: &SessionTermination) {
        self(termination)
    }
}

/// Terminator that only logs; used when the caller installs none.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTerminator;

impl SessionTerminator for LogTerminator {
    fn terminate(&self, termination: &SessionTermination) {
        tracing::warn!(
            cause = %termination.cause,
            login_route = %termination.login_route,
            "session terminated"
        );
    }
}
