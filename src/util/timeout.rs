//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Wrap a future with an overall timeout.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, ClientError>>,
) -> Result<T, ClientError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout(duration.as_millis() as u64)),
    }
}
