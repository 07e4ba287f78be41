#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use wiremock::MockServer;

use salon_client::auth::{
    AuthError, CredentialPair, MemoryCredentialStore, RefreshEndpoint, RefreshedToken,
    SessionTermination, SessionTerminator, TerminationCause,
};
use salon_client::config::ClientConfig;
use salon_client::http::AuthenticatedHttpClient;

/// Termination hook that records every call.
#[derive(Default)]
pub struct RecordingTerminator {
    calls: Mutex<Vec<SessionTermination>>,
}

impl RecordingTerminator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().expect("terminator lock poisoned").len()
    }

    pub fn causes(&self) -> Vec<TerminationCause> {
        self.calls
            .lock()
            .expect("terminator lock poisoned")
            .iter()
            .map(|t| t.cause)
            .collect()
    }

    pub fn last(&self) -> Option<SessionTermination> {
        self.calls
            .lock()
            .expect("terminator lock poisoned")
            .last()
            .cloned()
    }
}

impl SessionTerminator for RecordingTerminator {
    fn terminate(&self, termination: &SessionTermination) {
        self.calls
            .lock()
            .expect("terminator lock poisoned")
            .push(termination.clone());
    }
}

/// Refresh endpoint that parks until the test opens the gate.
pub struct GatedRefresh {
    calls: AtomicUsize,
    pub entered: Notify,
    pub gate: Notify,
    access_token: String,
}

impl GatedRefresh {
    pub fn new(access_token: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            gate: Notify::new(),
            access_token: access_token.to_string(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RefreshEndpoint for GatedRefresh {
    async fn refresh(&self, _refresh_token: &str) -> Result<RefreshedToken, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.gate.notified().await;
        Ok(RefreshedToken {
            access_token: self.access_token.clone(),
            refresh_token: None,
        })
    }
}

/// Refresh endpoint that never answers.
#[derive(Default)]
pub struct HangingRefresh;

#[async_trait]
impl RefreshEndpoint for HangingRefresh {
    async fn refresh(&self, _refresh_token: &str) -> Result<RefreshedToken, AuthError> {
        std::future::pending().await
    }
}

pub fn logged_in_store(access: &str, refresh: &str) -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_credentials(CredentialPair::new(
        access, refresh,
    )))
}

pub fn test_config(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .base_url(server.uri())
        .refresh_path("/refresh")
        .request_timeout(Duration::from_secs(5))
        .refresh_timeout(Duration::from_secs(5))
        .build()
}

pub fn client_for(
    config: ClientConfig,
    store: Arc<MemoryCredentialStore>,
    terminator: Arc<RecordingTerminator>,
) -> AuthenticatedHttpClient {
    AuthenticatedHttpClient::new(config, store)
        .expect("build client")
        .with_terminator(terminator)
}

/// Wait until `condition` holds, polling briefly.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}
