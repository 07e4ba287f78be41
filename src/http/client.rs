//! HTTP client that attaches bearer credentials and recovers from expiry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::header::{HeaderMap, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::coordinator::{Admission, RefreshCoordinator, Shortcut, WaveHandle, WaveOutcome};
use super::request::{ApiRequest, ApiResponse};
use crate::auth::{
    AuthError, CredentialPair, CredentialStore, HttpRefreshEndpoint, LogTerminator,
    RefreshEndpoint, RefreshedToken, SessionTermination, SessionTerminator, TerminationCause,
};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::util::timeout::with_timeout;

/// Authenticated client for the salon booking API.
///
/// Every call carries the stored access token. A 401 triggers at most one
/// refresh call per wave of failures: the first failing request refreshes,
/// the rest queue behind it and replay with the new token once it lands. If
/// the refresh fails, or the server marks the credential as revoked, stored
/// credentials are cleared and the session-termination hook fires once.
///
/// Cloning is cheap; clones share credentials and refresh state.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use salon_client::auth::{CredentialPair, MemoryCredentialStore};
/// use salon_client::config::ClientConfig;
/// use salon_client::http::AuthenticatedHttpClient;
///
/// # async fn example() -> salon_client::error::Result<()> {
/// let store = Arc::new(MemoryCredentialStore::with_credentials(
///     CredentialPair::new("access", "refresh"),
/// ));
/// let client = AuthenticatedHttpClient::new(ClientConfig::new("https://api.example.com"), store)?
///     .with_terminator(Arc::new(|t: &salon_client::auth::SessionTermination| {
///         eprintln!("{} -> {}", t.message, t.login_route);
///     }));
/// let salons = client.get("/salons").await?;
/// println!("{}", salons.body);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthenticatedHttpClient {
    http: reqwest::Client,
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn RefreshEndpoint>,
    terminator: Arc<dyn SessionTerminator>,
    coordinator: RefreshCoordinator,
    /// Session epoch. Held while checking it and writing credentials, and
    /// while bumping it and clearing them, so the two never interleave.
    session: Arc<Mutex<u64>>,
}

struct RawResponse {
    status: u16,
    headers: HeaderMap,
    body: String,
}

impl RawResponse {
    fn into_result(self) -> Result<ApiResponse> {
        if (200..300).contains(&self.status) {
            Ok(ApiResponse {
                status: self.status,
                headers: self.headers,
                body: self.body,
            })
        } else {
            Err(ClientError::api(self.status, self.body))
        }
    }
}

impl AuthenticatedHttpClient {
    /// Build a client that refreshes against `config.refresh_url()` and only
    /// logs on session termination.
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .build()?;
        let refresher: Arc<dyn RefreshEndpoint> =
            Arc::new(HttpRefreshEndpoint::new(config.refresh_url()).with_client(http.clone()));
        Ok(Self {
            http,
            config,
            store,
            refresher,
            terminator: Arc::new(LogTerminator),
            coordinator: RefreshCoordinator::new(),
            session: Arc::new(Mutex::new(0)),
        })
    }

    pub fn with_refresh_endpoint(mut self, refresher: Arc<dyn RefreshEndpoint>) -> Self {
        self.refresher = refresher;
        self
    }

    pub fn with_terminator(mut self, terminator: Arc<dyn SessionTerminator>) -> Self {
        self.terminator = terminator;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether a refresh wave is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.coordinator.is_refreshing()
    }

    /// Requests parked behind the in-flight refresh wave.
    pub fn queued_requests(&self) -> usize {
        self.coordinator.pending()
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request(ApiRequest::get(path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.request(ApiRequest::delete(path)).await
    }

    pub async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.request(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put_json<B: Serialize>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.request(ApiRequest::put(path).json(body)?).await
    }

    /// Send a request and deserialize the 2xx body.
    pub async fn request_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.request(request).await?.json()
    }

    /// Send a request with the current access token attached.
    ///
    /// Callers only ever see the final response or a terminal error; refresh
    /// and replay happen inside.
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse> {
        let request_id = Uuid::new_v4();
        let epoch = self.current_epoch();
        let sent_token = self.store.access_token()?;

        let raw = self.send(&request, sent_token.as_deref(), request_id).await?;
        if raw.status != 401 {
            return raw.into_result();
        }
        self.recover(request, request_id, epoch, sent_token, raw)
            .await
    }

    async fn recover(
        &self,
        request: ApiRequest,
        request_id: Uuid,
        epoch: u64,
        sent_token: Option<String>,
        raw: RawResponse,
    ) -> Result<ApiResponse> {
        if self.config.revocation_marker.matches(&raw.body) {
            warn!(%request_id, "credential revoked by server");
            if self.end_session(epoch) {
                self.notify_termination(TerminationCause::Revoked);
            }
            return Err(ClientError::SessionRevoked);
        }

        let admission = self.coordinator.admit(|| {
            if self.current_epoch() != epoch {
                return Some(Shortcut::SessionEnded);
            }
            match self.store.access_token() {
                Ok(Some(current)) if sent_token.as_deref() != Some(current.as_str()) => {
                    Some(Shortcut::Replay(current))
                }
                _ => None,
            }
        });

        match admission {
            Admission::Initiator(wave) => self.lead_wave(wave, request, request_id, epoch).await,
            Admission::Follower(settled) => {
                debug!(%request_id, "queued behind in-flight token refresh");
                match settled.await {
                    Ok(WaveOutcome::Refreshed { access_token }) => {
                        self.replay(&request, &access_token, request_id).await
                    }
                    Ok(WaveOutcome::Failed { reason }) => Err(ClientError::SessionExpired(reason)),
                    Err(_) => Err(ClientError::SessionExpired(
                        "token refresh ended without a result".to_string(),
                    )),
                }
            }
            Admission::Shortcut(Shortcut::Replay(access_token)) => {
                debug!(%request_id, "token already refreshed since send");
                self.replay(&request, &access_token, request_id).await
            }
            Admission::Shortcut(Shortcut::SessionEnded) => Err(ClientError::SessionExpired(
                "session ended while the request was in flight".to_string(),
            )),
        }
    }

    async fn lead_wave(
        &self,
        wave: WaveHandle,
        request: ApiRequest,
        request_id: Uuid,
        epoch: u64,
    ) -> Result<ApiResponse> {
        info!(%request_id, "access token rejected; refreshing");
        match self.refresh_credentials(epoch).await {
            Ok(access_token) => {
                let released = wave.settle(WaveOutcome::Refreshed {
                    access_token: access_token.clone(),
                });
                info!(%request_id, released, "token refresh succeeded");
                self.replay(&request, &access_token, request_id).await
            }
            Err(err) => {
                let reason = err.to_string();
                warn!(%request_id, error = %reason, "token refresh failed");
                let ended = self.end_session(epoch);
                let released = wave.settle(WaveOutcome::Failed {
                    reason: reason.clone(),
                });
                debug!(%request_id, released, "rejected queued requests");
                if ended {
                    self.notify_termination(TerminationCause::RefreshFailed);
                }
                Err(ClientError::SessionExpired(reason))
            }
        }
    }

    async fn refresh_credentials(&self, epoch: u64) -> Result<String> {
        let refresh_token = self
            .store
            .refresh_token()?
            .ok_or(AuthError::MissingRefreshToken)?;
        let refreshed = with_timeout(self.config.refresh_timeout, async {
            self.refresher
                .refresh(&refresh_token)
                .await
                .map_err(ClientError::from)
        })
        .await?;
        self.store_refreshed(epoch, refreshed)
    }

    /// Write the refresh result unless the session ended since `epoch`.
    fn store_refreshed(&self, epoch: u64, refreshed: RefreshedToken) -> Result<String> {
        let session = self.lock_session();
        if *session != epoch {
            return Err(ClientError::SessionExpired(
                "session ended during token refresh".to_string(),
            ));
        }
        match refreshed.refresh_token {
            Some(rotated) => self.store.set_credentials(&CredentialPair {
                access_token: refreshed.access_token.clone(),
                refresh_token: rotated,
                last_refresh: Some(chrono::Utc::now()),
            })?,
            None => self.store.set_access_token(&refreshed.access_token)?,
        }
        drop(session);
        Ok(refreshed.access_token)
    }

    /// Replay once with a fresh token. A second 401 is returned as-is.
    async fn replay(
        &self,
        request: &ApiRequest,
        access_token: &str,
        request_id: Uuid,
    ) -> Result<ApiResponse> {
        debug!(%request_id, "replaying request with refreshed token");
        self.send(request, Some(access_token), request_id)
            .await?
            .into_result()
    }

    /// Clear credentials and advance the session epoch, once per epoch.
    ///
    /// Returns false when another path already ended this session.
    fn end_session(&self, epoch: u64) -> bool {
        let mut session = self.lock_session();
        if *session != epoch {
            return false;
        }
        *session += 1;
        if let Err(err) = self.store.clear_credentials() {
            warn!(error = %err, "failed to clear stored credentials");
        }
        true
    }

    fn current_epoch(&self) -> u64 {
        *self.lock_session()
    }

    fn lock_session(&self) -> MutexGuard<'_, u64> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify_termination(&self, cause: TerminationCause) {
        let termination = SessionTermination::new(cause, self.config.login_route.clone());
        warn!(cause = %cause, login_route = %termination.login_route, "ending session");
        self.terminator.terminate(&termination);
    }

    async fn send(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
        request_id: Uuid,
    ) -> Result<RawResponse> {
        let url = self.config.url_for(request.path());
        let mut headers = request.headers().clone();
        if access_token.is_some() {
            headers.remove(AUTHORIZATION);
        }

        let mut builder = self
            .http
            .request(request.method().clone(), &url)
            .headers(headers);
        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        debug!(
            %request_id,
            method = %request.method(),
            %url,
            authenticated = access_token.is_some(),
            "sending request"
        );
        let raw = with_timeout(self.config.request_timeout, async move {
            let resp = builder.send().await?;
            let status = resp.status().as_u16();
            let headers = resp.headers().clone();
            let body = resp.text().await?;
            Ok(RawResponse {
                status,
                headers,
                body,
            })
        })
        .await?;
        debug!(%request_id, status = raw.status, "received response");
        Ok(raw)
    }
}
