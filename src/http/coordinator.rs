//! Single-flight coordination of token refresh waves.
//!
//! The coordinator is a two-state machine (`Idle`, `Refreshing`) guarded by a
//! `std::sync::Mutex`. The check-and-enter decision for a failed request runs
//! entirely inside one lock scope with no `.await`, so two concurrent 401s can
//! never both observe `Idle`. Followers park on a oneshot channel that the
//! initiator resolves when the wave settles.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

/// How a refresh wave ended, as seen by queued followers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WaveOutcome {
    Refreshed { access_token: String },
    Failed { reason: String },
}

/// Result of admitting a request whose call failed with a 401.
pub(crate) enum Admission {
    /// No wave was running; the caller now owns it and must settle it.
    Initiator(WaveHandle),
    /// A wave is in flight; the receiver resolves when it settles.
    Follower(oneshot::Receiver<WaveOutcome>),
    /// Resolved without touching the state machine.
    Shortcut(Shortcut),
}

/// Outcomes decided by the admission precheck while idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Shortcut {
    /// A previous wave already replaced the token the request was sent with.
    Replay(String),
    /// The session was torn down after the request was sent.
    SessionEnded,
}

#[derive(Default)]
enum RefreshState {
    #[default]
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<WaveOutcome>>,
    },
}

/// Shared refresh state for one client (and all of its clones).
#[derive(Clone, Default)]
pub(crate) struct RefreshCoordinator {
    state: Arc<Mutex<RefreshState>>,
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Decide whether a failed request starts a wave, joins one, or shortcuts.
    ///
    /// `precheck` runs under the state lock and only when idle.
    pub(crate) fn admit(&self, precheck: impl FnOnce() -> Option<Shortcut>) -> Admission {
        let mut state = self.lock();
        if let RefreshState::Refreshing { waiters } = &mut *state {
            let (tx, rx) = oneshot::channel();
            waiters.push(tx);
            return Admission::Follower(rx);
        }
        if let Some(shortcut) = precheck() {
            return Admission::Shortcut(shortcut);
        }
        *state = RefreshState::Refreshing {
            waiters: Vec::new(),
        };
        Admission::Initiator(WaveHandle {
            coordinator: self.clone(),
            settled: false,
        })
    }

    pub(crate) fn is_refreshing(&self) -> bool {
        matches!(*self.lock(), RefreshState::Refreshing { .. })
    }

    /// Number of followers parked on the current wave.
    pub(crate) fn pending(&self) -> usize {
        match &*self.lock() {
            RefreshState::Refreshing { waiters } => waiters.len(),
            RefreshState::Idle => 0,
        }
    }

    fn settle(&self, outcome: WaveOutcome) -> usize {
        let waiters = match std::mem::take(&mut *self.lock()) {
            RefreshState::Refreshing { waiters } => waiters,
            RefreshState::Idle => Vec::new(),
        };
        let released = waiters.len();
        // first-failed order; a dropped receiver just means that caller gave up
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
        released
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ownership of an in-flight wave.
///
/// Dropping it unsettled (the initiator was cancelled) fails the wave for its
/// followers and returns the coordinator to idle.
pub(crate) struct WaveHandle {
    coordinator: RefreshCoordinator,
    settled: bool,
}

impl WaveHandle {
    /// Release every follower with `outcome` and return to idle.
    ///
    /// Returns how many followers were released.
    pub(crate) fn settle(mut self, outcome: WaveOutcome) -> usize {
        self.settled = true;
        self.coordinator.settle(outcome)
    }
}

impl Drop for WaveHandle {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.settle(WaveOutcome::Failed {
                reason: "token refresh was abandoned".to_string(),
            });
        }
    }
}
