//! Process-wide auth state: the `{user, loading}` pair.
//!
//! DESIGN
//! ======
//! One [`AuthStore`] exists per process, created at startup and handed to
//! whoever needs it. The pair is published as a single value through a
//! `watch` channel, so readers never see one field from a new cycle next to
//! the other from an old one. Mutation is crate-private; the
//! [`Synchronizer`](crate::sync::Synchronizer) is its only caller.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use tokio::sync::watch;

use crate::session::Session;

/// Authentication state tracking the current user and loading status.
///
/// While `loading` is true, `user` is not authoritative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<Session>,
    pub loading: bool,
}

impl AuthState {
    /// State before the first synchronization has resolved.
    #[must_use]
    pub fn unknown() -> Self {
        Self { user: None, loading: true }
    }

    #[must_use]
    pub fn settled(user: Option<Session>) -> Self {
        Self { user, loading: false }
    }

    #[must_use]
    pub fn phase(&self) -> AuthPhase<'_> {
        match (self.loading, &self.user) {
            (true, _) => AuthPhase::Unknown,
            (false, None) => AuthPhase::Denied,
            (false, Some(session)) => AuthPhase::Granted(session),
        }
    }

    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self.phase(), AuthPhase::Granted(_))
    }

    /// The user, but only once it can be trusted.
    #[must_use]
    pub fn authoritative_user(&self) -> Option<&Session> {
        match self.phase() {
            AuthPhase::Granted(session) => Some(session),
            _ => None,
        }
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::unknown()
    }
}

/// The three states a reader can act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPhase<'a> {
    Unknown,
    Denied,
    Granted(&'a Session),
}

/// Owner of the single [`AuthState`] value.
#[derive(Debug)]
pub struct AuthStore {
    tx: watch::Sender<AuthState>,
}

impl AuthStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthState::unknown());
        Self { tx }
    }

    /// Read-only view that is notified on every committed change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    /// Mark a new cycle as in progress. No-op (and no notification) when
    /// already loading.
    pub(crate) fn begin_cycle(&self) -> bool {
        self.tx.send_if_modified(|state| {
            if state.loading {
                return false;
            }
            state.loading = true;
            true
        })
    }

    /// Publish the result of a cycle as one atomic value.
    pub(crate) fn commit(&self, user: Option<Session>) {
        self.tx.send_replace(AuthState::settled(user));
    }

    /// Explicit logout: settled and unauthenticated.
    pub(crate) fn reset(&self) {
        self.tx.send_replace(AuthState::settled(None));
    }
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}
