//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session task is the only writer of the `RwSignal<AuthState>` in
//! context. Components that need to change the session send a
//! [`SessionCommand`] instead of touching the signal.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use futures::channel::mpsc;
use storefront::AuthState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    /// Re-validate against the identity service now.
    Resync,
    SignOut,
}

/// Sending half of the session task's command queue.
#[derive(Clone, Debug)]
pub struct SessionCommands {
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionCommands {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionCommand>) {
        let (tx, rx) = mpsc::unbounded();
        (Self { tx }, rx)
    }

    /// Returns `false` when no session task is running (server render).
    pub fn resync(&self) -> bool {
        self.tx.unbounded_send(SessionCommand::Resync).is_ok()
    }

    pub fn sign_out(&self) -> bool {
        self.tx.unbounded_send(SessionCommand::SignOut).is_ok()
    }
}

/// Header greeting. Only a confirmed session is greeted; a user still
/// being re-validated is not.
pub fn greeting(state: &AuthState) -> Option<String> {
    state.authoritative_user().map(|user| format!("Hi, {}", user.label()))
}
