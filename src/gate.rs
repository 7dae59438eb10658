//! Route gate: render, wait, or send the caller to login.
//!
//! STATE MACHINE
//! =============
//! - UNKNOWN (loading): placeholder, no navigation.
//! - DENIED (settled, no user): one push-navigation to
//!   `<login>?returnUrl=<path>`, then placeholder until the state changes.
//! - GRANTED (settled, user): render the protected subtree.
//!
//! The redirect latch arms on entering DENIED and re-arms on leaving it, so
//! each contiguous DENIED interval produces exactly one navigation no matter
//! how often the gate is evaluated.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::auth::{AuthPhase, AuthState};
use crate::config::GateConfig;
use crate::redirect::ReturnPath;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

/// Navigation boundary. Fire-and-forget: the gate never waits for the
/// navigation to finish.
pub trait Navigator {
    fn navigate(&self, path: &str, options: NavigateOptions);
}

impl<F> Navigator for F
where
    F: Fn(&str, NavigateOptions),
{
    fn navigate(&self, path: &str, options: NavigateOptions) {
        self(path, options);
    }
}

/// Result of one gate evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateStep {
    /// Auth state unknown; show the placeholder.
    Wait,
    /// First evaluation of a DENIED interval; navigate here.
    Redirect(String),
    /// DENIED with the redirect already issued.
    Hold,
    Render,
}

impl GateStep {
    #[must_use]
    pub fn view(&self) -> GateView {
        match self {
            Self::Render => GateView::Content,
            Self::Wait | Self::Redirect(_) | Self::Hold => GateView::Placeholder,
        }
    }
}

/// What the protected section shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GateView {
    #[default]
    Placeholder,
    Content,
}

/// Guard for one protected section.
#[derive(Clone, Debug)]
pub struct RouteGate {
    login_path: String,
    fallback_path: String,
    redirected: bool,
}

impl RouteGate {
    #[must_use]
    pub fn new(login_path: impl Into<String>, fallback_path: impl Into<String>) -> Self {
        Self { login_path: login_path.into(), fallback_path: fallback_path.into(), redirected: false }
    }

    #[must_use]
    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(config.login_path.clone(), config.default_protected_path.clone())
    }

    /// Decide for `state` at `current_path`. Pure apart from the latch.
    pub fn evaluate(&mut self, state: &AuthState, current_path: Option<&str>) -> GateStep {
        match state.phase() {
            AuthPhase::Unknown => {
                self.redirected = false;
                GateStep::Wait
            }
            AuthPhase::Granted(_) => {
                self.redirected = false;
                GateStep::Render
            }
            AuthPhase::Denied if self.redirected => GateStep::Hold,
            AuthPhase::Denied => {
                self.redirected = true;
                let return_path = ReturnPath::capture(current_path, &self.fallback_path);
                GateStep::Redirect(return_path.login_url(&self.login_path))
            }
        }
    }

    /// Evaluate and issue the redirect, if any, through `navigator`.
    pub fn observe<N>(&mut self, state: &AuthState, current_path: Option<&str>, navigator: &N) -> GateView
    where
        N: Navigator + ?Sized,
    {
        let step = self.evaluate(state, current_path);
        if let GateStep::Redirect(url) = &step {
            info!(%url, "redirecting signed-out caller to login");
            navigator.navigate(url, NavigateOptions { replace: false });
        }
        step.view()
    }
}

/// Keep a gate in step with auth state until its consumer goes away.
///
/// Notifications that arrive faster than the gate runs collapse to the
/// latest state. The loop ends when every receiver of `views` is dropped
/// (the section unmounted) or the auth store is gone. A navigation issued
/// before that is left to complete.
pub async fn drive_gate<N>(
    mut gate: RouteGate,
    mut states: watch::Receiver<AuthState>,
    current_path: Option<String>,
    navigator: N,
    views: watch::Sender<GateView>,
) where
    N: Navigator,
{
    loop {
        let state = states.borrow_and_update().clone();
        let view = gate.observe(&state, current_path.as_deref(), &navigator);
        views.send_if_modified(|shown| {
            if *shown == view {
                return false;
            }
            *shown = view;
            true
        });

        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    debug!("auth store dropped; gate stopping");
                    break;
                }
            }
            () = views.closed() => {
                debug!(path = ?current_path, "gate consumer unmounted; gate stopping");
                break;
            }
        }
    }
}
