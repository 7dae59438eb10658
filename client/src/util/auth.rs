//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected section runs the same gate: wait while loading, push one
//! login redirect per signed-out interval, render once granted.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use storefront::{AuthState, GateView, RouteGate};

/// Router navigation options for a gate-issued navigation.
pub fn router_options(options: storefront::NavigateOptions) -> leptos_router::NavigateOptions {
    leptos_router::NavigateOptions { replace: options.replace, ..Default::default() }
}

/// Drive `gate` from `auth` and return what the section should show.
///
/// The gate (and its redirect latch) is carried from one effect run to the
/// next, so re-running on unrelated changes never repeats a redirect.
pub fn install_login_redirect<P, F>(
    auth: RwSignal<AuthState>,
    gate: RouteGate,
    current_path: P,
    navigate: F,
) -> ReadSignal<GateView>
where
    P: Fn() -> String + 'static,
    F: Fn(&str, leptos_router::NavigateOptions) + 'static,
{
    let view = RwSignal::new(GateView::Placeholder);
    Effect::new(move |previous: Option<RouteGate>| {
        let mut gate = previous.unwrap_or_else(|| gate.clone());
        let state = auth.get();
        let path = current_path();
        let navigator = |url: &str, options: storefront::NavigateOptions| navigate(url, router_options(options));
        let next = gate.observe(&state, Some(&path), &navigator);
        if view.get_untracked() != next {
            view.set(next);
        }
        gate
    });
    view.read_only()
}
