//! Login landing for callers the gate turned away.
//!
//! Credentials are checked by the identity service, not here. This page
//! forwards the caller to the service's sign-in flow and, once a session is
//! confirmed, follows `returnUrl` exactly once.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_navigate, use_query_map};
use storefront::{AuthState, RETURN_URL_PARAM, ReturnPath};

use crate::state::auth::SessionCommands;

/// Identity-service sign-in flow, same origin.
const SIGN_IN_PATH: &str = "/auth/sign-in";

/// Where to go after a successful sign-in.
pub(crate) fn post_login_target(return_url: Option<&str>) -> String {
    ReturnPath::capture(return_url, "/").consume()
}

/// Sign-in link that hands `returnUrl` on to the identity service.
pub(crate) fn sign_in_href(return_url: Option<&str>) -> String {
    ReturnPath::capture(return_url, "/").login_url(SIGN_IN_PATH)
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let commands = expect_context::<SessionCommands>();
    let query = use_query_map();
    let navigate = use_navigate();

    Effect::new(move |followed: Option<bool>| {
        if followed == Some(true) {
            return true;
        }
        if !auth.with(AuthState::is_granted) {
            return false;
        }
        let target = post_login_target(query.get_untracked().get(RETURN_URL_PARAM).as_deref());
        navigate(&target, NavigateOptions { replace: true, ..Default::default() });
        true
    });

    let href = move || sign_in_href(query.get().get(RETURN_URL_PARAM).as_deref());
    let checking = move || auth.with(|state| state.loading);
    let on_check = move |_| {
        commands.resync();
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Sign in"</h1>
                <p class="login-card__subtitle">"Sign in to see your orders and account."</p>
                <a class="login-button" href=href rel="external">
                    "Continue to sign in"
                </a>
                <button class="login-button login-button--secondary" on:click=on_check disabled=checking>
                    "I've signed in"
                </button>
            </div>
        </div>
    }
}
