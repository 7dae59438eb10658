//! Route-protection wrapper for signed-in sections.

use leptos::prelude::*;
use leptos_router::hooks::{use_location, use_navigate};
use storefront::{AuthState, GateConfig, GateView, RouteGate};

use crate::components::loading::LoadingPlaceholder;
use crate::util::auth::install_login_redirect;

/// Render `children` only for a confirmed session. Shows the placeholder
/// while loading and sends signed-out callers to login with a return path.
#[component]
pub fn RequireSession(children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let config = expect_context::<GateConfig>();
    let pathname = use_location().pathname;
    let navigate = use_navigate();

    let view = install_login_redirect(auth, RouteGate::from_config(&config), move || pathname.get(), navigate);

    view! {
        <Show when=move || view.get() == GateView::Content fallback=|| view! { <LoadingPlaceholder/> }>
            {children()}
        </Show>
    }
}
