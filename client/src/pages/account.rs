//! Signed-in account pages.

use leptos::prelude::*;
use leptos_router::components::A;
use storefront::AuthState;

use crate::components::require_session::RequireSession;

#[component]
pub fn AccountPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let email = move || auth.with(|state| state.authoritative_user().and_then(|user| user.email.clone()));

    view! {
        <RequireSession>
            <section class="account">
                <h1>"Your account"</h1>
                <Show when=move || email().is_some()>
                    <p class="account__email">{move || email().unwrap_or_default()}</p>
                </Show>
                <A href="/account/orders">"Order history"</A>
            </section>
        </RequireSession>
    }
}

#[component]
pub fn OrdersPage() -> impl IntoView {
    view! {
        <RequireSession>
            <section class="orders">
                <h1>"Orders"</h1>
                <div class="orders__list" data-orders="recent"></div>
            </section>
        </RequireSession>
    }
}
