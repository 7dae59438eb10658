//! Storefront chrome: header, footer, and the path-based switch between
//! chrome and bare layouts.

#[cfg(test)]
#[path = "shell_test.rs"]
mod shell_test;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_location;
use storefront::{AuthState, applies_storefront_chrome};

use crate::state::auth::{SessionCommands, greeting};

/// Wrapper class for the main region.
pub(crate) fn main_class(chrome: bool) -> &'static str {
    if chrome { "storefront-main" } else { "storefront-main storefront-main--bare" }
}

/// Wrap routed content in storefront header/footer unless the current path
/// is a bare section (admin, auth flows).
#[component]
pub fn StorefrontShell(children: Children) -> impl IntoView {
    let pathname = use_location().pathname;
    let chrome = Memo::new(move |_| pathname.with(|path| applies_storefront_chrome(Some(path))));

    view! {
        <Show when=move || chrome.get()>
            <SiteHeader/>
        </Show>
        <main class=move || main_class(chrome.get())>{children()}</main>
        <Show when=move || chrome.get()>
            <SiteFooter/>
        </Show>
    }
}

#[component]
fn SiteHeader() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let commands = expect_context::<SessionCommands>();

    let on_sign_out = move |_: leptos::ev::MouseEvent| {
        commands.sign_out();
    };

    view! {
        <header class="site-header">
            <A href="/" attr:class="site-header__brand">"Storefront"</A>
            <nav class="site-header__nav">
                <A href="/shop">"Shop"</A>
                <A href="/account/orders">"Orders"</A>
            </nav>
            {move || match greeting(&auth.get()) {
                Some(text) => view! {
                    <span class="site-header__user">{text}</span>
                    <button class="site-header__sign-out" on:click=on_sign_out.clone()>"Sign out"</button>
                }
                    .into_any(),
                None => view! { <A href="/login" attr:class="site-header__sign-in">"Sign in"</A> }.into_any(),
            }}
        </header>
    }
}

#[component]
fn SiteFooter() -> impl IntoView {
    view! {
        <footer class="site-footer">
            <p>"Free returns within 30 days."</p>
        </footer>
    }
}
