//! Public catalog landing. The catalog itself is served by another module;
//! this page only needs to render inside the storefront chrome.

use leptos::prelude::*;

#[component]
pub fn ShopPage() -> impl IntoView {
    view! {
        <section class="shop">
            <h1>"Shop"</h1>
            <div class="shop__grid" data-catalog="featured"></div>
        </section>
    }
}
