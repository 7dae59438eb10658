use leptos::prelude::*;
use leptos_router::components::A;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <section class="home">
            <h1>"Welcome"</h1>
            <p>"New arrivals every week."</p>
            <A href="/shop" attr:class="home__cta">"Browse the shop"</A>
        </section>
    }
}

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <section class="not-found">
            <h1>"Page not found"</h1>
            <A href="/">"Back to the storefront"</A>
        </section>
    }
}
