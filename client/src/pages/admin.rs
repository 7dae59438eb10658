//! Back-office catalog screen. Lives under `/admin`, so the shell renders
//! it without storefront chrome.

use leptos::prelude::*;

use crate::components::require_session::RequireSession;

#[component]
pub fn CatalogAdminPage() -> impl IntoView {
    view! {
        <RequireSession>
            <section class="admin-catalog">
                <h1>"Catalog"</h1>
                <div class="admin-catalog__table" data-catalog="all"></div>
            </section>
        </RequireSession>
    }
}
