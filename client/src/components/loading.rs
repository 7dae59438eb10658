use leptos::prelude::*;

/// Neutral placeholder shown while the session is unknown.
#[component]
pub fn LoadingPlaceholder() -> impl IntoView {
    view! {
        <div class="loading-placeholder" aria-busy="true">
            <span class="loading-placeholder__spinner"></span>
        </div>
    }
}
