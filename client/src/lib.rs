//! # storefront-web
//!
//! Leptos front end for the storefront: chrome selection, protected
//! sections, and the browser side of session synchronization.
//!
//! ARCHITECTURE
//! ============
//! - `app`: root component, context providers, and the session task.
//! - `state`: auth signal and the command channel into the session task.
//! - `net`: browser implementations of the session source and snapshot store.
//! - `components`: storefront shell and the `RequireSession` gate.
//! - `pages`: route-level screens.
//! - `util`: the gate effect shared by protected sections.
//!
//! The decision logic lives in the `storefront` crate; this crate only wires
//! it to signals, the router, and browser APIs.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: hydrate the server-rendered body.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
