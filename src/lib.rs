//! # storefront
//!
//! Session synchronization and route protection for the storefront UI.
//!
//! ARCHITECTURE
//! ============
//! Three timelines converge on one decision: snapshot hydration, the
//! identity-service session fetch, and rendering. The pieces, leaf-first:
//!
//! - [`persist`]: durable snapshot contract (`hydrate`/`read`/`write`).
//! - [`session`]: the `Session` record and the `SessionSource` boundary.
//! - [`sync`]: the single writer of auth state, with single-flight fetches.
//! - [`auth`]: the process-wide `{user, loading}` value and its readers.
//! - [`gate`]: the per-section render/redirect state machine.
//! - [`layout`]: path-only storefront chrome selection.
//!
//! Everything runs on one cooperative thread. Traits use `?Send` futures so
//! the same code drives both the native probe and the WASM client.

pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod layout;
pub mod persist;
pub mod redirect;
pub mod session;
pub mod sync;

#[cfg(feature = "native")]
pub mod http_source;

pub use auth::{AuthPhase, AuthState, AuthStore};
pub use config::GateConfig;
pub use error::{ConfigError, SourceError, StoreError};
pub use gate::{GateStep, GateView, NavigateOptions, Navigator, RouteGate};
pub use layout::{LayoutDecision, applies_storefront_chrome};
pub use persist::{MemoryStore, PersistedSnapshot, PersistedStore, Persistence};
pub use redirect::{RETURN_URL_PARAM, ReturnPath};
pub use session::{Session, SessionSource};
pub use sync::{SyncOutcome, Synchronizer};
