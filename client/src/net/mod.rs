//! Browser implementations of the session boundaries.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` queries the identity service over same-origin HTTP and
//! `storage` keeps the session snapshot in `localStorage`. Both exist only
//! in the hydrated bundle; server rendering never syncs.
//!
//! Tabs share one snapshot. When another tab rewrites it (sign-in,
//! sign-out, a re-sync that changed identity), the browser fires a
//! `storage` event here and the session source reports a change.


#[cfg(feature = "hydrate")]
pub mod session;
#[cfg(feature = "hydrate")]
pub mod storage;

/// Whether a `storage` event for `event_key` touched the session snapshot.
/// A `None` key means the other tab cleared all of `localStorage`.
pub fn is_snapshot_change(event_key: Option<&str>, storage_key: &str) -> bool {
    event_key.is_none_or(|key| key == storage_key)
}
