//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read auth state and gate config from Leptos context; only
//! the session task writes auth state.

pub mod loading;
pub mod require_session;
pub mod shell;
