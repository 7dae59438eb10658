//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Protected pages wrap their content in `RequireSession`; the shell decides
//! chrome from the path alone.

pub mod account;
pub mod admin;
pub mod home;
pub mod login;
pub mod shop;
