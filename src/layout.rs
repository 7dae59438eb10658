//! Storefront chrome selection by path.
//!
//! Admin and auth-flow sections render bare; everything else gets the
//! storefront header and footer. The decision depends on the path only,
//! never on who is signed in.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

/// First path segments that render without storefront chrome.
pub const BARE_SECTIONS: &[&str] = &["admin", "admin-auth", "login", "signup", "verify-email"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutDecision {
    pub apply_storefront_chrome: bool,
}

impl LayoutDecision {
    /// Resolve the layout for any path, including a missing one.
    #[must_use]
    pub fn for_path(path: Option<&str>) -> Self {
        Self { apply_storefront_chrome: applies_storefront_chrome(path) }
    }
}

/// Whether `path` gets the storefront header and footer.
///
/// Matching is by whole first segment: `/admin` and `/admin/x` are bare,
/// `/administrative` is not. Query strings and fragments are ignored.
#[must_use]
pub fn applies_storefront_chrome(path: Option<&str>) -> bool {
    let Some(path) = path else {
        return true;
    };
    !BARE_SECTIONS.contains(&first_segment(path))
}

fn first_segment(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.trim_start_matches('/').split('/').next().unwrap_or_default()
}
