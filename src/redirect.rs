//! Login redirect URLs and the return-path round trip.
//!
//! A denied caller is sent to `<login>?returnUrl=<percent-encoded path>`.
//! After authenticating, the login flow reads the parameter back (the
//! router has already percent-decoded it), rebuilds it with
//! [`ReturnPath::capture`], follows it once, and discards it.

#[cfg(test)]
#[path = "redirect_test.rs"]
mod redirect_test;

pub const RETURN_URL_PARAM: &str = "returnUrl";

/// Where a denied caller was headed before the login detour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReturnPath(String);

impl ReturnPath {
    /// Capture the current navigation path, or `fallback` when it is
    /// unavailable.
    #[must_use]
    pub fn capture(current: Option<&str>, fallback: &str) -> Self {
        let path = current.map(str::trim).filter(|p| !p.is_empty()).unwrap_or(fallback);
        Self(path.to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Login URL carrying this path as `returnUrl`.
    #[must_use]
    pub fn login_url(&self, login_path: &str) -> String {
        format!("{login_path}?{RETURN_URL_PARAM}={}", urlencoding::encode(&self.0))
    }

    /// Final navigation target. Only same-origin paths are followed;
    /// anything else lands on `/`.
    #[must_use]
    pub fn consume(self) -> String {
        if is_local_path(&self.0) { self.0 } else { "/".to_owned() }
    }
}

/// `/x` is local; `//host/x`, `/\host`, and absolute URLs are not.
#[must_use]
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}
