//! Gate configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_PROTECTED_PATH: &str = "/account";
pub const DEFAULT_IDENTITY_URL: &str = "http://localhost:3000";
pub const DEFAULT_SESSION_ENDPOINT: &str = "/api/auth/session";
pub const DEFAULT_LOGOUT_ENDPOINT: &str = "/api/auth/logout";
pub const DEFAULT_STORAGE_KEY: &str = "storefront_session_v1";
pub const DEFAULT_SNAPSHOT_PATH: &str = ".storefront/session.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Login entry point that denied callers are sent to.
    pub login_path: String,
    /// Return path used when the current path is unavailable.
    pub default_protected_path: String,
    /// Identity service origin.
    pub identity_url: String,
    /// Session query path on the identity service.
    pub session_endpoint: String,
    /// Session teardown path on the identity service.
    pub logout_endpoint: String,
    /// Stable key for the persisted snapshot.
    pub storage_key: String,
    /// File backing the snapshot on native targets.
    pub snapshot_path: PathBuf,
    pub request_timeout_secs: u64,
    /// Periodic re-validation interval; `None` disables it.
    pub revalidate_secs: Option<u64>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            default_protected_path: DEFAULT_PROTECTED_PATH.to_owned(),
            identity_url: DEFAULT_IDENTITY_URL.to_owned(),
            session_endpoint: DEFAULT_SESSION_ENDPOINT.to_owned(),
            logout_endpoint: DEFAULT_LOGOUT_ENDPOINT.to_owned(),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            revalidate_secs: None,
        }
    }
}

impl GateConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional (defaults in parentheses):
    /// - `STOREFRONT_LOGIN_PATH` (`/login`)
    /// - `STOREFRONT_DEFAULT_PROTECTED_PATH` (`/account`)
    /// - `STOREFRONT_IDENTITY_URL` (`http://localhost:3000`)
    /// - `STOREFRONT_SESSION_ENDPOINT` (`/api/auth/session`)
    /// - `STOREFRONT_LOGOUT_ENDPOINT` (`/api/auth/logout`)
    /// - `STOREFRONT_STORAGE_KEY` (`storefront_session_v1`)
    /// - `STOREFRONT_SNAPSHOT_PATH` (`.storefront/session.json`)
    /// - `STOREFRONT_REQUEST_TIMEOUT_SECS` (10)
    /// - `STOREFRONT_REVALIDATE_SECS` (unset: no periodic re-validation)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a path setting is empty or relative.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GateConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a path setting is empty or relative.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, default: String| lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or(default);

        let config = Self {
            login_path: text("STOREFRONT_LOGIN_PATH", defaults.login_path),
            default_protected_path: text("STOREFRONT_DEFAULT_PROTECTED_PATH", defaults.default_protected_path),
            identity_url: text("STOREFRONT_IDENTITY_URL", defaults.identity_url),
            session_endpoint: text("STOREFRONT_SESSION_ENDPOINT", defaults.session_endpoint),
            logout_endpoint: text("STOREFRONT_LOGOUT_ENDPOINT", defaults.logout_endpoint),
            storage_key: text("STOREFRONT_STORAGE_KEY", defaults.storage_key),
            snapshot_path: lookup("STOREFRONT_SNAPSHOT_PATH")
                .filter(|v| !v.trim().is_empty())
                .map_or(defaults.snapshot_path, PathBuf::from),
            request_timeout_secs: parse_or(&lookup, "STOREFRONT_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            revalidate_secs: lookup("STOREFRONT_REVALIDATE_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0),
        };
        config.validate()?;
        Ok(config)
    }

    /// Full URL of the identity service's session query.
    #[must_use]
    pub fn session_url(&self) -> String {
        format!("{}{}", self.identity_url.trim_end_matches('/'), self.session_endpoint)
    }

    #[must_use]
    pub fn logout_url(&self) -> String {
        format!("{}{}", self.identity_url.trim_end_matches('/'), self.logout_endpoint)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn revalidate_interval(&self) -> Option<Duration> {
        self.revalidate_secs.map(Duration::from_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require_absolute("STOREFRONT_LOGIN_PATH", &self.login_path)?;
        require_absolute("STOREFRONT_DEFAULT_PROTECTED_PATH", &self.default_protected_path)?;
        require_absolute("STOREFRONT_SESSION_ENDPOINT", &self.session_endpoint)?;
        require_absolute("STOREFRONT_LOGOUT_ENDPOINT", &self.logout_endpoint)?;
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Empty { key: "STOREFRONT_STORAGE_KEY" });
        }
        Ok(())
    }
}

fn require_absolute(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::NotAbsolutePath { key, value: value.to_owned() })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
