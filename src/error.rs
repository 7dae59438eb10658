//! Error types for the session gate.
//!
//! ERROR HANDLING
//! ==============
//! None of these reach the screen. Source failures collapse to "no
//! session", store failures collapse to "no snapshot". They exist so the
//! boundary adapters can report what went wrong before the collapse.

/// Failure talking to the identity service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("identity service unreachable: {0}")]
    Transport(String),
    #[error("identity service returned status {0}")]
    Status(u16),
    #[error("malformed session payload: {0}")]
    Decode(String),
}

/// Failure reading or writing the durable snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot storage unavailable: {0}")]
    Unavailable(String),
    #[error("snapshot io failed: {0}")]
    Io(String),
    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),
}

/// Invalid gate configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be an absolute path starting with '/', got {value:?}")]
    NotAbsolutePath { key: &'static str, value: String },
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}
