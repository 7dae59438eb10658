//! Session record and the identity-service boundary.
//!
//! SYSTEM CONTEXT
//! ==============
//! The identity service owns sessions; this crate only caches a read-only
//! copy. Credential verification (login, signup, password reset) happens
//! entirely on the other side of [`SessionSource`].

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::SourceError;

/// Server-confirmed identity for the current caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Stable user identifier assigned by the identity service.
    #[serde(alias = "id")]
    pub user_id: String,
    /// Name shown in the storefront header, if the service provides one.
    #[serde(default, alias = "name")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), display_name: None, email: None }
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Whether `other` refers to the same user, ignoring profile attributes.
    #[must_use]
    pub fn is_same_identity(&self, other: &Session) -> bool {
        self.user_id == other.user_id
    }

    /// Header label: display name when present, otherwise the user id.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.user_id)
    }
}

#[derive(Deserialize)]
struct SessionEnvelope {
    #[serde(default)]
    user: Option<Session>,
}

/// How a session-query response status is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx with a `{"user": ...}` body to decode.
    Body,
    /// 204, 401, 403, 404: the caller has no session.
    NoSession,
    Failure,
}

#[must_use]
pub fn classify_status(status: u16) -> StatusClass {
    match status {
        204 | 401 | 403 | 404 => StatusClass::NoSession,
        200..=299 => StatusClass::Body,
        _ => StatusClass::Failure,
    }
}

/// Decode a session-query body. Blank bodies and `{"user": null}` both
/// mean no session.
///
/// # Errors
///
/// Returns [`SourceError::Decode`] when the body is not the expected JSON.
pub fn parse_session_body(body: &str) -> Result<Option<Session>, SourceError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let envelope: SessionEnvelope = serde_json::from_str(body).map_err(|e| SourceError::Decode(e.to_string()))?;
    Ok(envelope.user)
}

/// The identity service as seen from the client.
///
/// `fetch_session` errors only on transport failure. "Unauthorized" and
/// "unauthenticated" both arrive as `Ok(None)`.
#[async_trait(?Send)]
pub trait SessionSource {
    async fn fetch_session(&self) -> Result<Option<Session>, SourceError>;

    /// End the caller's session on the service side.
    async fn end_session(&self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Change notifications pushed by the service, if it supports them.
    /// Each `changed()` on the receiver means "the session may differ now".
    fn subscribe(&self) -> Option<watch::Receiver<u64>> {
        None
    }
}
