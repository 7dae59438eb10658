//! HTTP session source for native runs.
//!
//! The identity service answers `GET <session endpoint>` with
//! `{"user": {...} | null}`. 401/403/404 mean "no session" and collapse to
//! `Ok(None)` like an explicit null. Other statuses surface as
//! [`SourceError::Status`], network faults as [`SourceError::Transport`].

#[cfg(test)]
#[path = "http_source_test.rs"]
mod http_source_test;

use async_trait::async_trait;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use tracing::debug;

use crate::config::GateConfig;
use crate::error::SourceError;
use crate::session::{Session, SessionSource, StatusClass, classify_status, parse_session_body};

pub struct HttpSessionSource {
    client: reqwest::Client,
    session_url: String,
    logout_url: String,
}

impl HttpSessionSource {
    /// Build a source from config, optionally forwarding a session cookie.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Transport`] if the cookie is not a valid
    /// header value or the HTTP client cannot be built.
    pub fn from_config(config: &GateConfig, cookie: Option<&str>) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            let value =
                HeaderValue::from_str(cookie).map_err(|e| SourceError::Transport(format!("invalid cookie header: {e}")))?;
            headers.insert(COOKIE, value);
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(Self { client, session_url: config.session_url(), logout_url: config.logout_url() })
    }
}

#[async_trait(?Send)]
impl SessionSource for HttpSessionSource {
    async fn fetch_session(&self) -> Result<Option<Session>, SourceError> {
        let resp = self
            .client
            .get(&self.session_url)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        debug!(status, url = %self.session_url, "session query answered");
        match classify_status(status) {
            StatusClass::NoSession => Ok(None),
            StatusClass::Failure => Err(SourceError::Status(status)),
            StatusClass::Body => {
                let body = resp.text().await.map_err(|e| SourceError::Transport(e.to_string()))?;
                parse_session_body(&body)
            }
        }
    }

    async fn end_session(&self) -> Result<(), SourceError> {
        let resp = self
            .client
            .post(&self.logout_url)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        if classify_status(status) == StatusClass::Failure {
            return Err(SourceError::Status(status));
        }
        Ok(())
    }
}
