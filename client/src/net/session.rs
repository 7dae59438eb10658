//! Identity-service session queries via `gloo-net`.

use async_trait::async_trait;
use gloo_net::http::Request;
use storefront::session::{StatusClass, classify_status, parse_session_body};
use storefront::{GateConfig, Session, SessionSource, SourceError};
use tokio::sync::watch;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use super::is_snapshot_change;

/// Same-origin session source. The browser attaches the session cookie.
pub struct BrowserSessionSource {
    session_url: String,
    logout_url: String,
    changes: Option<watch::Receiver<u64>>,
}

impl BrowserSessionSource {
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            session_url: config.session_endpoint.clone(),
            logout_url: config.logout_endpoint.clone(),
            changes: watch_other_tabs(config.storage_key.clone()),
        }
    }
}

/// Count `storage` events that touch the snapshot. The browser only fires
/// them for writes made by other tabs. The listener lives as long as the
/// page.
fn watch_other_tabs(storage_key: String) -> Option<watch::Receiver<u64>> {
    let window = web_sys::window()?;
    let (tx, rx) = watch::channel(0_u64);
    let on_storage = Closure::<dyn Fn(web_sys::StorageEvent)>::new(move |event: web_sys::StorageEvent| {
        if is_snapshot_change(event.key().as_deref(), &storage_key) {
            tx.send_modify(|seen| *seen += 1);
        }
    });
    if let Err(e) = window.add_event_listener_with_callback("storage", on_storage.as_ref().unchecked_ref()) {
        log::warn!("cross-tab session listener not installed: {e:?}");
        return None;
    }
    on_storage.forget();
    Some(rx)
}

#[async_trait(?Send)]
impl SessionSource for BrowserSessionSource {
    async fn fetch_session(&self) -> Result<Option<Session>, SourceError> {
        let resp = Request::get(&self.session_url)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        let status = resp.status();
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
        let resp = Request::post(&self.logout_url)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        if classify_status(resp.status()) == StatusClass::Failure {
            return Err(SourceError::Status(resp.status()));
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<watch::Receiver<u64>> {
        self.changes.clone()
    }
}
