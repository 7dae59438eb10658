//! `localStorage`-backed snapshot store.
//!
//! ERROR HANDLING
//! ==============
//! Private browsing and disabled storage surface from `load` as
//! [`StoreError::Unavailable`]; the synchronizer treats that as a cold
//! start. Failed writes are logged and dropped.

use async_trait::async_trait;
use storefront::{PersistedStore, StoreError};

pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

fn local_storage() -> Result<web_sys::Storage, StoreError> {
    let window = web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".to_owned()))?;
    window
        .local_storage()
        .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?
        .ok_or_else(|| StoreError::Unavailable("localStorage disabled".to_owned()))
}

#[async_trait(?Send)]
impl PersistedStore for LocalStorageStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        local_storage()?.get_item(&self.key).map_err(|e| StoreError::Io(format!("{e:?}")))
    }

    fn save(&self, blob: String) {
        let result = local_storage().and_then(|storage| {
            storage.set_item(&self.key, &blob).map_err(|e| StoreError::Io(format!("{e:?}")))
        });
        if let Err(e) = result {
            log::warn!("session snapshot write failed: {e}");
        }
    }

    fn clear(&self) {
        let result = local_storage()
            .and_then(|storage| storage.remove_item(&self.key).map_err(|e| StoreError::Io(format!("{e:?}"))));
        if let Err(e) = result {
            log::warn!("session snapshot clear failed: {e}");
        }
    }
}
