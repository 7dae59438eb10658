//! In-process snapshot storage for tests and server-side rendering.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;

use super::PersistedStore;
use crate::error::StoreError;

/// Blob held in memory. Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    blob: Rc<RefCell<Option<String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded with a stored blob, as if left by a previous run.
    #[must_use]
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self { blob: Rc::new(RefCell::new(Some(blob.into()))) }
    }

    #[must_use]
    pub fn blob(&self) -> Option<String> {
        self.blob.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PersistedStore for MemoryStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.blob())
    }

    fn save(&self, blob: String) {
        *self.blob.borrow_mut() = Some(blob);
    }

    fn clear(&self) {
        self.blob.borrow_mut().take();
    }
}
