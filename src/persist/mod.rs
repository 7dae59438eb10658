//! Durable snapshot of selected client state.
//!
//! DESIGN
//! ======
//! [`PersistedStore`] is the storage medium (memory, a JSON file, browser
//! `localStorage`); it moves opaque blobs. [`Persistence`] sits on top and
//! owns the in-memory [`PersistedSnapshot`], the one-time hydration, and
//! the serialization format. Versioning lives here, not in the gate.
//!
//! ERROR HANDLING
//! ==============
//! A missing, unreadable, corrupt, or foreign-version snapshot hydrates as
//! "no snapshot". Nothing here can fail the caller; the worst case is a
//! cold start.
//!
//! ORDERING
//! ========
//! Writes update memory immediately and are saved fire-and-forget. Writes
//! made before hydration completes are held back and laid over the loaded
//! snapshot, so a late load never clobbers a newer value.


mod memory;

#[cfg(feature = "native")]
mod file;

pub use memory::MemoryStore;

#[cfg(feature = "native")]
pub use file::JsonFileStore;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{OnceCell, watch};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::session::Session;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Storage medium for the serialized snapshot.
#[async_trait(?Send)]
pub trait PersistedStore {
    /// Read the stored blob. `Ok(None)` when nothing has been stored.
    async fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replace the stored blob. Fire-and-forget; repeated saves must land
    /// in call order.
    fn save(&self, blob: String);

    fn clear(&self);
}

/// Serialized form of everything that survives a reload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub version: u32,
    /// Last session confirmed by the identity service. A hint only; the
    /// gate never treats it as authoritative.
    #[serde(default)]
    pub session: Option<Session>,
    /// Other UI slices keyed by name (cart id, recently viewed, ...).
    #[serde(default)]
    pub slices: BTreeMap<String, serde_json::Value>,
}

impl Default for PersistedSnapshot {
    fn default() -> Self {
        Self { version: SNAPSHOT_VERSION, session: None, slices: BTreeMap::new() }
    }
}

impl PersistedSnapshot {
    /// Decode a stored blob. Foreign versions decode as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when the blob is not a snapshot.
    pub fn decode(blob: &str) -> Result<Option<Self>, StoreError> {
        let snapshot: Self = serde_json::from_str(blob).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            debug!(found = snapshot.version, expected = SNAPSHOT_VERSION, "ignoring snapshot from another version");
            return Ok(None);
        }
        Ok(Some(snapshot))
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if a slice value cannot be serialized.
    pub fn encode(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError::Corrupt(e.to_string()))
    }
}

/// Hydration-aware handle over a [`PersistedStore`]. Cheap to clone.
#[derive(Clone)]
pub struct Persistence {
    inner: Rc<PersistenceInner>,
}

struct PersistenceInner {
    store: Box<dyn PersistedStore>,
    snapshot: RefCell<PersistedSnapshot>,
    /// Set when `remember_session` runs before hydration.
    session_touched: Cell<bool>,
    /// Set when `clear` runs before hydration; the loaded snapshot is then
    /// discarded.
    cleared_early: Cell<bool>,
    hydration: OnceCell<()>,
    hydrated_tx: watch::Sender<bool>,
}

impl Persistence {
    pub fn new(store: impl PersistedStore + 'static) -> Self {
        let (hydrated_tx, _rx) = watch::channel(false);
        Self {
            inner: Rc::new(PersistenceInner {
                store: Box::new(store),
                snapshot: RefCell::new(PersistedSnapshot::default()),
                session_touched: Cell::new(false),
                cleared_early: Cell::new(false),
                hydration: OnceCell::new(),
                hydrated_tx,
            }),
        }
    }

    /// Load the durable snapshot into memory. Runs the load once; every
    /// later or concurrent call waits for that same load.
    pub async fn hydrate(&self) {
        self.inner
            .hydration
            .get_or_init(|| async {
                let loaded = self.load_snapshot().await;
                self.install(loaded);
                self.inner.hydrated_tx.send_replace(true);
            })
            .await;
    }

    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.inner.hydration.initialized()
    }

    /// "Hydration complete" signal: flips to `true` once, never back.
    #[must_use]
    pub fn hydration_signal(&self) -> watch::Receiver<bool> {
        self.inner.hydrated_tx.subscribe()
    }

    /// Copy of the in-memory snapshot.
    #[must_use]
    pub fn read(&self) -> PersistedSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Typed read of one slice. Missing or mistyped slices read as `None`.
    #[must_use]
    pub fn slice<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let snapshot = self.inner.snapshot.borrow();
        let value = snapshot.slices.get(key)?.clone();
        serde_json::from_value(value).ok()
    }

    /// Session remembered from a previous run (or this one).
    #[must_use]
    pub fn cached_session(&self) -> Option<Session> {
        self.inner.snapshot.borrow().session.clone()
    }

    /// Store one slice. Last write wins per key.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "slice not serializable; skipping write");
                return;
            }
        };
        self.inner.snapshot.borrow_mut().slices.insert(key.to_owned(), value);
        self.save();
    }

    pub(crate) fn remember_session(&self, session: Option<Session>) {
        {
            let mut snapshot = self.inner.snapshot.borrow_mut();
            if snapshot.session == session {
                return;
            }
            snapshot.session = session;
        }
        self.inner.session_touched.set(true);
        self.save();
    }

    /// Drop every slice and the remembered session, in memory and on disk.
    pub fn clear(&self) {
        *self.inner.snapshot.borrow_mut() = PersistedSnapshot::default();
        self.inner.session_touched.set(true);
        if !self.is_hydrated() {
            self.inner.cleared_early.set(true);
        }
        self.inner.store.clear();
    }

    async fn load_snapshot(&self) -> Option<PersistedSnapshot> {
        let blob = match self.inner.store.load().await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("no persisted snapshot");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "snapshot load failed; starting cold");
                return None;
            }
        };
        match PersistedSnapshot::decode(&blob) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "discarding unreadable snapshot");
                None
            }
        }
    }

    /// Lay writes made during hydration over the loaded snapshot.
    fn install(&self, loaded: Option<PersistedSnapshot>) {
        let touched = self.inner.session_touched.get();
        let early_writes = {
            let mut current = self.inner.snapshot.borrow_mut();
            let early = std::mem::take(&mut *current);
            let early_writes = touched || !early.slices.is_empty();
            let mut base = if self.inner.cleared_early.get() { PersistedSnapshot::default() } else { loaded.unwrap_or_default() };
            base.slices.extend(early.slices);
            if touched {
                base.session = early.session;
            }
            *current = base;
            early_writes
        };
        info!(has_session = self.cached_session().is_some(), "hydration complete");
        if early_writes {
            self.persist_now();
        }
    }

    fn save(&self) {
        // Saving before the load lands would overwrite the stored snapshot.
        if self.is_hydrated() {
            self.persist_now();
        }
    }

    fn persist_now(&self) {
        let encoded = self.inner.snapshot.borrow().encode();
        match encoded {
            Ok(blob) => self.inner.store.save(blob),
            Err(e) => warn!(error = %e, "snapshot not encodable; keeping previous copy"),
        }
    }
}
