//! JSON-file snapshot storage for native runs.
//!
//! DESIGN
//! ======
//! A single background writer drains a FIFO queue, so saves land in call
//! order. Consecutive queued saves collapse to the newest blob before
//! touching disk. Each write goes to a sibling temp file and is renamed
//! into place, so a crash mid-write leaves the previous snapshot intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::PersistedStore;
use crate::error::StoreError;

enum WriterCommand {
    Save(String),
    Clear,
    Flush(oneshot::Sender<()>),
}

/// Snapshot stored as a JSON file. Clones share one writer.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    tx: mpsc::UnboundedSender<WriterCommand>,
}

impl JsonFileStore {
    /// Open the store and spawn its writer. Must be called inside a Tokio
    /// runtime. The writer exits once every clone has been dropped.
    #[must_use]
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(path.clone(), rx));
        Self { path, tx }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait until every save and clear queued so far has hit the disk.
    pub async fn flushed(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(WriterCommand::Flush(ack_tx)).is_err() {
            return;
        }
        if ack_rx.await.is_err() {
            warn!(path = %self.path.display(), "snapshot writer stopped before flush");
        }
    }

    fn enqueue(&self, command: WriterCommand) {
        if self.tx.send(command).is_err() {
            warn!(path = %self.path.display(), "snapshot writer is gone; dropping write");
        }
    }
}

#[async_trait(?Send)]
impl PersistedStore for JsonFileStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }

    fn save(&self, blob: String) {
        self.enqueue(WriterCommand::Save(blob));
    }

    fn clear(&self) {
        self.enqueue(WriterCommand::Clear);
    }
}

async fn run_writer(path: PathBuf, mut rx: mpsc::UnboundedReceiver<WriterCommand>) {
    let mut next = rx.recv().await;
    while let Some(command) = next.take() {
        match command {
            WriterCommand::Save(mut blob) => {
                // Newer queued saves supersede this one.
                loop {
                    match rx.try_recv() {
                        Ok(WriterCommand::Save(newer)) => blob = newer,
                        Ok(other) => {
                            next = Some(other);
                            break;
                        }
                        Err(_) => break,
                    }
                }
                if let Err(e) = write_atomically(&path, &blob).await {
                    warn!(path = %path.display(), error = %e, "snapshot write failed");
                }
            }
            WriterCommand::Clear => match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!(path = %path.display(), "snapshot removed"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "snapshot removal failed"),
            },
            WriterCommand::Flush(ack) => {
                if ack.send(()).is_err() {
                    debug!("flush waiter went away");
                }
            }
        }
        if next.is_none() {
            next = rx.recv().await;
        }
    }
    debug!(path = %path.display(), "snapshot writer stopped");
}

async fn write_atomically(path: &Path, blob: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, blob).await?;
    tokio::fs::rename(&tmp, path).await
}
