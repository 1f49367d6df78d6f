//! Persistence for the high-score list and upgrade descriptions.
//!
//! Records are written by a background task so the game never waits on
//! file I/O; callers talk to it through a cheap cloneable handle.

mod descriptions;
mod records;

pub use descriptions::UpgradeDescriptions;
pub use records::RecordStore;

use std::path::PathBuf;

use log::{error, info, warn};
use tokio::sync::{mpsc, oneshot};

use survivors_shared::HighScoreRecord;

use crate::error::EngineError;

/// Commands sent to the records background task
#[derive(Debug)]
pub enum RecordsCommand {
    /// Store a result, keeping only the best time per hero name
    AddRecord { record: HighScoreRecord },
    /// Read every record (response sent via oneshot channel)
    ReadAll {
        response: oneshot::Sender<Vec<HighScoreRecord>>,
    },
    Clear,
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// Handle for sending commands to the records task
#[derive(Debug, Clone)]
pub struct RecordsHandle {
    sender: mpsc::Sender<RecordsCommand>,
}

impl RecordsHandle {
    /// Store a result (fire and forget - non-blocking)
    pub fn add_record(&self, record: HighScoreRecord) {
        if self.sender.try_send(RecordsCommand::AddRecord { record }).is_err() {
            warn!("Records task unavailable, result dropped");
        }
    }

    pub async fn read_all(&self) -> Vec<HighScoreRecord> {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(RecordsCommand::ReadAll { response: tx }).await.is_err() {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    pub fn clear(&self) {
        let _ = self.sender.try_send(RecordsCommand::Clear);
    }

    /// Stop the records task once every queued command has been handled
    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(RecordsCommand::Shutdown { done: tx }).await.is_ok() {
            let _ = rx.await;
        }
    }
}

/// Open the records file and spawn the background task.
/// Returns a handle for sending commands.
pub async fn init(path: impl Into<PathBuf>) -> Result<RecordsHandle, EngineError> {
    let store = RecordStore::load(path.into()).await?;
    info!(
        "Loaded {} records from {}",
        store.records().len(),
        store.path().display()
    );

    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(records_task(store, rx));

    Ok(RecordsHandle { sender: tx })
}

async fn records_task(mut store: RecordStore, mut rx: mpsc::Receiver<RecordsCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            RecordsCommand::AddRecord { record } => {
                let name = record.hero_name.clone();
                let time = record.time;
                if !store.add(record) {
                    info!("{} survived {}s, best time unchanged", name, time);
                    continue;
                }
                info!("New best time for {}: {}s", name, time);
                if let Err(e) = store.save().await {
                    error!("Failed to save records: {}", e);
                }
            }

            RecordsCommand::ReadAll { response } => {
                let _ = response.send(store.records().to_vec());
            }

            RecordsCommand::Clear => {
                store.clear();
                if let Err(e) = store.save().await {
                    error!("Failed to clear records: {}", e);
                }
            }

            RecordsCommand::Shutdown { done } => {
                info!("Records task shutting down");
                let _ = done.send(());
                break;
            }
        }
    }
}
