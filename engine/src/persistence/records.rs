//! High-score list stored as a JSON array on disk.

use std::path::{Path, PathBuf};

use survivors_shared::HighScoreRecord;

use crate::error::EngineError;

#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    records: Vec<HighScoreRecord>,
}

impl RecordStore {
    /// Open the store at `path`. A missing file is an empty list.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref().to_path_buf();

        let records = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| EngineError::Records(format!("failed to parse {}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(EngineError::Records(format!("failed to read {}: {}", path.display(), e)));
            }
        };

        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[HighScoreRecord] {
        &self.records
    }

    pub fn best_time(&self, hero_name: &str) -> Option<u64> {
        self.records
            .iter()
            .find(|record| record.hero_name == hero_name)
            .map(|record| record.time)
    }

    /// Keep `record` if it beats the hero's best time or the hero is new.
    /// Returns true if the list changed.
    pub fn add(&mut self, record: HighScoreRecord) -> bool {
        match self.records.iter_mut().find(|existing| existing.hero_name == record.hero_name) {
            Some(existing) if record.time > existing.time => {
                existing.time = record.time;
                true
            }
            Some(_) => false,
            None => {
                self.records.push(record);
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub async fn save(&self) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| EngineError::Records(format!("failed to serialize records: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| EngineError::Records(format!("failed to create {}: {}", parent.display(), e)))?;
        }

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| EngineError::Records(format!("failed to write {}: {}", self.path.display(), e)))
    }
}
