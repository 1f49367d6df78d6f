//! Display text for upgrade levels, loaded from `upgrades.json`.

use std::collections::HashMap;
use std::path::Path;

use log::{info, warn};
use survivors_shared::{UpgradeDescription, UpgradeKind};

use crate::error::EngineError;

#[derive(Debug, Default, Clone)]
pub struct UpgradeDescriptions {
    entries: HashMap<(UpgradeKind, u8), String>,
}

impl UpgradeDescriptions {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<UpgradeDescription>) -> Self {
        let mut descriptions = Self::default();
        for entry in entries {
            match UpgradeKind::from_name(&entry.upgrade) {
                Some(kind) => {
                    descriptions.entries.insert((kind, entry.level), entry.description);
                }
                None => warn!("Unknown upgrade in descriptions: {}", entry.upgrade),
            }
        }
        descriptions
    }

    /// Load from a JSON list of `{upgrade, level, description}` entries
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("failed to read {}: {}", path.display(), e)))?;

        let entries: Vec<UpgradeDescription> = serde_json::from_str(&content)
            .map_err(|e| EngineError::Config(format!("failed to parse {}: {}", path.display(), e)))?;

        let descriptions = Self::from_entries(entries);
        info!("Loaded {} upgrade descriptions from {}", descriptions.len(), path.display());
        Ok(descriptions)
    }

    pub fn describe(&self, kind: UpgradeKind, level: u8) -> Option<&str> {
        self.entries.get(&(kind, level)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::records::tests::temp_dir;

    #[test]
    fn test_load_and_describe() {
        let dir = temp_dir("descriptions");
        let path = dir.join("upgrades.json");
        std::fs::write(
            &path,
            r#"[
                {"upgrade": "Whip", "level": 1, "description": "Strikes the nearest enemy"},
                {"upgrade": "lightning", "level": 4, "description": "A second bolt joins in"},
                {"upgrade": "Garlic", "level": 1, "description": "Not in this game"}
            ]"#,
        )
        .unwrap();

        let descriptions = UpgradeDescriptions::load_from_json(&path).unwrap();
        assert_eq!(descriptions.len(), 2);
        assert_eq!(
            descriptions.describe(UpgradeKind::Whip, 1),
            Some("Strikes the nearest enemy")
        );
        assert_eq!(
            descriptions.describe(UpgradeKind::Lightning, 4),
            Some("A second bolt joins in")
        );
        assert_eq!(descriptions.describe(UpgradeKind::Whip, 2), None);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = UpgradeDescriptions::load_from_json("/nonexistent/upgrades.json");
        assert!(matches!(result, Err(EngineError::Config(_))));
        assert!(UpgradeDescriptions::empty().is_empty());
    }
}
