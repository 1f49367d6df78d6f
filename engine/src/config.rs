//! Engine configuration.
//!
//! Every value has a default matching the console edition of the game, so
//! a config file only needs to name what it overrides.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use survivors_shared::{EnemyKind, EVENT_CHANNEL_CAPACITY};

use crate::error::EngineError;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV_VAR: &str = "SURVIVORS_CONFIG";

/// Visible field size in grid units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSize {
    pub width: i32,
    pub height: i32,
}

impl Default for FieldSize {
    fn default() -> Self {
        Self { width: 160, height: 62 }
    }
}

impl FieldSize {
    /// Distance covered by one movement step, for enemies and for world scrolling
    pub fn step(&self) -> i32 {
        (self.width / 160).max(1)
    }

    /// Size of one footprint cell (width, height)
    pub fn cell(&self) -> (i32, i32) {
        ((self.width / 160).max(1), (self.height / 62).max(1))
    }

    pub fn center(&self) -> (i32, i32) {
        (self.width / 2, self.height / 2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    pub name: String,
    pub max_health: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            name: "Vlad".to_string(),
            max_health: 100,
            width: 1,
            height: 3,
        }
    }
}

/// Spawn roll weight for one enemy kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnWeight {
    pub kind: EnemyKind,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub initial_interval_ms: u64,
    /// Roll weights, checked in order; an unmatched roll falls back to Zombie
    pub weights: Vec<SpawnWeight>,
    /// Multiplier applied to every speed bound per minute
    pub speed_factor: f64,
    /// Multiplier applied to every health baseline per minute
    pub health_factor: f64,
    /// Divisor applied to the spawn interval per minute
    pub interval_divisor: f64,
    /// How far outside the field enemies may appear
    pub margin: i32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 700,
            weights: EnemyKind::ALL
                .iter()
                .map(|kind| SpawnWeight {
                    kind: *kind,
                    weight: kind.default_spawn_weight(),
                })
                .collect(),
            speed_factor: 0.95,
            health_factor: 1.1,
            interval_divisor: 1.5,
            margin: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Whip reach as a fraction of the field width (Euclidean)
    pub whip_range_fraction: f64,
    /// Lightning radius as a fraction of the field height (Manhattan)
    pub lightning_radius_fraction: f64,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            whip_range_fraction: 0.4,
            lightning_radius_fraction: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub field: FieldSize,
    pub hero: HeroConfig,
    pub spawn: SpawnConfig,
    pub weapons: WeaponConfig,
    /// Seconds added to the clock by the Time upgrade
    pub time_bonus_secs: u64,
    pub event_capacity: usize,
    pub rocks: Vec<(i32, i32)>,
    pub records_path: PathBuf,
    pub descriptions_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            field: FieldSize::default(),
            hero: HeroConfig::default(),
            spawn: SpawnConfig::default(),
            weapons: WeaponConfig::default(),
            time_bonus_secs: 5,
            event_capacity: EVENT_CHANNEL_CAPACITY,
            rocks: vec![(34, 10), (10, 20), (16, 14), (23, 30)],
            records_path: PathBuf::from("records.json"),
            descriptions_path: PathBuf::from("upgrades.json"),
        }
    }
}

impl EngineConfig {
    /// Load a config from a JSON file. Missing keys keep their defaults.
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("failed to read {}: {}", path.display(), e)))?;

        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|e| EngineError::Config(format!("failed to parse {}: {}", path.display(), e)))?;

        config.validate()?;
        info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.field.width <= 0 || self.field.height <= 0 {
            return Err(EngineError::Config(format!(
                "field size must be positive, got {}x{}",
                self.field.width, self.field.height
            )));
        }
        if self.hero.max_health <= 0 {
            return Err(EngineError::Config("hero max_health must be positive".to_string()));
        }
        if self.spawn.initial_interval_ms == 0 {
            return Err(EngineError::Config("spawn interval must be at least 1 ms".to_string()));
        }
        if self.spawn.interval_divisor < 1.0 {
            return Err(EngineError::Config("interval_divisor must be >= 1".to_string()));
        }
        if self.event_capacity == 0 {
            return Err(EngineError::Config("event_capacity must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "field": { "width": 320, "height": 124 }, "time_bonus_secs": 9 }"#).unwrap();

        assert_eq!(config.field.width, 320);
        assert_eq!(config.field.step(), 2);
        assert_eq!(config.field.cell(), (2, 2));
        assert_eq!(config.time_bonus_secs, 9);
        assert_eq!(config.hero, HeroConfig::default());
        assert_eq!(config.spawn.initial_interval_ms, 700);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_weights_order() {
        let config = SpawnConfig::default();
        let weights: Vec<u32> = config.weights.iter().map(|w| w.weight).collect();
        assert_eq!(weights, vec![40, 25, 15, 20]);
        assert_eq!(config.weights[0].kind, EnemyKind::Zombie);
    }

    #[test]
    fn test_invalid_field_rejected() {
        let mut config = EngineConfig::default();
        config.field.width = 0;
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = EngineConfig::load_from_json("/nonexistent/survivors.json");
        assert!(matches!(result, Err(EngineError::Config(_))));
    }
}
