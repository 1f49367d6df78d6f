//! Messages and snapshots passed from the engine to presentation collaborators.

use serde::{Deserialize, Serialize};

use crate::{EnemyKind, UpgradeKind};

/// Default capacity of the engine event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Events emitted by the running simulation.
///
/// Delivery is fire-and-forget: when the consumer falls behind, events are
/// dropped rather than stalling the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpawned {
        enemy_id: u64,
        kind: EnemyKind,
        x: i32,
        y: i32,
    },
    /// A weapon struck an enemy
    EnemyHit {
        weapon: UpgradeKind,
        enemy_id: u64,
        x: i32,
        y: i32,
        damage: i32,
        remaining_health: i32,
    },
    EnemyKilled {
        enemy_id: u64,
        kind: EnemyKind,
        experience: u32,
    },
    /// An enemy overlapped the hero during its movement tick
    HeroContact {
        enemy_id: u64,
        kind: EnemyKind,
        damage: i32,
        hero_health: i32,
    },
    /// The hero crossed a level threshold. One event per crossing.
    LevelUp {
        level: u32,
        offered: Vec<UpgradeKind>,
    },
    UpgradeApplied {
        kind: UpgradeKind,
        level: u8,
        split: bool,
    },
    DifficultyRaised {
        minute: u64,
        spawn_interval_ms: u64,
    },
    HeroDied {
        name: String,
        elapsed_seconds: u64,
    },
}

impl GameEvent {
    /// Events a consumer must see for the session to move on
    pub fn is_control(&self) -> bool {
        matches!(self, Self::LevelUp { .. } | Self::HeroDied { .. })
    }
}

/// Lifecycle phase of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Created but not started yet
    Ready,
    Running,
    /// Waiting for the player to pick an upgrade
    PausedForUpgrade,
    /// Paused from the pause menu
    Paused,
    /// The hero died; terminal
    Over,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroView {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub health: i32,
    pub max_health: i32,
    pub level: u32,
    pub experience: u32,
    pub next_level_experience: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u64,
    pub kind: EnemyKind,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub health: i32,
    pub max_health: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RockView {
    pub x: i32,
    pub y: i32,
}

/// Consistent view of the world for one rendered frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub phase: SessionPhase,
    pub elapsed_seconds: u64,
    pub hero: HeroView,
    pub enemies: Vec<EnemyView>,
    pub rocks: Vec<RockView>,
}

/// High-score entry, keyed by hero name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub hero_name: String,
    /// Survival time in seconds
    pub time: u64,
}

impl HighScoreRecord {
    pub fn new(hero_name: impl Into<String>, time: u64) -> Self {
        Self {
            hero_name: hero_name.into(),
            time,
        }
    }
}
