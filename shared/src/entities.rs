//! Enemy definitions shared between the engine and its presenters.

use serde::{Deserialize, Serialize};

/// Enemy variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Zombie,
    Skeleton,
    Spider,
    Golem,
}

impl EnemyKind {
    /// Every kind, in the priority order used by the spawn roll
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Zombie,
        EnemyKind::Skeleton,
        EnemyKind::Spider,
        EnemyKind::Golem,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Zombie => "Zombie",
            Self::Skeleton => "Skeleton",
            Self::Spider => "Spider",
            Self::Golem => "Golem",
        }
    }

    /// Health taken from the hero on every movement tick spent overlapping it
    pub fn contact_damage(&self) -> i32 {
        match self {
            Self::Zombie => 10,
            Self::Skeleton => 15,
            Self::Spider => 5,
            Self::Golem => 30,
        }
    }

    /// Experience granted to the hero for the kill
    pub fn experience_reward(&self) -> u32 {
        match self {
            Self::Zombie => 10,
            Self::Skeleton => 12,
            Self::Spider => 15,
            Self::Golem => 50,
        }
    }

    /// Footprint in field cells (width, height).
    /// A cell is `field_width / 160` wide and `field_height / 62` tall.
    pub fn footprint_cells(&self) -> (i32, i32) {
        match self {
            Self::Zombie => (1, 3),
            Self::Skeleton => (1, 3),
            Self::Spider => (2, 2),
            Self::Golem => (3, 3),
        }
    }

    /// Starting health before any difficulty ramp
    pub fn base_health(&self) -> i32 {
        match self {
            Self::Zombie => 20,
            Self::Skeleton => 15,
            Self::Spider => 15,
            Self::Golem => 100,
        }
    }

    /// Starting movement tick range in milliseconds (lower bound inclusive,
    /// upper bound exclusive). Lower is faster.
    pub fn base_speed_range_ms(&self) -> (u64, u64) {
        match self {
            Self::Zombie => (300, 500),
            Self::Skeleton => (200, 400),
            Self::Spider => (180, 210),
            Self::Golem => (400, 600),
        }
    }

    /// Default weight in the spawn roll (out of 100)
    pub fn default_spawn_weight(&self) -> u32 {
        match self {
            Self::Zombie => 40,
            Self::Skeleton => 25,
            Self::Spider => 15,
            Self::Golem => 20,
        }
    }
}

/// Movement direction requested by the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit offset of the hero in screen coordinates (y grows downwards)
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}
