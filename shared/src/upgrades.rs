//! Upgrade definitions and their per-level stat curves.

use serde::{Deserialize, Serialize};

/// Highest level any stored upgrade can reach
pub const MAX_UPGRADE_LEVEL: u8 = 7;

/// Upgrade variant offered on level-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    Whip,
    Lightning,
    OakRoot,
    Whetstone,
    /// Bonus survival time, consumed on the spot and never stored
    Time,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 5] = [
        UpgradeKind::Whip,
        UpgradeKind::Lightning,
        UpgradeKind::OakRoot,
        UpgradeKind::Whetstone,
        UpgradeKind::Time,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Whip => "Whip",
            Self::Lightning => "Lightning",
            Self::OakRoot => "OakRoot",
            Self::Whetstone => "Whetstone",
            Self::Time => "Time",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Whether the hero keeps this upgrade in its inventory
    pub fn is_storable(&self) -> bool {
        !matches!(self, Self::Time)
    }

    /// Base stats of a freshly built weapon
    pub fn weapon_profile(&self) -> Option<WeaponProfile> {
        match self {
            Self::Whip => Some(WeaponProfile { damage: 10, attack_speed_ms: 800 }),
            Self::Lightning => Some(WeaponProfile { damage: 15, attack_speed_ms: 1300 }),
            _ => None,
        }
    }

    /// Weapon damage at a given level. Level 1 is the base profile damage.
    pub fn weapon_damage(&self, level: u8) -> Option<i32> {
        let table: [i32; 7] = match self {
            Self::Whip => [10, 14, 18, 18, 26, 35, 35],
            Self::Lightning => [15, 19, 25, 25, 32, 45, 45],
            _ => return None,
        };
        let index = level.clamp(1, MAX_UPGRADE_LEVEL) as usize - 1;
        Some(table[index])
    }

    /// Extra weapon instance created when this kind reaches `level`
    pub fn tier_split(&self, level: u8) -> Option<TierSplit> {
        if level != 4 && level != 7 {
            return None;
        }
        match self {
            Self::Whip => Some(TierSplit { level: 3, attack_speed_ms: 700, damage: None }),
            Self::Lightning => Some(TierSplit { level: 1, attack_speed_ms: 1500, damage: Some(100) }),
            _ => None,
        }
    }

    /// Total extra max health granted by an OakRoot at `level`
    pub fn oak_root_health(level: u8) -> i32 {
        const STEPS: [i32; 7] = [10, 20, 20, 20, 30, 50, 50];
        STEPS.iter().take(level.min(MAX_UPGRADE_LEVEL) as usize).sum()
    }

    /// Total extra weapon damage granted by a Whetstone at `level`
    pub fn whetstone_damage(level: u8) -> i32 {
        const STEPS: [i32; 7] = [1, 2, 2, 3, 3, 4, 5];
        STEPS.iter().take(level.min(MAX_UPGRADE_LEVEL) as usize).sum()
    }
}

/// Starting damage and attack interval of a weapon kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub damage: i32,
    pub attack_speed_ms: u64,
}

/// Stats of the second weapon spawned when a weapon hits a split tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSplit {
    /// Level the new instance starts at
    pub level: u8,
    pub attack_speed_ms: u64,
    /// Damage override; `None` keeps the level table value
    pub damage: Option<i32>,
}

/// Display text for one upgrade level, as stored in `upgrades.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeDescription {
    pub upgrade: String,
    pub level: u8,
    pub description: String,
}
