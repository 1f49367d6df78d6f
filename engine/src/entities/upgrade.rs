//! Upgrades owned by the hero: weapons and passive bonuses.

use std::time::Duration;

use survivors_shared::{UpgradeKind, MAX_UPGRADE_LEVEL};

use crate::error::EngineError;

/// Live stats of one weapon instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponStats {
    damage: i32,
    /// Additive damage granted by other upgrades (Whetstone)
    bonus: i32,
    pub attack_speed_ms: u64,
}

impl WeaponStats {
    pub fn new(damage: i32, attack_speed_ms: u64) -> Self {
        Self {
            damage,
            bonus: 0,
            attack_speed_ms,
        }
    }

    pub fn damage(&self) -> i32 {
        self.damage
    }

    pub fn attack_speed(&self) -> Duration {
        Duration::from_millis(self.attack_speed_ms)
    }

    /// Replace the weapon's own damage; bonuses are kept
    pub fn set_damage(&mut self, damage: i32) {
        self.damage = damage;
    }

    pub fn bonus(&self) -> i32 {
        self.bonus
    }

    pub fn set_bonus(&mut self, bonus: i32) {
        self.bonus = bonus;
    }

    /// Damage dealt per hit: own damage plus all additive bonuses
    pub fn overall_damage(&self) -> i32 {
        self.damage + self.bonus
    }
}

/// What an upgrade does for the hero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeEffect {
    Weapon(WeaponStats),
    /// OakRoot: extra max health
    Vitality { additional_health: i32 },
    /// Whetstone: extra damage for every weapon
    Sharpness { additional_damage: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upgrade {
    pub id: u64,
    pub kind: UpgradeKind,
    level: u8,
    pub effect: UpgradeEffect,
}

impl Upgrade {
    /// Build a level-1 upgrade. Fails for kinds that are never stored.
    pub fn create(id: u64, kind: UpgradeKind) -> Result<Self, EngineError> {
        let effect = match kind {
            UpgradeKind::Whip | UpgradeKind::Lightning => {
                let profile = kind.weapon_profile().ok_or(EngineError::InvalidUpgrade(kind))?;
                UpgradeEffect::Weapon(WeaponStats::new(profile.damage, profile.attack_speed_ms))
            }
            UpgradeKind::OakRoot => UpgradeEffect::Vitality { additional_health: 0 },
            UpgradeKind::Whetstone => UpgradeEffect::Sharpness { additional_damage: 0 },
            UpgradeKind::Time => return Err(EngineError::InvalidUpgrade(kind)),
        };

        let mut upgrade = Self {
            id,
            kind,
            level: 1,
            effect,
        };
        upgrade.set_level(1);
        Ok(upgrade)
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= MAX_UPGRADE_LEVEL
    }

    /// Set the level and re-derive the level-dependent stats
    pub fn set_level(&mut self, level: u8) {
        let level = level.clamp(1, MAX_UPGRADE_LEVEL);
        self.level = level;

        let kind = self.kind;
        match &mut self.effect {
            UpgradeEffect::Weapon(stats) => {
                if let Some(damage) = kind.weapon_damage(level) {
                    stats.set_damage(damage);
                }
            }
            UpgradeEffect::Vitality { additional_health } => {
                *additional_health = UpgradeKind::oak_root_health(level);
            }
            UpgradeEffect::Sharpness { additional_damage } => {
                *additional_damage = UpgradeKind::whetstone_damage(level);
            }
        }
    }

    /// Raise the level by exactly one
    pub fn level_up(&mut self) -> Result<u8, EngineError> {
        if self.is_max_level() {
            return Err(EngineError::MaxLevel(self.kind));
        }
        self.set_level(self.level + 1);
        Ok(self.level)
    }

    pub fn weapon(&self) -> Option<&WeaponStats> {
        match &self.effect {
            UpgradeEffect::Weapon(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn weapon_mut(&mut self) -> Option<&mut WeaponStats> {
        match &mut self.effect {
            UpgradeEffect::Weapon(stats) => Some(stats),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_weapons() {
        let whip = Upgrade::create(1, UpgradeKind::Whip).unwrap();
        let stats = whip.weapon().unwrap();
        assert_eq!(whip.level(), 1);
        assert_eq!(stats.damage(), 10);
        assert_eq!(stats.attack_speed_ms, 800);

        let lightning = Upgrade::create(2, UpgradeKind::Lightning).unwrap();
        assert_eq!(lightning.weapon().unwrap().overall_damage(), 15);
        assert_eq!(lightning.weapon().unwrap().attack_speed_ms, 1300);
    }

    #[test]
    fn test_create_time_fails() {
        assert_eq!(
            Upgrade::create(1, UpgradeKind::Time),
            Err(EngineError::InvalidUpgrade(UpgradeKind::Time))
        );
    }

    #[test]
    fn test_damage_change_keeps_bonus() {
        let mut whip = Upgrade::create(1, UpgradeKind::Whip).unwrap();
        whip.weapon_mut().unwrap().set_bonus(3);
        assert_eq!(whip.weapon().unwrap().overall_damage(), 13);

        whip.level_up().unwrap();
        let stats = whip.weapon().unwrap();
        assert_eq!(stats.damage(), 14);
        assert_eq!(stats.overall_damage(), 17);
    }

    #[test]
    fn test_level_tables() {
        let mut lightning = Upgrade::create(1, UpgradeKind::Lightning).unwrap();
        let mut damages = Vec::new();
        while lightning.level_up().is_ok() {
            damages.push(lightning.weapon().unwrap().damage());
        }
        assert_eq!(damages, vec![19, 25, 25, 32, 45, 45]);
        assert_eq!(lightning.level_up(), Err(EngineError::MaxLevel(UpgradeKind::Lightning)));

        let mut oak = Upgrade::create(2, UpgradeKind::OakRoot).unwrap();
        assert_eq!(oak.effect, UpgradeEffect::Vitality { additional_health: 10 });
        oak.set_level(7);
        assert_eq!(oak.effect, UpgradeEffect::Vitality { additional_health: 200 });

        let mut stone = Upgrade::create(3, UpgradeKind::Whetstone).unwrap();
        stone.level_up().unwrap();
        stone.level_up().unwrap();
        assert_eq!(stone.effect, UpgradeEffect::Sharpness { additional_damage: 5 });
    }
}
