//! Experience, level thresholds and the upgrade pipeline.

use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use survivors_shared::{EnemyKind, UpgradeKind, MAX_UPGRADE_LEVEL};

use crate::entities::{Upgrade, UpgradeEffect};
use crate::error::EngineError;

/// Experience needed for the first level-up
pub const INITIAL_LEVEL_THRESHOLD: u32 = 100;

/// Growth of the threshold per level
const THRESHOLD_GROWTH: f64 = 1.5;

/// Number of upgrade kinds offered per level-up
pub const OFFER_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub experience: u32,
    pub next_level_experience: u32,
    pub level: u32,
    /// Level-ups whose upgrade has not been chosen yet
    pub pending_choices: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            experience: 0,
            next_level_experience: INITIAL_LEVEL_THRESHOLD,
            level: 1,
            pending_choices: 0,
        }
    }
}

/// Add experience and return the number of thresholds crossed.
/// Every crossing grows the threshold and adds exactly one level.
pub fn gain_experience(progress: &mut Progress, amount: u32) -> u32 {
    progress.experience = progress.experience.saturating_add(amount);

    let mut gained = 0;
    while progress.experience >= progress.next_level_experience {
        let next = (progress.next_level_experience as f64 * THRESHOLD_GROWTH) as u32;
        progress.next_level_experience = next.max(progress.next_level_experience + 1);
        progress.level += 1;
        gained += 1;
    }
    gained
}

/// Levels gained by one experience grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelGain {
    pub levels: u32,
    /// Level after the grant
    pub level: u32,
}

impl LevelGain {
    pub fn is_level_up(&self) -> bool {
        self.levels > 0
    }

    /// Every level reached by this grant, lowest first
    pub fn reached(&self) -> std::ops::RangeInclusive<u32> {
        (self.level + 1 - self.levels)..=self.level
    }
}

/// Experience reward for killing an enemy of `kind`
pub fn experience_for(kind: EnemyKind) -> u32 {
    kind.experience_reward()
}

/// Result of adding an upgrade to the hero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddedUpgrade {
    /// Non-storable upgrade (Time), consumed by the caller
    Consumed,
    Created { id: u64, level: u8 },
    Leveled { id: u64, level: u8 },
    /// The weapon reached a split tier and a second instance was attached
    Split { id: u64, level: u8, split_id: u64 },
}

/// Add `kind` to `upgrades`: create it at level 1, or level up the first
/// owned instance. Whip and Lightning reaching level 4 or 7 also attach an
/// independent weapon instance with the split stats.
pub fn add_upgrade<F>(upgrades: &mut Vec<Upgrade>, kind: UpgradeKind, mut next_id: F) -> Result<AddedUpgrade, EngineError>
where
    F: FnMut() -> u64,
{
    if !kind.is_storable() {
        return Ok(AddedUpgrade::Consumed);
    }

    let Some(index) = upgrades.iter().position(|upgrade| upgrade.kind == kind) else {
        let upgrade = Upgrade::create(next_id(), kind)?;
        let id = upgrade.id;
        upgrades.push(upgrade);
        return Ok(AddedUpgrade::Created { id, level: 1 });
    };

    let existing = &mut upgrades[index];
    let level = existing.level_up()?;
    let id = existing.id;

    let Some(split) = kind.tier_split(level) else {
        return Ok(AddedUpgrade::Leveled { id, level });
    };

    let mut extra = Upgrade::create(next_id(), kind)?;
    extra.set_level(split.level);
    if let Some(stats) = extra.weapon_mut() {
        stats.attack_speed_ms = split.attack_speed_ms;
        if let Some(damage) = split.damage {
            stats.set_damage(damage);
        }
    }
    let split_id = extra.id;
    info!("{} reached level {}, attaching extra instance {}", kind.name(), level, split_id);
    upgrades.push(extra);

    Ok(AddedUpgrade::Split { id, level, split_id })
}

/// Total weapon bonus granted by owned Whetstones
pub fn whetstone_bonus(upgrades: &[Upgrade]) -> i32 {
    upgrades
        .iter()
        .map(|upgrade| match upgrade.effect {
            UpgradeEffect::Sharpness { additional_damage } => additional_damage,
            _ => 0,
        })
        .sum()
}

/// Extra max health granted by owned OakRoots
pub fn oak_root_health(upgrades: &[Upgrade]) -> i32 {
    upgrades
        .iter()
        .map(|upgrade| match upgrade.effect {
            UpgradeEffect::Vitality { additional_health } => additional_health,
            _ => 0,
        })
        .sum()
}

/// Set every weapon's additive bonus from the owned Whetstones
pub fn apply_whetstone(upgrades: &mut [Upgrade]) {
    let bonus = whetstone_bonus(upgrades);
    for upgrade in upgrades.iter_mut() {
        if let Some(stats) = upgrade.weapon_mut() {
            stats.set_bonus(bonus);
        }
    }
}

/// Pick up to three distinct kinds the hero has not maxed yet.
/// When everything is maxed only Time is offered.
pub fn offer_choices<R: Rng + ?Sized>(upgrades: &[Upgrade], rng: &mut R) -> Vec<UpgradeKind> {
    let mut candidates: Vec<UpgradeKind> = UpgradeKind::ALL
        .iter()
        .copied()
        .filter(|kind| kind.is_storable())
        .filter(|kind| {
            !upgrades
                .iter()
                .any(|upgrade| upgrade.kind == *kind && upgrade.level() >= MAX_UPGRADE_LEVEL)
        })
        .collect();

    candidates.shuffle(rng);
    candidates.truncate(OFFER_SIZE);

    if candidates.is_empty() {
        candidates.push(UpgradeKind::Time);
    }
    candidates
}
