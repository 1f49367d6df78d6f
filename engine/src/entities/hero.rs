//! The player-controlled hero.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use survivors_shared::{EnemyKind, HeroView, UpgradeKind};

use crate::entities::{Rect, Upgrade};
use crate::error::EngineError;
use crate::progression::{self, AddedUpgrade, LevelGain, Progress};
use crate::signal::StopSignal;
use crate::sync_list::lock;

#[derive(Debug)]
struct Vitals {
    current: i32,
    max: i32,
    dead: bool,
}

/// Result of applying damage to the hero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    Survived(i32),
    /// This hit killed the hero; reported exactly once
    Died,
    AlreadyDead,
}

#[derive(Debug)]
pub struct Hero {
    name: String,
    width: i32,
    height: i32,
    /// Max health before any OakRoot bonus
    base_health: i32,
    position: Mutex<(i32, i32)>,
    /// Dedicated damage lock, separate from the enemy list lock
    vitals: Mutex<Vitals>,
    progress: Mutex<Progress>,
    upgrades: Mutex<Vec<Upgrade>>,
    next_upgrade_id: AtomicU64,
    /// Raised when the hero is stopped (level-up, pause, death); every loop watches it
    halt: StopSignal,
}

impl Hero {
    /// Create a hero armed with a level-1 Whip
    pub fn new(name: impl Into<String>, max_health: i32, x: i32, y: i32, width: i32, height: i32) -> Self {
        let hero = Self {
            name: name.into(),
            width,
            height,
            base_health: max_health,
            position: Mutex::new((x, y)),
            vitals: Mutex::new(Vitals {
                current: max_health,
                max: max_health,
                dead: false,
            }),
            progress: Mutex::new(Progress::default()),
            upgrades: Mutex::new(Vec::new()),
            next_upgrade_id: AtomicU64::new(1),
            halt: StopSignal::new(),
        };
        let starter = Upgrade::create(hero.allocate_upgrade_id(), UpgradeKind::Whip);
        lock(&hero.upgrades).extend(starter);
        hero
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn position(&self) -> (i32, i32) {
        *lock(&self.position)
    }

    pub fn bounds(&self) -> Rect {
        let (x, y) = self.position();
        Rect::new(x, y, self.width, self.height)
    }

    // =========================================================================
    // Health
    // =========================================================================

    pub fn health(&self) -> i32 {
        lock(&self.vitals).current
    }

    pub fn base_health(&self) -> i32 {
        self.base_health
    }

    pub fn max_health(&self) -> i32 {
        lock(&self.vitals).max
    }

    pub fn is_dead(&self) -> bool {
        lock(&self.vitals).dead
    }

    /// Subtract health. Crossing zero flips the hero to dead exactly once.
    pub fn apply_damage(&self, amount: i32) -> DamageOutcome {
        let mut vitals = lock(&self.vitals);
        if vitals.dead {
            return DamageOutcome::AlreadyDead;
        }
        vitals.current -= amount;
        if vitals.current <= 0 {
            vitals.dead = true;
            DamageOutcome::Died
        } else {
            DamageOutcome::Survived(vitals.current)
        }
    }

    /// Set max health and refill to it
    pub fn restore_health(&self, max: i32) {
        let mut vitals = lock(&self.vitals);
        if vitals.dead {
            return;
        }
        vitals.max = max;
        vitals.current = max;
    }

    // =========================================================================
    // Stop flag
    // =========================================================================

    pub fn halt(&self) -> &StopSignal {
        &self.halt
    }

    pub fn is_stopped(&self) -> bool {
        self.halt.is_stopped()
    }

    // =========================================================================
    // Progression
    // =========================================================================

    /// Grant the kill reward for `kind`
    pub fn earn_experience(&self, kind: EnemyKind) -> LevelGain {
        self.add_experience(progression::experience_for(kind))
    }

    pub fn add_experience(&self, amount: u32) -> LevelGain {
        let mut progress = lock(&self.progress);
        let levels = progression::gain_experience(&mut progress, amount);
        LevelGain {
            levels,
            level: progress.level,
        }
    }

    pub fn experience(&self) -> u32 {
        lock(&self.progress).experience
    }

    pub fn next_level_experience(&self) -> u32 {
        lock(&self.progress).next_level_experience
    }

    pub fn level(&self) -> u32 {
        lock(&self.progress).level
    }

    pub fn pending_choices(&self) -> u32 {
        lock(&self.progress).pending_choices
    }

    pub fn add_pending_choices(&self, count: u32) {
        lock(&self.progress).pending_choices += count;
    }

    /// Mark one pending upgrade choice resolved; returns how many remain
    pub fn resolve_choice(&self) -> u32 {
        let mut progress = lock(&self.progress);
        progress.pending_choices = progress.pending_choices.saturating_sub(1);
        progress.pending_choices
    }

    fn allocate_upgrade_id(&self) -> u64 {
        self.next_upgrade_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn add_upgrade(&self, kind: UpgradeKind) -> Result<AddedUpgrade, EngineError> {
        let mut upgrades = lock(&self.upgrades);
        progression::add_upgrade(&mut upgrades, kind, || self.allocate_upgrade_id())
    }

    pub fn upgrades(&self) -> Vec<Upgrade> {
        lock(&self.upgrades).clone()
    }

    pub fn upgrade_level(&self, kind: UpgradeKind) -> Option<u8> {
        lock(&self.upgrades).iter().find(|upgrade| upgrade.kind == kind).map(|upgrade| upgrade.level())
    }

    /// Run `f` with exclusive access to the owned upgrades
    pub fn update_upgrades<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Vec<Upgrade>) -> R,
    {
        f(&mut lock(&self.upgrades))
    }

    pub fn view(&self) -> HeroView {
        let (x, y) = self.position();
        let (health, max_health) = {
            let vitals = lock(&self.vitals);
            (vitals.current, vitals.max)
        };
        let progress = lock(&self.progress).clone();
        HeroView {
            name: self.name.clone(),
            x,
            y,
            width: self.width,
            height: self.height,
            health,
            max_health,
            level: progress.level,
            experience: progress.experience,
            next_level_experience: progress.next_level_experience,
        }
    }
}
