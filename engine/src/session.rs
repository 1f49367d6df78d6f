//! One game session: owns the world, the spawner and every background loop.
//!
//! Flow: `start` arms everything. A level-up stops the hero and every loop
//! exits at its next wake-up; `resume_with_upgrade` applies the chosen
//! upgrade and, once no choice is pending, joins the old loops and arms
//! fresh ones. Hero death is terminal.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{error, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use survivors_shared::{Direction, GameEvent, SessionPhase, UpgradeKind, WorldSnapshot};

use crate::clock::GameClock;
use crate::combat;
use crate::config::EngineConfig;
use crate::entities::Hero;
use crate::error::EngineError;
use crate::progression::{self, AddedUpgrade};
use crate::signal::StopSignal;
use crate::sync_list::lock;
use crate::tasks::TaskKind;
use crate::world::{Spawner, World};

/// Where the spawner currently lives
enum SpawnerSlot {
    Idle(Spawner),
    Running(JoinHandle<Spawner>),
    /// The spawner task panicked; a fresh one is built on the next start
    Lost,
}

pub struct Session {
    world: Arc<World>,
    spawner: tokio::sync::Mutex<SpawnerSlot>,
    spawn_cancel: StopSignal,
    /// Per weapon instance, reset rather than recreated on every resume
    weapon_signals: Mutex<HashMap<u64, StopSignal>>,
    manual_pause: AtomicBool,
    started: AtomicBool,
}

impl Session {
    /// Build a session and the receiving end of its event channel
    pub fn new(config: EngineConfig) -> (Self, mpsc::Receiver<GameEvent>) {
        let spawner = Spawner::new(&config);
        Self::build(config, spawner)
    }

    /// Session whose spawn rolls are reproducible
    pub fn with_seed(config: EngineConfig, seed: u64) -> (Self, mpsc::Receiver<GameEvent>) {
        let spawner = Spawner::with_seed(&config, seed);
        Self::build(config, spawner)
    }

    fn build(config: EngineConfig, spawner: Spawner) -> (Self, mpsc::Receiver<GameEvent>) {
        let (tx, rx) = mpsc::channel(config.event_capacity.max(1));
        let world = World::new(Arc::new(config), Arc::new(GameClock::new()), tx);

        let session = Self {
            world: Arc::new(world),
            spawner: tokio::sync::Mutex::new(SpawnerSlot::Idle(spawner)),
            spawn_cancel: StopSignal::new(),
            weapon_signals: Mutex::new(HashMap::new()),
            manual_pause: AtomicBool::new(false),
            started: AtomicBool::new(false),
        };
        (session, rx)
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    pub fn hero(&self) -> &Arc<Hero> {
        &self.world.hero
    }

    pub fn clock(&self) -> &Arc<GameClock> {
        &self.world.clock
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.world.clock.elapsed_seconds()
    }

    pub fn state(&self) -> SessionPhase {
        let hero = &self.world.hero;
        if hero.is_dead() {
            SessionPhase::Over
        } else if hero.pending_choices() > 0 {
            SessionPhase::PausedForUpgrade
        } else if self.manual_pause.load(Ordering::SeqCst) {
            SessionPhase::Paused
        } else if !self.started.load(Ordering::SeqCst) {
            SessionPhase::Ready
        } else {
            SessionPhase::Running
        }
    }

    /// Start the clock and arm the spawner, movement and weapon loops
    pub async fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("Session already started");
            return;
        }
        self.world.clock.start();
        info!(
            "Session started for {} on a {}x{} field",
            self.world.hero.name(),
            self.world.field().width,
            self.world.field().height
        );
        self.rearm().await;
    }

    /// Cancel the spawn loop and wait for it to hand the spawner back
    pub async fn stop_generating(&self) {
        self.spawn_cancel.stop();

        let mut slot = self.spawner.lock().await;
        let current = std::mem::replace(&mut *slot, SpawnerSlot::Lost);
        *slot = match current {
            SpawnerSlot::Running(handle) => match handle.await {
                Ok(spawner) => SpawnerSlot::Idle(spawner),
                Err(e) => {
                    error!("Spawner task failed: {}", e);
                    SpawnerSlot::Lost
                }
            },
            other => other,
        };
    }

    async fn start_generating(&self) {
        let mut slot = self.spawner.lock().await;
        let current = std::mem::replace(&mut *slot, SpawnerSlot::Lost);
        let spawner = match current {
            SpawnerSlot::Running(handle) => {
                *slot = SpawnerSlot::Running(handle);
                return;
            }
            SpawnerSlot::Idle(spawner) => spawner,
            SpawnerSlot::Lost => {
                warn!("Spawner was lost, starting a fresh one");
                Spawner::new(&self.world.config)
            }
        };
        *slot = SpawnerSlot::Running(spawner.start_generating(self.world.clone(), self.spawn_cancel.clone()));
    }

    /// Wait for every old loop to exit, then start fresh ones.
    /// Stays paused if a choice became pending or the hero died meanwhile.
    async fn rearm(&self) {
        let hero = &self.world.hero;
        hero.halt().stop();
        self.stop_generating().await;
        self.world.tasks.join_all().await;

        if hero.is_dead() || hero.pending_choices() > 0 || self.manual_pause.load(Ordering::SeqCst) {
            return;
        }

        hero.halt().reset();
        self.world.clock.resume();
        self.spawn_cancel.reset();

        for enemy in self.world.enemies.snapshot() {
            if !enemy.is_dead() {
                self.world.start_movement(enemy);
            }
        }
        self.start_weapons();
        self.start_generating().await;
    }

    fn start_weapons(&self) {
        let mut signals = lock(&self.weapon_signals);
        for upgrade in self.world.hero.upgrades() {
            let Some(stats) = upgrade.weapon().copied() else {
                continue;
            };

            let signal = signals.entry(upgrade.id).or_default().clone();
            signal.reset();
            self.world.tasks.spawn(
                TaskKind::Weapon(upgrade.id),
                combat::weapon_loop(self.world.clone(), upgrade.kind, stats, signal),
            );
        }
    }

    /// Pause from the menu: freeze the clock and stop every loop
    pub async fn pause(&self) -> Result<(), EngineError> {
        if self.world.hero.is_dead() {
            return Err(EngineError::SessionOver);
        }
        if !self.started.load(Ordering::SeqCst) {
            return Err(EngineError::NotStarted);
        }
        self.manual_pause.store(true, Ordering::SeqCst);
        self.world.hero.halt().stop();
        self.world.clock.pause();
        self.stop_generating().await;
        info!("Session paused at {}s", self.elapsed_seconds());
        Ok(())
    }

    /// Leave a manual pause without applying an upgrade
    pub async fn resume(&self) -> Result<(), EngineError> {
        let hero = &self.world.hero;
        if hero.is_dead() {
            return Err(EngineError::SessionOver);
        }
        if hero.pending_choices() > 0 {
            return Err(EngineError::UpgradePending);
        }
        if !self.manual_pause.swap(false, Ordering::SeqCst) {
            return Err(EngineError::NotPaused);
        }
        info!("Session resumed");
        self.rearm().await;
        Ok(())
    }

    /// Apply the upgrade chosen for a level-up. Once no choice is pending
    /// every loop is re-armed from scratch.
    pub async fn resume_with_upgrade(&self, kind: UpgradeKind) -> Result<AddedUpgrade, EngineError> {
        let hero = &self.world.hero;
        if hero.is_dead() {
            return Err(EngineError::SessionOver);
        }
        if hero.pending_choices() == 0 {
            return Err(EngineError::NotPaused);
        }

        let added = hero.add_upgrade(kind)?;
        match kind {
            UpgradeKind::Time => self.world.clock.add_seconds(self.world.config.time_bonus_secs),
            UpgradeKind::OakRoot => {
                let bonus = hero.update_upgrades(|upgrades| progression::oak_root_health(upgrades));
                hero.restore_health(hero.base_health() + bonus);
            }
            _ => {}
        }
        hero.update_upgrades(|upgrades| progression::apply_whetstone(upgrades));

        let (level, split) = match added {
            AddedUpgrade::Consumed => (0, false),
            AddedUpgrade::Created { level, .. } | AddedUpgrade::Leveled { level, .. } => (level, false),
            AddedUpgrade::Split { level, .. } => (level, true),
        };
        info!("Applied {} (level {})", kind.name(), level);
        self.world.emit(GameEvent::UpgradeApplied { kind, level, split });

        if hero.resolve_choice() == 0 {
            self.rearm().await;
        }
        Ok(added)
    }

    /// Scroll the world opposite to `direction`; the hero stays centred.
    /// Ignored unless the session is running.
    pub fn move_hero(&self, direction: Direction) -> bool {
        if self.state() != SessionPhase::Running {
            return false;
        }
        let (dx, dy) = direction.offset();
        let step = self.world.field().step();
        self.world.shift_world(-dx * step, -dy * step);
        true
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.snapshot(self.state())
    }

    /// Stop every loop for good and wait for all of them to exit
    pub async fn shutdown(&self) {
        self.world.hero.halt().stop();
        for signal in lock(&self.weapon_signals).values() {
            signal.stop();
        }
        self.stop_generating().await;
        self.world.tasks.join_all().await;
        self.world.clock.pause();
        info!("Session shut down after {}s", self.elapsed_seconds());
    }
}
