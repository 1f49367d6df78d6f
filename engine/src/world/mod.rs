//! Shared world state for one game session.
//!
//! Everything a background loop needs (field size, clock, hero, enemy list,
//! rocks, event channel) lives here and is handed out as `Arc<World>`.

mod spawner;

pub use spawner::{SpawnProfile, Spawner};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, info};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use survivors_shared::{GameEvent, SessionPhase, WorldSnapshot};

use crate::clock::GameClock;
use crate::config::{EngineConfig, FieldSize};
use crate::entities::{Enemy, Hero, Rock};
use crate::movement;
use crate::progression::{self, LevelGain};
use crate::sync_list::{lock, SyncList};
use crate::tasks::{TaskKind, TaskTable};

pub struct World {
    pub config: Arc<EngineConfig>,
    pub clock: Arc<GameClock>,
    pub hero: Arc<Hero>,
    pub enemies: SyncList<Arc<Enemy>>,
    rocks: Mutex<Vec<Rock>>,
    pub tasks: TaskTable,
    events: mpsc::Sender<GameEvent>,
    next_enemy_id: AtomicU64,
}

impl World {
    pub fn new(config: Arc<EngineConfig>, clock: Arc<GameClock>, events: mpsc::Sender<GameEvent>) -> Self {
        let (x, y) = config.field.center();
        let hero = Hero::new(
            config.hero.name.clone(),
            config.hero.max_health,
            x,
            y,
            config.hero.width,
            config.hero.height,
        );
        let rocks = config.rocks.iter().map(|&(x, y)| Rock::new(x, y)).collect();

        Self {
            config,
            clock,
            hero: Arc::new(hero),
            enemies: SyncList::new(),
            rocks: Mutex::new(rocks),
            tasks: TaskTable::new(),
            events,
            next_enemy_id: AtomicU64::new(1),
        }
    }

    pub fn field(&self) -> FieldSize {
        self.config.field
    }

    /// Send an event to the presentation side without waiting. Control
    /// events are never dropped: a full channel hands them to a send task.
    pub fn emit(&self, event: GameEvent) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) if event.is_control() => {
                if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                    let events = self.events.clone();
                    runtime.spawn(async move {
                        let _ = events.send(event).await;
                    });
                }
            }
            Err(_) => {}
        }
    }

    pub fn next_enemy_id(&self) -> u64 {
        self.next_enemy_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Launch the movement loop of `enemy`
    pub fn start_movement(self: &Arc<Self>, enemy: Arc<Enemy>) {
        let kind = TaskKind::Movement(enemy.id());
        self.tasks.spawn(kind, movement::movement_loop(self.clone(), enemy));
    }

    /// Stop every loop and wait for upgrade choices, one per level reached
    pub fn begin_upgrade_pause(&self, gain: LevelGain) {
        if !gain.is_level_up() || self.hero.is_dead() {
            return;
        }

        self.hero.add_pending_choices(gain.levels);
        self.hero.halt().stop();
        self.clock.pause();

        let upgrades = self.hero.upgrades();
        let mut rng = rand::thread_rng();
        for level in gain.reached() {
            let offered = progression::offer_choices(&upgrades, &mut rng);
            info!("{} reached level {}, offering {:?}", self.hero.name(), level, offered);
            self.emit(GameEvent::LevelUp { level, offered });
        }
    }

    /// Stop every loop for good after the hero died
    pub fn handle_hero_death(&self) {
        self.hero.halt().stop();
        self.clock.pause();

        let elapsed_seconds = self.clock.elapsed_seconds();
        info!("{} died after {} seconds", self.hero.name(), elapsed_seconds);
        self.emit(GameEvent::HeroDied {
            name: self.hero.name().to_string(),
            elapsed_seconds,
        });
    }

    pub fn rocks(&self) -> Vec<Rock> {
        lock(&self.rocks).clone()
    }

    /// Move rocks and enemies by (dx, dy); the hero stays centred
    pub fn shift_world(&self, dx: i32, dy: i32) {
        for rock in lock(&self.rocks).iter_mut() {
            rock.shift(dx, dy);
        }
        self.enemies.with_lock(|enemies| {
            for enemy in enemies.iter() {
                enemy.shift(dx, dy);
            }
        });
        debug!("World shifted by ({}, {})", dx, dy);
    }

    pub fn snapshot(&self, phase: SessionPhase) -> WorldSnapshot {
        let mut enemies = Vec::new();
        self.enemies.for_each(|enemy| enemies.push(enemy.view()));

        WorldSnapshot {
            phase,
            elapsed_seconds: self.clock.elapsed_seconds(),
            hero: self.hero.view(),
            enemies,
            rocks: self.rocks().iter().map(Rock::view).collect(),
        }
    }
}
