//! Enemy spawner.
//!
//! Enemies appear just outside one edge of the visible field. Every new
//! in-game minute makes them faster, tougher and more frequent. The spawner
//! owns its scaling counters; only its own loop touches them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;

use survivors_shared::{EnemyKind, GameEvent};

use crate::config::{EngineConfig, FieldSize, SpawnWeight};
use crate::entities::Enemy;
use crate::error::EngineError;
use crate::signal::StopSignal;
use crate::world::World;

/// Range of the spawn roll; weights are matched against it cumulatively
const ROLL_RANGE: u32 = 100;

/// Current stat baseline of one enemy kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnProfile {
    /// Movement tick bounds in ms, lower is faster
    pub speed_range_ms: (u64, u64),
    pub health: i32,
}

impl SpawnProfile {
    fn base(kind: EnemyKind) -> Self {
        Self {
            speed_range_ms: kind.base_speed_range_ms(),
            health: kind.base_health(),
        }
    }
}

/// Edge of the field an enemy enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

pub struct Spawner {
    field: FieldSize,
    margin: i32,
    weights: Vec<SpawnWeight>,
    speed_factor: f64,
    health_factor: f64,
    interval_divisor: f64,
    profiles: HashMap<EnemyKind, SpawnProfile>,
    spawn_interval_ms: u64,
    /// Last in-game minute the ramp was applied for
    current_minute: u64,
    rng: StdRng,
}

impl Spawner {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic spawner for tests and replays
    pub fn with_seed(config: &EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &EngineConfig, rng: StdRng) -> Self {
        let profiles = EnemyKind::ALL
            .iter()
            .map(|kind| (*kind, SpawnProfile::base(*kind)))
            .collect();

        Self {
            field: config.field,
            margin: config.spawn.margin.max(1),
            weights: config.spawn.weights.clone(),
            speed_factor: config.spawn.speed_factor,
            health_factor: config.spawn.health_factor,
            interval_divisor: config.spawn.interval_divisor,
            profiles,
            spawn_interval_ms: config.spawn.initial_interval_ms.max(1),
            current_minute: 0,
            rng,
        }
    }

    pub fn profile(&self, kind: EnemyKind) -> Option<&SpawnProfile> {
        self.profiles.get(&kind)
    }

    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    pub fn spawn_interval_ms(&self) -> u64 {
        self.spawn_interval_ms
    }

    pub fn current_minute(&self) -> u64 {
        self.current_minute
    }

    /// Apply the per-minute ramp once for every minute boundary crossed since
    /// the last call. Returns the number of ramps applied.
    pub fn ramp_difficulty(&mut self, elapsed_secs: u64) -> u64 {
        let minute = elapsed_secs / 60;
        let mut applied = 0;

        while self.current_minute < minute {
            for profile in self.profiles.values_mut() {
                let (lo, hi) = profile.speed_range_ms;
                profile.speed_range_ms = (scale_ms(lo, self.speed_factor), scale_ms(hi, self.speed_factor));
                profile.health = (profile.health as f64 * self.health_factor) as i32;
            }
            self.spawn_interval_ms = ((self.spawn_interval_ms as f64 / self.interval_divisor) as u64).max(1);
            self.current_minute += 1;
            applied += 1;

            info!(
                "Difficulty raised for minute {}: spawn interval {} ms",
                self.current_minute, self.spawn_interval_ms
            );
        }
        applied
    }

    fn roll_side(&mut self) -> Side {
        match self.rng.gen_range(0..4) {
            0 => Side::Top,
            1 => Side::Bottom,
            2 => Side::Left,
            _ => Side::Right,
        }
    }

    /// Random point just outside the visible field
    pub fn generate_coordinates(&mut self) -> (i32, i32) {
        let FieldSize { width, height } = self.field;
        let margin = self.margin;

        match self.roll_side() {
            Side::Top => (self.rng.gen_range(-margin..width + margin), self.rng.gen_range(-margin..0)),
            Side::Bottom => (
                self.rng.gen_range(-margin..width + margin),
                self.rng.gen_range(height + 1..=height + margin),
            ),
            Side::Left => (self.rng.gen_range(-margin..0), self.rng.gen_range(-margin..height + margin)),
            Side::Right => (
                self.rng.gen_range(width + 1..=width + margin),
                self.rng.gen_range(-margin..height + margin),
            ),
        }
    }

    /// Map a roll in `0..100` to a kind using cumulative weights
    pub fn roll_kind(&self, roll: u32) -> EnemyKind {
        let mut cumulative = 0;
        for entry in &self.weights {
            cumulative += entry.weight;
            if roll < cumulative {
                return entry.kind;
            }
        }
        EnemyKind::Zombie
    }

    pub fn generate_enemy_kind(&mut self) -> EnemyKind {
        let roll = self.rng.gen_range(0..ROLL_RANGE);
        self.roll_kind(roll)
    }

    /// Build one enemy with stats scaled to the elapsed game time
    pub fn generate(&mut self, id: u64, elapsed_secs: u64) -> Result<Enemy, EngineError> {
        self.ramp_difficulty(elapsed_secs);

        let (x, y) = self.generate_coordinates();
        let kind = self.generate_enemy_kind();
        let profile = *self.profiles.get(&kind).ok_or(EngineError::MissingProfile(kind))?;

        let (lo, hi) = profile.speed_range_ms;
        let speed_ms = if hi > lo { self.rng.gen_range(lo..hi) } else { lo };

        let (cell_w, cell_h) = self.field.cell();
        let (cells_w, cells_h) = kind.footprint_cells();

        Ok(Enemy::new(
            id,
            kind,
            profile.health,
            x,
            y,
            cell_w * cells_w,
            cell_h * cells_h,
            speed_ms.max(1),
        ))
    }

    /// Generate one enemy, add it to the world and start its movement loop.
    /// The enemy list stays locked for the whole step.
    fn spawn_once(&mut self, world: &Arc<World>) -> Result<u64, EngineError> {
        let elapsed = world.clock.elapsed_seconds();
        world.enemies.with_lock(|enemies| {
            let enemy = Arc::new(self.generate(world.next_enemy_id(), elapsed)?);
            let (x, y) = enemy.position();
            let (id, kind) = (enemy.id(), enemy.kind());

            enemies.push(enemy.clone());
            world.start_movement(enemy);
            world.emit(GameEvent::EnemySpawned { enemy_id: id, kind, x, y });
            Ok(id)
        })
    }

    /// Run the spawn loop until `cancel` fires or the hero is stopped.
    /// The spawner is handed back when the loop exits so it can be restarted
    /// with its counters intact.
    pub fn start_generating(self, world: Arc<World>, cancel: StopSignal) -> JoinHandle<Spawner> {
        tokio::spawn(async move {
            let mut spawner = self;
            debug!("Spawner started, interval {} ms", spawner.spawn_interval_ms);

            loop {
                if cancel.is_stopped() || world.hero.is_stopped() {
                    break;
                }

                let minute = spawner.current_minute;
                match spawner.spawn_once(&world) {
                    Ok(id) => debug!("Spawned enemy {}", id),
                    Err(e) => warn!("Spawner tick failed, skipping: {}", e),
                }
                if spawner.current_minute != minute {
                    world.emit(GameEvent::DifficultyRaised {
                        minute: spawner.current_minute,
                        spawn_interval_ms: spawner.spawn_interval_ms,
                    });
                }

                if !cancel.sleep_either(world.hero.halt(), spawner.spawn_interval()).await {
                    break;
                }
            }

            debug!("Spawner stopped");
            spawner
        })
    }
}

fn scale_ms(value: u64, factor: f64) -> u64 {
    ((value as f64 * factor) as u64).max(1)
}

impl std::fmt::Debug for Spawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spawner")
            .field("spawn_interval_ms", &self.spawn_interval_ms)
            .field("current_minute", &self.current_minute)
            .field("profiles", &self.profiles.len())
            .finish()
    }
}
