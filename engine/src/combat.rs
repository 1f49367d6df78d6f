//! Weapon attack loops and target selection.
//!
//! Every weapon instance runs its own loop: sleep for the attack interval,
//! pick a target, strike. A kill is owned by whichever strike flips the
//! enemy's dead flag first, so experience is granted once even when two
//! weapons finish the same enemy.

use std::sync::Arc;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use survivors_shared::{GameEvent, UpgradeKind};

use crate::config::{FieldSize, WeaponConfig};
use crate::entities::{Enemy, Hero, WeaponStats};
use crate::progression::{self, LevelGain};
use crate::signal::StopSignal;
use crate::sync_list::SyncList;
use crate::world::World;

/// How a weapon chooses what to hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetPolicy {
    /// Closest enemy by Euclidean distance, strictly within `range`
    Nearest { range: f64 },
    /// Any enemy within `radius` Manhattan distance, chosen at random
    RandomInRadius { radius: i32 },
}

impl TargetPolicy {
    pub fn for_kind(kind: UpgradeKind, field: FieldSize, weapons: &WeaponConfig) -> Option<Self> {
        match kind {
            UpgradeKind::Whip => Some(Self::Nearest {
                range: field.width as f64 * weapons.whip_range_fraction,
            }),
            UpgradeKind::Lightning => Some(Self::RandomInRadius {
                radius: (field.height as f64 * weapons.lightning_radius_fraction) as i32,
            }),
            _ => None,
        }
    }
}

/// Nearest live enemy to the hero. Ties keep the first one in list order.
pub fn find_nearest_enemy(enemies: &SyncList<Arc<Enemy>>, hero: &Hero, range: f64) -> Option<Arc<Enemy>> {
    let (hero_x, hero_y) = hero.position();

    enemies.with_lock(|enemies| {
        let mut nearest: Option<(&Arc<Enemy>, f64)> = None;
        for enemy in enemies.iter().filter(|enemy| !enemy.is_dead()) {
            let (x, y) = enemy.position();
            let distance = (((x - hero_x) as f64).powi(2) + ((y - hero_y) as f64).powi(2)).sqrt();
            if distance >= range {
                continue;
            }
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((enemy, distance));
            }
        }
        nearest.map(|(enemy, _)| enemy.clone())
    })
}

/// Random live enemy within `radius` Manhattan distance of the hero
pub fn pick_random_in_radius<R: Rng + ?Sized>(
    enemies: &SyncList<Arc<Enemy>>,
    hero: &Hero,
    radius: i32,
    rng: &mut R,
) -> Option<Arc<Enemy>> {
    let (hero_x, hero_y) = hero.position();
    let candidates = enemies.filter(|enemy| {
        let (x, y) = enemy.position();
        !enemy.is_dead() && (x - hero_x).abs() + (y - hero_y).abs() <= radius
    });
    candidates.choose(rng).cloned()
}

pub fn select_target<R: Rng + ?Sized>(
    policy: TargetPolicy,
    enemies: &SyncList<Arc<Enemy>>,
    hero: &Hero,
    rng: &mut R,
) -> Option<Arc<Enemy>> {
    match policy {
        TargetPolicy::Nearest { range } => find_nearest_enemy(enemies, hero, range),
        TargetPolicy::RandomInRadius { radius } => pick_random_in_radius(enemies, hero, radius, rng),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeOutcome {
    /// Target survived, or another strike already owns the kill
    Hit { remaining_health: i32 },
    /// This strike killed the target
    Killed(LevelGain),
}

/// Hit `target` for `damage`. On a kill: grant experience, remove the enemy
/// and pause for an upgrade choice if a level was reached.
pub fn strike(world: &World, weapon: UpgradeKind, target: &Arc<Enemy>, damage: i32) -> StrikeOutcome {
    let remaining_health = target.take_damage(damage);
    let (x, y) = target.position();
    world.emit(GameEvent::EnemyHit {
        weapon,
        enemy_id: target.id(),
        x,
        y,
        damage,
        remaining_health,
    });

    if remaining_health > 0 || !target.mark_dead() {
        return StrikeOutcome::Hit { remaining_health };
    }

    let kind = target.kind();
    let gain = world.hero.earn_experience(kind);
    world.enemies.remove(target);
    world.emit(GameEvent::EnemyKilled {
        enemy_id: target.id(),
        kind,
        experience: progression::experience_for(kind),
    });
    debug!("{} killed {} {}", weapon.name(), kind.name(), target.id());

    world.begin_upgrade_pause(gain);
    StrikeOutcome::Killed(gain)
}

/// Attack loop of one weapon instance. Exits when the hero dies or is
/// stopped, or when `cancel` fires.
pub async fn weapon_loop(world: Arc<World>, kind: UpgradeKind, stats: WeaponStats, cancel: StopSignal) {
    let Some(policy) = TargetPolicy::for_kind(kind, world.field(), &world.config.weapons) else {
        warn!("{} has no targeting policy, attack loop not started", kind.name());
        return;
    };

    let hero = world.hero.clone();
    let mut rng = StdRng::from_entropy();

    while !hero.is_dead() && !hero.is_stopped() && !cancel.is_stopped() {
        if !cancel.sleep_either(hero.halt(), stats.attack_speed()).await || hero.is_dead() {
            break;
        }

        if let Some(target) = select_target(policy, &world.enemies, &hero, &mut rng) {
            strike(&world, kind, &target, stats.overall_damage());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use survivors_shared::EnemyKind;
    use tokio::sync::mpsc;

    use crate::clock::GameClock;
    use crate::config::EngineConfig;
    use crate::tasks::TaskKind;

    fn test_world() -> (Arc<World>, mpsc::Receiver<GameEvent>) {
        let (tx, rx) = mpsc::channel(256);
        let world = World::new(Arc::new(EngineConfig::default()), Arc::new(GameClock::new()), tx);
        (Arc::new(world), rx)
    }

    fn zombie(id: u64, x: i32, y: i32) -> Arc<Enemy> {
        Arc::new(Enemy::new(id, EnemyKind::Zombie, 20, x, y, 1, 3, 300))
    }

    #[test]
    fn test_policies_from_field() {
        let field = FieldSize { width: 160, height: 62 };
        let weapons = WeaponConfig::default();
        assert_eq!(
            TargetPolicy::for_kind(UpgradeKind::Whip, field, &weapons),
            Some(TargetPolicy::Nearest { range: 64.0 })
        );
        assert_eq!(
            TargetPolicy::for_kind(UpgradeKind::Lightning, field, &weapons),
            Some(TargetPolicy::RandomInRadius { radius: 43 })
        );
        assert_eq!(TargetPolicy::for_kind(UpgradeKind::OakRoot, field, &weapons), None);
    }

    #[test]
    fn test_find_nearest_enemy() {
        let hero = Hero::new("TestHero", 100, 50, 50, 10, 10);
        let enemies = SyncList::new();
        enemies.add(zombie(1, 100, 10));
        enemies.add(zombie(2, 55, 55));
        enemies.add(zombie(3, 100, 50));

        let nearest = find_nearest_enemy(&enemies, &hero, 64.0).unwrap();
        assert_eq!(nearest.id(), 2);
    }

    #[test]
    fn test_nearest_ties_keep_first_and_range_is_strict() {
        let hero = Hero::new("TestHero", 100, 50, 50, 1, 3);
        let enemies = SyncList::new();
        enemies.add(zombie(1, 53, 54));
        enemies.add(zombie(2, 47, 46));
        assert_eq!(find_nearest_enemy(&enemies, &hero, 64.0).map(|e| e.id()), Some(1));

        // Distance 5 is not inside a range of 5
        assert!(find_nearest_enemy(&enemies, &hero, 5.0).is_none());
        assert!(find_nearest_enemy(&SyncList::new(), &hero, 64.0).is_none());
    }

    #[test]
    fn test_nearest_skips_dead() {
        let hero = Hero::new("TestHero", 100, 50, 50, 1, 3);
        let enemies = SyncList::new();
        let close = zombie(1, 51, 50);
        close.mark_dead();
        enemies.add(close);
        enemies.add(zombie(2, 60, 50));
        assert_eq!(find_nearest_enemy(&enemies, &hero, 64.0).map(|e| e.id()), Some(2));
    }

    #[test]
    fn test_random_in_radius_uses_manhattan_distance() {
        let hero = Hero::new("TestHero", 100, 50, 30, 1, 3);
        let enemies = SyncList::new();
        enemies.add(zombie(1, 60, 40)); // 20
        enemies.add(zombie(2, 30, 30)); // 20
        enemies.add(zombie(3, 75, 46)); // 41, outside

        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let target = pick_random_in_radius(&enemies, &hero, 40, &mut rng).unwrap();
            seen.insert(target.id());
        }
        assert_eq!(seen, [1, 2].into_iter().collect());
        assert!(pick_random_in_radius(&enemies, &hero, 10, &mut rng).is_none());
    }

    #[test]
    fn test_double_kill_grants_experience_once() {
        let (world, mut rx) = test_world();
        let target = zombie(1, 10, 10);
        world.enemies.add(target.clone());

        let first = strike(&world, UpgradeKind::Whip, &target, 25);
        let second = strike(&world, UpgradeKind::Lightning, &target, 25);

        assert!(matches!(first, StrikeOutcome::Killed(_)));
        assert_eq!(second, StrikeOutcome::Hit { remaining_health: -30 });
        assert_eq!(world.hero.experience(), 10);
        assert!(world.enemies.is_empty());

        let kills = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|event| matches!(event, GameEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 1);
    }

    #[test]
    fn test_kill_reaching_threshold_pauses_for_upgrade() {
        let (world, mut rx) = test_world();
        world.hero.add_experience(95);
        let target = zombie(1, 10, 10);
        world.enemies.add(target.clone());

        let outcome = strike(&world, UpgradeKind::Whip, &target, 100);
        assert_eq!(outcome, StrikeOutcome::Killed(LevelGain { levels: 1, level: 2 }));
        assert!(world.hero.is_stopped());
        assert_eq!(world.hero.pending_choices(), 1);

        let level_ups: Vec<u32> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter_map(|event| match event {
                GameEvent::LevelUp { level, .. } => Some(level),
                _ => None,
            })
            .collect();
        assert_eq!(level_ups, vec![2]);
    }

    #[tokio::test]
    async fn test_weapon_loop_kills_and_stops_on_cancel() {
        let (world, _rx) = test_world();
        let (x, y) = world.hero.position();
        world.enemies.add(zombie(1, x + 3, y));

        let cancel = StopSignal::new();
        let stats = WeaponStats::new(50, 5);
        world.tasks.spawn(
            TaskKind::Weapon(1),
            weapon_loop(world.clone(), UpgradeKind::Whip, stats, cancel.clone()),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(world.enemies.is_empty());
        assert_eq!(world.hero.experience(), 10);

        cancel.stop();
        tokio::time::timeout(Duration::from_secs(5), world.tasks.join_all())
            .await
            .unwrap();
        assert!(!world.hero.is_stopped());
    }
}
