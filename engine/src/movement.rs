//! Enemy movement and contact damage.

use std::sync::Arc;

use survivors_shared::GameEvent;

use crate::entities::{DamageOutcome, Enemy, Hero};
use crate::world::World;

/// Step `enemy` one unit toward the hero on each axis, then apply contact
/// damage if their boxes overlap. Returns the damage dealt and its outcome.
pub fn move_enemy_towards_player(enemy: &Enemy, hero: &Hero, step: i32) -> Option<(i32, DamageOutcome)> {
    let (hero_x, hero_y) = hero.position();
    let (x, y) = enemy.position();
    enemy.shift((hero_x - x).signum() * step, (hero_y - y).signum() * step);

    if !enemy.bounds().overlaps(&hero.bounds()) {
        return None;
    }

    let damage = enemy.kind().contact_damage();
    Some((damage, hero.apply_damage(damage)))
}

/// Movement loop of one enemy. Exits when the enemy dies or the hero is
/// stopped; a resume starts a fresh loop.
pub async fn movement_loop(world: Arc<World>, enemy: Arc<Enemy>) {
    let hero = world.hero.clone();
    let step = world.field().step();

    while !enemy.is_dead() && !hero.is_stopped() {
        if !hero.halt().sleep(enemy.speed()).await || enemy.is_dead() {
            break;
        }

        let Some((damage, outcome)) = move_enemy_towards_player(&enemy, &hero, step) else {
            continue;
        };

        match outcome {
            DamageOutcome::Survived(hero_health) => {
                world.emit(GameEvent::HeroContact {
                    enemy_id: enemy.id(),
                    kind: enemy.kind(),
                    damage,
                    hero_health,
                });
            }
            DamageOutcome::Died => {
                world.emit(GameEvent::HeroContact {
                    enemy_id: enemy.id(),
                    kind: enemy.kind(),
                    damage,
                    hero_health: hero.health(),
                });
                world.handle_hero_death();
                break;
            }
            DamageOutcome::AlreadyDead => break,
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

    #[test]
    fn test_zombie_contact_costs_exactly_ten() {
        let hero = Hero::new("Vlad", 100, 50, 50, 10, 10);
        let zombie = Enemy::new(1, EnemyKind::Zombie, 20, 45, 45, 10, 10, 300);

        let result = move_enemy_towards_player(&zombie, &hero, 1);
        assert_eq!(result, Some((10, DamageOutcome::Survived(90))));
        assert_eq!(hero.health(), 90);
        assert_eq!(zombie.position(), (46, 46));
    }

    #[test]
    fn test_contact_constants_per_kind() {
        for (kind, damage) in [
            (EnemyKind::Zombie, 10),
            (EnemyKind::Skeleton, 15),
            (EnemyKind::Spider, 5),
            (EnemyKind::Golem, 30),
        ] {
            let hero = Hero::new("Vlad", 100, 10, 10, 3, 3);
            let enemy = Enemy::new(1, kind, 10, 10, 10, 3, 3, 300);
            move_enemy_towards_player(&enemy, &hero, 1);
            assert_eq!(hero.health(), 100 - damage, "{:?}", kind);

            // Damage repeats on every overlapping tick
            move_enemy_towards_player(&enemy, &hero, 1);
            assert_eq!(hero.health(), 100 - 2 * damage, "{:?}", kind);
        }
    }

    #[test]
    fn test_step_is_per_axis_sign() {
        let hero = Hero::new("Vlad", 100, 80, 31, 1, 3);

        let enemy = Enemy::new(1, EnemyKind::Spider, 15, 0, 0, 2, 2, 200);
        assert_eq!(move_enemy_towards_player(&enemy, &hero, 2), None);
        assert_eq!(enemy.position(), (2, 2));

        let enemy = Enemy::new(2, EnemyKind::Spider, 15, 150, 31, 2, 2, 200);
        move_enemy_towards_player(&enemy, &hero, 1);
        assert_eq!(enemy.position(), (149, 31));
        assert_eq!(hero.health(), 100);
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let hero = Hero::new("Vlad", 100, 10, 10, 2, 2);
        // After one step the golem's right edge sits on the hero's left edge
        let golem = Enemy::new(1, EnemyKind::Golem, 100, 6, 10, 3, 3, 400);
        assert_eq!(move_enemy_towards_player(&golem, &hero, 1), None);
        assert_eq!(hero.health(), 100);
    }

    #[tokio::test]
    async fn test_loop_kills_hero_and_reports_death() {
        let mut config = EngineConfig::default();
        config.hero.max_health = 20;
        let (tx, mut rx) = mpsc::channel(64);
        let world = Arc::new(World::new(Arc::new(config), Arc::new(GameClock::new()), tx));
        world.clock.start();

        let (x, y) = world.hero.position();
        let golem = Arc::new(Enemy::new(1, EnemyKind::Golem, 100, x, y, 3, 3, 5));
        world.enemies.add(golem.clone());
        world.start_movement(golem);

        tokio::time::timeout(Duration::from_secs(5), world.tasks.join_all())
            .await
            .unwrap();

        assert!(world.hero.is_dead());
        assert!(world.hero.is_stopped());

        let mut died = false;
        while let Ok(event) = rx.try_recv() {
            if let GameEvent::HeroDied { .. } = event {
                died = true;
            }
        }
        assert!(died);
    }

    #[tokio::test]
    async fn test_loop_exits_when_hero_stopped() {
        let (tx, _rx) = mpsc::channel(64);
        let world = Arc::new(World::new(
            Arc::new(EngineConfig::default()),
            Arc::new(GameClock::new()),
            tx,
        ));
        let zombie = Arc::new(Enemy::new(1, EnemyKind::Zombie, 20, -10, -10, 1, 3, 10_000));
        world.start_movement(zombie.clone());

        world.hero.halt().stop();
        tokio::time::timeout(Duration::from_secs(5), world.tasks.join_all())
            .await
            .unwrap();
        assert_eq!(zombie.position(), (-10, -10));
    }
}
