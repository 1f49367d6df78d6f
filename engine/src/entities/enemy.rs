//! Enemy entity.
//!
//! Enemies are shared between the enemy list, their own movement task and
//! every weapon task, so mutable state sits behind a small mutex and the
//! dead flag is atomic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use survivors_shared::{EnemyKind, EnemyView};

use crate::entities::Rect;
use crate::sync_list::lock;

#[derive(Debug)]
struct EnemyBody {
    x: i32,
    y: i32,
    health: i32,
}

#[derive(Debug)]
pub struct Enemy {
    id: u64,
    kind: EnemyKind,
    width: i32,
    height: i32,
    /// Delay between movement ticks
    speed_ms: u64,
    max_health: i32,
    body: Mutex<EnemyBody>,
    dead: AtomicBool,
}

impl PartialEq for Enemy {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Enemy {
    #[allow(clippy::too_many_arguments)]
    pub fn new(id: u64, kind: EnemyKind, max_health: i32, x: i32, y: i32, width: i32, height: i32, speed_ms: u64) -> Self {
        Self {
            id,
            kind,
            width,
            height,
            speed_ms,
            max_health,
            body: Mutex::new(EnemyBody {
                x,
                y,
                health: max_health,
            }),
            dead: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn speed(&self) -> Duration {
        Duration::from_millis(self.speed_ms)
    }

    pub fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn health(&self) -> i32 {
        lock(&self.body).health
    }

    pub fn position(&self) -> (i32, i32) {
        let body = lock(&self.body);
        (body.x, body.y)
    }

    pub fn shift(&self, dx: i32, dy: i32) {
        let mut body = lock(&self.body);
        body.x += dx;
        body.y += dy;
    }

    pub fn bounds(&self) -> Rect {
        let (x, y) = self.position();
        Rect::new(x, y, self.width, self.height)
    }

    /// Subtract `amount` from health and return what is left.
    /// Zero or less means the enemy must be marked dead and removed.
    pub fn take_damage(&self, amount: i32) -> i32 {
        let mut body = lock(&self.body);
        body.health -= amount;
        body.health
    }

    pub fn is_dead(&self) -> bool {
        self.dead.load(Ordering::SeqCst)
    }

    /// Flag the enemy dead. Only the first caller gets `true` and owns the kill.
    pub fn mark_dead(&self) -> bool {
        !self.dead.swap(true, Ordering::SeqCst)
    }

    pub fn view(&self) -> EnemyView {
        let body = lock(&self.body);
        EnemyView {
            id: self.id,
            kind: self.kind,
            x: body.x,
            y: body.y,
            width: self.width,
            height: self.height,
            health: body.health,
            max_health: self.max_health,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_and_kill_ownership() {
        let zombie = Enemy::new(1, EnemyKind::Zombie, 20, 0, 0, 1, 3, 300);
        assert_eq!(zombie.take_damage(10), 10);
        assert!(!zombie.is_dead());
        assert_eq!(zombie.take_damage(15), -5);

        assert!(zombie.mark_dead());
        assert!(!zombie.mark_dead());
        assert!(zombie.is_dead());
    }

    #[test]
    fn test_equality_by_id() {
        let a = Enemy::new(7, EnemyKind::Golem, 100, 0, 0, 3, 3, 400);
        let b = Enemy::new(7, EnemyKind::Spider, 15, 9, 9, 2, 2, 180);
        let c = Enemy::new(8, EnemyKind::Golem, 100, 0, 0, 3, 3, 400);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_view_reflects_body() {
        let spider = Enemy::new(3, EnemyKind::Spider, 15, 4, 5, 2, 2, 200);
        spider.shift(-1, 2);
        spider.take_damage(5);
        let view = spider.view();
        assert_eq!((view.x, view.y), (3, 7));
        assert_eq!(view.health, 10);
        assert_eq!(view.max_health, 15);
        assert_eq!(spider.speed(), Duration::from_millis(200));
    }
}
