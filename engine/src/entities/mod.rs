//! World entities: the hero, enemies, rocks and upgrades.

mod enemy;
pub mod hero;
mod rock;
mod upgrade;

pub use enemy::Enemy;
pub use hero::{DamageOutcome, Hero};
pub use rock::Rock;
pub use upgrade::{Upgrade, UpgradeEffect, WeaponStats};

/// Axis-aligned rectangle in grid units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        let apart_x = other.x + other.width <= self.x || self.x + self.width <= other.x;
        let apart_y = other.y + other.height <= self.y || self.y + self.height <= other.y;
        !(apart_x || apart_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap() {
        let hero = Rect::new(50, 50, 10, 10);
        assert!(hero.overlaps(&Rect::new(46, 46, 10, 10)));
        assert!(hero.overlaps(&Rect::new(59, 59, 1, 1)));

        // Touching edges
        assert!(!hero.overlaps(&Rect::new(40, 50, 10, 10)));
        assert!(!hero.overlaps(&Rect::new(50, 60, 10, 10)));
        assert!(!hero.overlaps(&Rect::new(0, 0, 3, 3)));
    }
}
