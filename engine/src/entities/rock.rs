//! Static obstacle that scrolls with the world.

use survivors_shared::RockView;

/// A rock on the field. Purely positional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rock {
    pub x: i32,
    pub y: i32,
}

impl Rock {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn shift(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    pub fn view(&self) -> RockView {
        RockView { x: self.x, y: self.y }
    }
}
