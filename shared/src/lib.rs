pub mod entities;
pub mod events;
pub mod upgrades;

pub use entities::*;
pub use events::*;
pub use upgrades::*;
