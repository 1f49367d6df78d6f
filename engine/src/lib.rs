//! Vampire Survivors style simulation engine.
//!
//! A session runs the enemy spawner, one movement loop per enemy and one
//! attack loop per weapon on the tokio worker pool. Presentation layers
//! receive `GameEvent`s over a channel and read `WorldSnapshot`s.

pub mod clock;
pub mod combat;
pub mod config;
pub mod entities;
pub mod error;
pub mod movement;
pub mod persistence;
pub mod progression;
pub mod session;
pub mod signal;
pub mod sync_list;
pub mod tasks;
pub mod world;

pub use clock::GameClock;
pub use config::{EngineConfig, FieldSize, CONFIG_ENV_VAR};
pub use error::EngineError;
pub use progression::AddedUpgrade;
pub use session::Session;
pub use sync_list::SyncList;
