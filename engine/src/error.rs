//! Engine error type.

use survivors_shared::{EnemyKind, UpgradeKind};
use thiserror::Error;

/// Errors surfaced by the simulation engine.
///
/// Concurrency races (double kills, double removals) and cancellation are
/// not errors and never show up here.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// Requested construction of an upgrade kind that cannot be stored
    #[error("upgrade {0:?} cannot be constructed")]
    InvalidUpgrade(UpgradeKind),

    #[error("upgrade {0:?} is already at max level")]
    MaxLevel(UpgradeKind),

    #[error("no spawn profile for {0:?}")]
    MissingProfile(EnemyKind),

    #[error("session has not started")]
    NotStarted,

    #[error("session is over")]
    SessionOver,

    #[error("session is not waiting for an upgrade choice")]
    NotPaused,

    #[error("session is waiting for an upgrade choice")]
    UpgradePending,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("records store: {0}")]
    Records(String),
}
