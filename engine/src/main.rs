//! Headless survivors runner
//!
//! Plays one session with an automatic upgrade picker standing in for the
//! menu, records the survival time and exits when the hero dies.

use log::{error, info, warn};
use survivors_shared::{GameEvent, HighScoreRecord, UpgradeKind};

use survivors_engine::persistence::{self, UpgradeDescriptions};
use survivors_engine::{EngineConfig, Session, CONFIG_ENV_VAR};

/// Load the config named on the command line or in the environment
fn load_config() -> EngineConfig {
    let path = std::env::args().nth(1).or_else(|| std::env::var(CONFIG_ENV_VAR).ok());

    let Some(path) = path else {
        info!("No config given, using defaults");
        return EngineConfig::default();
    };

    match EngineConfig::load_from_json(&path) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            error!("Falling back to the default config");
            EngineConfig::default()
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting survivors...");
    let config = load_config();

    let descriptions = match UpgradeDescriptions::load_from_json(&config.descriptions_path) {
        Ok(descriptions) => descriptions,
        Err(e) => {
            warn!("{}; upgrades will have no descriptions", e);
            UpgradeDescriptions::empty()
        }
    };

    let records = match persistence::init(config.records_path.clone()).await {
        Ok(handle) => Some(handle),
        Err(e) => {
            error!("Failed to open records: {}", e);
            error!("Running without high scores");
            None
        }
    };

    let (session, mut events) = Session::new(config);
    session.start().await;

    while let Some(event) = events.recv().await {
        match event {
            GameEvent::LevelUp { level, offered } => {
                let choice = offered.first().copied().unwrap_or(UpgradeKind::Time);
                let next_level = session.hero().upgrade_level(choice).map_or(1, |level| level + 1);
                info!(
                    "Level {}: picking {} ({})",
                    level,
                    choice.name(),
                    descriptions.describe(choice, next_level).unwrap_or("no description")
                );

                if let Err(e) = session.resume_with_upgrade(choice).await {
                    warn!("Could not apply {}: {}, taking Time instead", choice.name(), e);
                    if let Err(e) = session.resume_with_upgrade(UpgradeKind::Time).await {
                        error!("Could not resume session: {}", e);
                    }
                }
            }
            GameEvent::DifficultyRaised { minute, spawn_interval_ms } => {
                info!("Minute {}: enemies now spawn every {} ms", minute, spawn_interval_ms);
            }
            GameEvent::HeroDied { name, elapsed_seconds } => {
                info!("{} survived {} seconds", name, elapsed_seconds);
                if let Some(records) = &records {
                    records.add_record(HighScoreRecord::new(name, elapsed_seconds));
                }
                break;
            }
            _ => {}
        }
    }

    session.shutdown().await;

    if let Some(records) = records {
        for record in records.read_all().await {
            info!("  {:<16} {:>5}s", record.hero_name, record.time);
        }
        records.shutdown().await;
    }

    info!("Survivors stopped");
}
