//! Engine binary for the Delve dungeon simulation.
//!
//! Wires the tick scheduler, the level, the party and the configured
//! creatures together, then lets the dungeon run in real time.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `delve-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Build the level from its ASCII rows
//! 4. Load the bestiary and place the party
//! 5. Spawn and register the configured creatures
//! 6. Start the scheduler and wait for a stop condition
//! 7. Stop the scheduler and log a summary

mod budget;
mod error;
mod spawner;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use delve_core::config::{LoggingConfig, SimulationConfig};
use delve_core::{Scheduler, shared};
use delve_creatures::{Bestiary, Habitat, SharedTarget, SimpleParty};
use delve_types::Position;
use delve_world::{AStarPathFinder, GridMap};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Notify;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::budget::TickBudget;
use crate::error::EngineError;

const CONFIG_PATH: &str = "delve-config.yaml";

/// Why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndReason {
    TickBudget,
    TimeBudget,
    Interrupted,
}

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step fails or the scheduler
/// cannot be started or stopped.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("delve-engine starting");
    if !from_file {
        info!("Config file not found, using defaults");
    }
    info!(
        seed = config.simulation.seed,
        ticks_per_second = config.scheduler.ticks_per_second,
        max_ticks = config.simulation.max_ticks,
        max_real_time_seconds = config.simulation.max_real_time_seconds,
        spawns = config.spawns.len(),
        "Configuration loaded"
    );

    // 3. Build the level.
    let z = config.level.z;
    let level = GridMap::from_rows(z, &config.level.rows).map_err(EngineError::from)?;
    info!(
        level = z,
        width = level.width(),
        height = level.height(),
        "Level built"
    );
    let map = Arc::new(Mutex::new(level));

    // 4. Load the bestiary and place the party.
    let bestiary = Bestiary::from_file(Path::new(&config.bestiary_path))
        .map_err(EngineError::from)
        .with_context(|| format!("loading bestiary {}", config.bestiary_path))?;
    info!(kinds = bestiary.len(), path = config.bestiary_path, "Bestiary loaded");

    let party_at = Position::new(config.party.x, config.party.y, z);
    let party = Arc::new(Mutex::new(SimpleParty::new(party_at, config.party.health)));
    let target: SharedTarget = party.clone();
    let habitat = Habitat {
        map: map.clone(),
        path_finder: Arc::new(AStarPathFinder),
        target,
    };
    info!(position = %party_at, health = config.party.health, "Party placed");

    // 5. Spawn and register creatures.
    let mut rng = StdRng::seed_from_u64(config.simulation.seed);
    let creatures = spawner::spawn_creatures(&config.spawns, z, &bestiary, &habitat, &mut rng)?;

    let scheduler = Scheduler::with_rate(config.scheduler.ticks_per_second).map_err(EngineError::from)?;
    let budget_exhausted = Arc::new(Notify::new());
    if config.simulation.max_ticks > 0 {
        scheduler.register(shared(TickBudget::new(
            config.simulation.max_ticks,
            Arc::clone(&budget_exhausted),
        )));
    }
    for creature in &creatures {
        scheduler.register(creature.clone());
    }
    info!(creatures = creatures.len(), "Creatures registered");

    // 6. Run until a stop condition.
    scheduler.start().map_err(EngineError::from)?;
    let reason = wait_for_end(&config, &budget_exhausted).await;

    // 7. Stop and summarize.
    scheduler.stop().map_err(EngineError::from)?;
    let ticks = scheduler.tick_id().saturating_sub(1);
    let alive = creatures.iter().filter(|creature| creature.lock().is_alive()).count();
    {
        let party = party.lock();
        info!(
            end_reason = ?reason,
            total_ticks = ticks,
            creatures_alive = alive,
            party_health = party.health(),
            attacks_received = party.attacks_received(),
            missed_ticks = scheduler.missed_ticks(),
            "Simulation ended"
        );
    }
    for row in map.lock().render() {
        info!(target: "delve_engine::map", "{row}");
    }

    info!("delve-engine shutdown complete");
    Ok(())
}

/// Load the configuration from [`CONFIG_PATH`], reporting whether the file existed.
fn load_config() -> Result<(SimulationConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        let config = SimulationConfig::from_file(config_path)?;
        Ok((config, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Wait for the tick budget, the wall-clock budget or Ctrl-C, whichever comes first.
///
/// A budget of zero means no limit.
async fn wait_for_end(config: &SimulationConfig, budget_exhausted: &Notify) -> EndReason {
    let max_ticks = config.simulation.max_ticks;
    let max_seconds = config.simulation.max_real_time_seconds;

    let tick_budget = async {
        if max_ticks == 0 {
            std::future::pending::<()>().await;
        }
        budget_exhausted.notified().await;
    };
    let time_budget = async {
        if max_seconds == 0 {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(Duration::from_secs(max_seconds)).await;
    };

    tokio::select! {
        () = tick_budget => EndReason::TickBudget,
        () = time_budget => EndReason::TimeBudget,
        result = tokio::signal::ctrl_c() => {
            if let Err(error) = result {
                tracing::warn!(%error, "Failed to listen for Ctrl-C");
            }
            EndReason::Interrupted
        }
    }
}
