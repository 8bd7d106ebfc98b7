//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup so `main` can
//! propagate them with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: delve_core::config::ConfigError,
    },

    /// The scheduler refused an operation.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// The underlying scheduler error.
        #[from]
        source: delve_core::SchedulerError,
    },

    /// Building the level or placing something on it failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: delve_world::WorldError,
    },

    /// Loading stats or spawning a creature failed.
    #[error("creature error: {source}")]
    Creature {
        /// The underlying creature error.
        #[from]
        source: delve_creatures::CreatureError,
    },

    /// A spawn entry cannot be honoured.
    #[error("spawner error: {message}")]
    Spawner {
        /// Description of the spawner failure.
        message: String,
    },
}
