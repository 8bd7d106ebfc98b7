//! Error types for the `delve-creatures` crate.

use delve_core::DelayError;
use delve_types::{CreatureId, Footprint, Position};
use delve_world::WorldError;

/// Errors that can occur while loading, spawning or running creatures.
#[derive(Debug, thiserror::Error)]
pub enum CreatureError {
    /// A creature was spawned with a zero health multiplier.
    #[error("{kind} needs a positive health multiplier")]
    InvalidMultiplier {
        /// Name of the creature type.
        kind: String,
    },

    /// Spawn health does not fit the health counter.
    #[error("{kind} health overflows with multiplier {multiplier}")]
    HealthOverflow {
        /// Name of the creature type.
        kind: String,
        /// The multiplier that overflowed.
        multiplier: u32,
    },

    /// Tick behavior is only defined for whole-cell creatures.
    #[error("creature {id} has {footprint}; only whole-cell creatures act")]
    UnsupportedFootprint {
        /// The creature.
        id: CreatureId,
        /// Its footprint.
        footprint: Footprint,
    },

    /// The creature is already standing on the map.
    #[error("creature {id} is already at {position}")]
    AlreadyPlaced {
        /// The creature.
        id: CreatureId,
        /// Where it stands.
        position: Position,
    },

    /// Items can only be dropped by a dead creature.
    #[error("creature {0} is still alive")]
    StillAlive(CreatureId),

    /// A stat record failed validation.
    #[error("invalid stats for {kind}: {reason}")]
    InvalidStats {
        /// Name of the creature type.
        kind: String,
        /// Explanation of what is wrong.
        reason: String,
    },

    /// Two stat records share a name.
    #[error("creature type {0} is defined twice")]
    DuplicateKind(String),

    /// No stat record has this name.
    #[error("unknown creature type {0}")]
    UnknownKind(String),

    /// Failed to read a bestiary file.
    #[error("failed to read bestiary: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse bestiary YAML.
    #[error("failed to parse bestiary YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// A map operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// A delay gate could not be built.
    #[error("delay error: {source}")]
    Delay {
        /// The underlying delay gate error.
        #[from]
        source: DelayError,
    },
}
