//! Creatures of the Delve dungeon and the engine driving their behavior.
//!
//! A creature is a tick listener. Each tick it advances its materializer,
//! counts its cooldowns down, and then either attacks the party, tracks it
//! along a route from the pathfinding oracle, or patrols at random. All map
//! mutations go through the occupancy manager of the cells involved.
//!
//! # Modules
//!
//! - [`error`] -- Error types for creature operations ([`CreatureError`])
//! - [`stats`] -- Per-type stat records and the [`Bestiary`] that loads them
//! - [`materializer`] -- Static and randomly flickering tangibility
//! - [`perception`] -- Sight, hearing and reach
//! - [`combat`] -- Damage rolls
//! - [`target`] -- The party contract and a minimal party
//! - [`creature`] -- The creature itself and its per-tick behavior

pub mod combat;
pub mod creature;
pub mod error;
pub mod materializer;
pub mod perception;
pub mod stats;
pub mod target;

pub use creature::{Creature, Habitat, SharedCreature};
pub use error::CreatureError;
pub use materializer::{Materializer, RandomMaterializer, StaticMaterializer};
pub use stats::{Bestiary, Capabilities, CreatureStats};
pub use target::{Attack, SharedTarget, SimpleParty, Target};
