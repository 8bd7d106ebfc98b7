//! Shared type definitions for the Delve dungeon simulation.
//!
//! Everything the scheduler, the map and the creature engine need to agree
//! on lives here: identifiers, compass directions, cell sectors, creature
//! size classes and the grid geometry used by perception.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`compass`] -- Directions and the four sectors of a map cell
//! - [`enums`] -- Footprints, heights, materiality, attack types, states, cell kinds
//! - [`position`] -- Grid positions and the geometry of sight, hearing and reach

pub mod compass;
pub mod enums;
pub mod ids;
pub mod position;

pub use compass::{Direction, Sector};
pub use enums::{AttackType, CellKind, CreatureState, Footprint, Height, Materiality};
pub use ids::{CreatureId, ItemId};
pub use position::Position;
