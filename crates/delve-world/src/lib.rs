//! Map-side collaborators of the Delve creature engine.
//!
//! Creatures never own the cells they stand on. Each [`Cell`] owns an
//! [`OccupancyManager`] holding non-owning references to its occupants, and
//! every move goes through that manager so the packing rules hold at all
//! times.
//!
//! # Modules
//!
//! - [`error`] -- Error types for placement and map construction
//! - [`occupancy`] -- Sector packing of variable-footprint creatures within one cell
//! - [`cell`] -- A map cell: position, kind, occupancy
//! - [`map`] -- The map contract consumed by creatures, and a grid implementation
//! - [`pathfinding`] -- The route oracle contract and an A* implementation

pub mod cell;
pub mod error;
pub mod map;
pub mod occupancy;
pub mod pathfinding;

pub use cell::Cell;
pub use error::WorldError;
pub use map::{DungeonMap, GridMap, SharedMap};
pub use occupancy::{OccupancyManager, Occupant, Placement};
pub use pathfinding::{AStarPathFinder, PathFinder};
