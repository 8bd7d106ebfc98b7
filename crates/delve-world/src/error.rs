//! Error types for the `delve-world` crate.
//!
//! Placement errors are integration errors: they mean a caller tried to
//! break a packing invariant and are surfaced immediately.

use delve_types::{CellKind, CreatureId, Footprint, Position, Sector};

use crate::occupancy::Placement;

/// Errors that can occur during placement and map operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A requested sector already holds another creature.
    #[error("sector {sector} is held by creature {holder}")]
    SectorOccupied {
        /// The contested sector.
        sector: Sector,
        /// The creature holding it.
        holder: CreatureId,
    },

    /// A whole-cell creature was placed on a cell that is not empty.
    #[error("cell already hosts {occupants} creature(s)")]
    CellOccupied {
        /// Number of distinct creatures on the cell.
        occupants: usize,
    },

    /// Not enough free sectors remain for the footprint.
    #[error("{footprint} needs more room than the {free} free sector(s)")]
    InsufficientRoom {
        /// The footprint that did not fit.
        footprint: Footprint,
        /// Number of free sectors.
        free: usize,
    },

    /// Exactly two sectors are free but they sit on a diagonal.
    #[error("the two free sectors are not edge-adjacent")]
    NoAdjacentPair,

    /// The placement shape does not match the creature's footprint.
    #[error("creature {id} has {footprint}, which cannot use {placement}")]
    FootprintMismatch {
        /// The creature.
        id: CreatureId,
        /// Its footprint.
        footprint: Footprint,
        /// The placement it was paired with.
        placement: Placement,
    },

    /// A sector or side lookup was asked of a creature with the wrong footprint.
    #[error("creature {id} has {footprint}, expected {expected}")]
    WrongFootprint {
        /// The creature.
        id: CreatureId,
        /// Its footprint.
        footprint: Footprint,
        /// The footprint the query works with.
        expected: Footprint,
    },

    /// The creature is already on this cell.
    #[error("creature {0} is already on this cell")]
    AlreadyPresent(CreatureId),

    /// The creature is not on this cell at all.
    #[error("creature {0} is not on this cell")]
    NotPresent(CreatureId),

    /// The creature is on this cell, but not where the caller said.
    #[error("creature {id} does not hold {placement}")]
    NotAtPlacement {
        /// The creature.
        id: CreatureId,
        /// The placement it does not hold.
        placement: Placement,
    },

    /// Creatures of this materiality cannot enter the cell.
    #[error("cell {position} ({kind:?}) cannot be entered")]
    NotTraversable {
        /// The cell position.
        position: Position,
        /// The cell kind.
        kind: CellKind,
    },

    /// No cell exists at the position.
    #[error("no cell at {0}")]
    CellNotFound(Position),

    /// A level layout could not be parsed.
    #[error("invalid level layout: {reason}")]
    InvalidLayout {
        /// Explanation of what is wrong.
        reason: String,
    },
}
