//! A single map cell and the occupancy it owns.

use delve_types::{CellKind, CreatureId, Footprint, Materiality, Position};
use rand::Rng;
use tracing::debug;

use crate::error::WorldError;
use crate::occupancy::{OccupancyManager, Occupant, Placement};

/// One square of a dungeon level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    position: Position,
    kind: CellKind,
    occupancy: OccupancyManager,
}

impl Cell {
    /// An empty cell of the given kind.
    pub const fn new(position: Position, kind: CellKind) -> Self {
        Self {
            position,
            kind,
            occupancy: OccupancyManager::new(),
        }
    }

    /// Where the cell is.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// What the cell is.
    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    /// Read access to the creatures on the cell.
    pub const fn occupancy(&self) -> &OccupancyManager {
        &self.occupancy
    }

    /// Whether a creature of the given materiality may enter.
    pub const fn is_traversable(&self, materiality: Materiality) -> bool {
        self.kind.is_traversable(materiality)
    }

    /// Whether a creature of `footprint` would fit.
    pub fn can_host(&self, footprint: Footprint) -> bool {
        self.occupancy.can_host(footprint)
    }

    /// Put a creature on the cell, at `placement` or wherever it fits.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotTraversable`] if the creature cannot enter
    /// this kind of cell, or any placement error of the occupancy manager.
    pub fn enter<R: Rng + ?Sized>(
        &mut self,
        occupant: Occupant,
        materiality: Materiality,
        placement: Option<Placement>,
        rng: &mut R,
    ) -> Result<Placement, WorldError> {
        if !self.is_traversable(materiality) {
            return Err(WorldError::NotTraversable {
                position: self.position,
                kind: self.kind,
            });
        }

        let placement = match placement {
            Some(placement) => {
                self.occupancy.add_at(occupant, placement)?;
                placement
            }
            None => self.occupancy.add(occupant, rng)?,
        };
        debug!(creature = %occupant.id, position = %self.position, %placement, "Creature entered cell");
        Ok(placement)
    }

    /// Take a creature off the cell, returning where it was.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotPresent`] if the creature is not on the cell.
    pub fn leave(&mut self, id: CreatureId) -> Result<Placement, WorldError> {
        let placement = self.occupancy.remove(id)?;
        debug!(creature = %id, position = %self.position, %placement, "Creature left cell");
        Ok(placement)
    }
}
