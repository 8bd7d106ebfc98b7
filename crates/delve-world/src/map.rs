//! The map contract creatures consume, and a grid-backed implementation.

use std::sync::Arc;

use delve_types::{CellKind, Position};
use parking_lot::Mutex;

use crate::cell::Cell;
use crate::error::WorldError;

/// One dungeon level, as seen by creatures.
pub trait DungeonMap: Send {
    /// The level number (`z`) of every cell on this map.
    fn level(&self) -> i32;

    /// The cell at `(x, y)`, if it exists.
    fn cell(&self, x: i32, y: i32) -> Option<&Cell>;

    /// Mutable access to the cell at `(x, y)`, if it exists.
    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell>;

    /// The cell at `position`, if it is on this level.
    fn cell_at(&self, position: Position) -> Option<&Cell> {
        if position.z == self.level() {
            self.cell(position.x, position.y)
        } else {
            None
        }
    }

    /// Mutable access to the cell at `position`, if it is on this level.
    fn cell_at_mut(&mut self, position: Position) -> Option<&mut Cell> {
        if position.z == self.level() {
            self.cell_mut(position.x, position.y)
        } else {
            None
        }
    }
}

/// A map shared between creatures and whoever built it.
pub type SharedMap = Arc<Mutex<dyn DungeonMap>>;

/// A rectangular level stored row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    level: i32,
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl GridMap {
    /// Build a level from ASCII rows.
    ///
    /// `#` is a wall, `.` floor, `>` stairs, `*` a teleporter and `O` a pit.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidLayout`] if the rows are empty, ragged,
    /// too large, or contain an unknown glyph.
    pub fn from_rows<S: AsRef<str>>(level: i32, rows: &[S]) -> Result<Self, WorldError> {
        let width = rows.first().map_or(0, |row| row.as_ref().chars().count());
        if width == 0 {
            return Err(WorldError::InvalidLayout {
                reason: "a level needs at least one cell".to_owned(),
            });
        }

        let mut cells = Vec::with_capacity(width.saturating_mul(rows.len()));
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(WorldError::InvalidLayout {
                    reason: format!("row {y} is not {width} cells wide"),
                });
            }
            let y = coordinate(y)?;
            for (x, glyph) in row.chars().enumerate() {
                let kind = CellKind::from_glyph(glyph).ok_or_else(|| WorldError::InvalidLayout {
                    reason: format!("unknown glyph {glyph:?} in row {y}"),
                })?;
                cells.push(Cell::new(Position::new(coordinate(x)?, y, level), kind));
            }
        }

        Ok(Self {
            level,
            width,
            height: rows.len(),
            cells,
        })
    }

    /// Number of columns.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Draw the level, marking occupied cells with `C`.
    pub fn render(&self) -> Vec<String> {
        self.cells
            .chunks(self.width)
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        if cell.occupancy().is_empty() {
                            cell.kind().glyph()
                        } else {
                            'C'
                        }
                    })
                    .collect()
            })
            .collect()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        y.checked_mul(self.width)?.checked_add(x)
    }
}

impl DungeonMap for GridMap {
    fn level(&self) -> i32 {
        self.level
    }

    fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.cells.get(self.index(x, y)?)
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        let index = self.index(x, y)?;
        self.cells.get_mut(index)
    }
}

fn coordinate(value: usize) -> Result<i32, WorldError> {
    i32::try_from(value).map_err(|source| WorldError::InvalidLayout {
        reason: format!("coordinate {value} does not fit the grid: {source}"),
    })
}
