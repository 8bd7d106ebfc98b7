//! Compass directions and the four sectors of a map cell.
//!
//! A map cell is split into four quadrants. Creatures occupy one quadrant,
//! one side (two edge-adjacent quadrants) or the whole cell depending on
//! their footprint. The [`Sector::side`] table ties the two concepts
//! together and is the only place that mapping is defined.

use serde::{Deserialize, Serialize};

/// One of the four cardinal directions.
///
/// `y` grows southward, so moving north decreases `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward decreasing `y`.
    North,
    /// Toward increasing `x`.
    East,
    /// Toward increasing `y`.
    South,
    /// Toward decreasing `x`.
    West,
}

impl Direction {
    /// All four directions, clockwise from north.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// The direction pointing the other way.
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// The direction a quarter turn clockwise.
    pub const fn turn_right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// The direction a quarter turn counter-clockwise.
    pub const fn turn_left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::East => Self::North,
            Self::South => Self::East,
            Self::West => Self::South,
        }
    }

    /// Unit grid offset `(dx, dy)` of one step in this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Whether this direction runs along the `x` axis.
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::East | Self::West)
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        };
        f.write_str(name)
    }
}

/// One of the four fixed quadrants of a map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    /// Top-left quadrant.
    NorthWest,
    /// Top-right quadrant.
    NorthEast,
    /// Bottom-left quadrant.
    SouthWest,
    /// Bottom-right quadrant.
    SouthEast,
}

impl Sector {
    /// All four sectors.
    pub const ALL: [Self; 4] = [
        Self::NorthWest,
        Self::NorthEast,
        Self::SouthWest,
        Self::SouthEast,
    ];

    /// The two edge-adjacent sectors forming the given side of a cell.
    pub const fn side(direction: Direction) -> [Self; 2] {
        match direction {
            Direction::North => [Self::NorthEast, Self::NorthWest],
            Direction::South => [Self::SouthEast, Self::SouthWest],
            Direction::West => [Self::NorthWest, Self::SouthWest],
            Direction::East => [Self::NorthEast, Self::SouthEast],
        }
    }

    /// Whether the sector lies in the northern half of the cell.
    pub const fn is_northern(self) -> bool {
        matches!(self, Self::NorthWest | Self::NorthEast)
    }

    /// Whether the sector lies in the western half of the cell.
    pub const fn is_western(self) -> bool {
        matches!(self, Self::NorthWest | Self::SouthWest)
    }

    /// Whether two distinct sectors share an edge.
    ///
    /// Diagonal sectors (north-west and south-east for instance) only touch
    /// at the centre and are not adjacent.
    pub const fn is_adjacent_to(self, other: Self) -> bool {
        let same_row = self.is_northern() == other.is_northern();
        let same_column = self.is_western() == other.is_western();
        same_row != same_column
    }

    /// The side of the cell formed by two sectors, if they are adjacent.
    pub fn side_between(self, other: Self) -> Option<Direction> {
        Direction::ALL.into_iter().find(|direction| {
            let [first, second] = Self::side(*direction);
            (first == self && second == other) || (first == other && second == self)
        })
    }
}

impl core::fmt::Display for Sector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::NorthWest => "north-west",
            Self::NorthEast => "north-east",
            Self::SouthWest => "south-west",
            Self::SouthEast => "south-east",
        };
        f.write_str(name)
    }
}
