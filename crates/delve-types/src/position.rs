//! Grid positions and the geometry used by perception and pursuit.
//!
//! All helpers here are pure: they enumerate candidate positions without
//! knowing whether those positions exist on a map. Callers intersect the
//! results with the level they are standing on.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::compass::Direction;

/// A cell coordinate: column `x`, row `y`, level `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column, growing eastward.
    pub x: i32,
    /// Row, growing southward.
    pub y: i32,
    /// Dungeon level.
    pub z: i32,
}

impl Position {
    /// Create a position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The position shifted by `(dx, dy)` on the same level.
    pub const fn shifted(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z,
        }
    }

    /// The neighbouring position one step in `direction`.
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        self.shifted(dx, dy)
    }

    /// Whether both positions are on the same dungeon level.
    pub const fn same_level(self, other: Self) -> bool {
        self.z == other.z
    }

    /// Manhattan distance on the `x`/`y` plane, ignoring levels.
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
    }

    /// Every position within `radius` cells, excluding this one.
    ///
    /// A cell `(dx, dy)` is included when `dx² + dy² <= (radius + ½)²`,
    /// which gives the eight neighbours for a radius of 1 and a rounded
    /// disc for larger radii. A radius of 0 yields nothing.
    pub fn surrounding(self, radius: u8) -> Vec<Self> {
        let reach = i32::from(radius);
        // (2r + 1)² compared against 4(dx² + dy²) keeps everything integral.
        let diameter = i64::from(reach).saturating_mul(2).saturating_add(1);
        let limit = diameter.saturating_mul(diameter);

        let mut positions = Vec::new();
        for dy in 0_i32.saturating_sub(reach)..=reach {
            for dx in 0_i32.saturating_sub(reach)..=reach {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let squared = squared_length(dx, dy).saturating_mul(4);
                if squared <= limit {
                    positions.push(self.shifted(dx, dy));
                }
            }
        }
        positions
    }

    /// The cone of positions seen when facing `facing` with the given depth.
    ///
    /// Row `d` ahead (1-based) spans `1 + (d - 1) / 2` cells to each side,
    /// so a depth of 3 covers 3 + 3 + 5 = 11 cells.
    pub fn visible_from(self, facing: Direction, depth: u8) -> Vec<Self> {
        let (ahead_x, ahead_y) = facing.offset();
        let (side_x, side_y) = facing.turn_right().offset();

        let mut positions = Vec::new();
        for distance in 1..=i32::from(depth) {
            let half_width = distance.saturating_sub(1).saturating_div(2).saturating_add(1);
            let row = self.shifted(
                ahead_x.saturating_mul(distance),
                ahead_y.saturating_mul(distance),
            );
            for lateral in 0_i32.saturating_sub(half_width)..=half_width {
                positions.push(row.shifted(
                    side_x.saturating_mul(lateral),
                    side_y.saturating_mul(lateral),
                ));
            }
        }
        positions
    }

    /// Positions in straight orthogonal lines up to `range` cells away.
    pub fn attackable(self, range: u8) -> Vec<Self> {
        let mut positions = Vec::new();
        for distance in 1..=i32::from(range) {
            for direction in Direction::ALL {
                let (dx, dy) = direction.offset();
                positions.push(self.shifted(dx.saturating_mul(distance), dy.saturating_mul(distance)));
            }
        }
        positions
    }

    /// The direction to face in order to look at `target`.
    ///
    /// Aligned targets give the obvious cardinal direction. Otherwise the
    /// axis with the larger distance wins, and an exact diagonal is broken
    /// at random. Returns `None` when `target` is this very cell.
    pub fn direction_towards<R: Rng + ?Sized>(self, target: Self, rng: &mut R) -> Option<Direction> {
        let dx = target.x.saturating_sub(self.x);
        let dy = target.y.saturating_sub(self.y);

        let horizontal = if dx > 0 { Direction::East } else { Direction::West };
        let vertical = if dy > 0 { Direction::South } else { Direction::North };

        match (dx == 0, dy == 0) {
            (true, true) => None,
            (true, false) => Some(vertical),
            (false, true) => Some(horizontal),
            (false, false) => {
                let (across, along) = (dx.unsigned_abs(), dy.unsigned_abs());
                if across > along {
                    Some(horizontal)
                } else if along > across {
                    Some(vertical)
                } else if rng.random_bool(0.5) {
                    Some(horizontal)
                } else {
                    Some(vertical)
                }
            }
        }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

fn squared_length(dx: i32, dy: i32) -> i64 {
    let (dx, dy) = (i64::from(dx), i64::from(dy));
    dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
}
