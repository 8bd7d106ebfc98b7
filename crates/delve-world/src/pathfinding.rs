//! The route oracle creatures consult when tracking a target.
//!
//! Creatures only depend on the [`PathFinder`] contract. [`AStarPathFinder`]
//! is the stock oracle: 4-connected A* over the cells a creature of the
//! given materiality can enter, with a Manhattan heuristic.

use std::collections::{BTreeMap, BTreeSet};

use delve_types::{Direction, Materiality, Position};

use crate::map::DungeonMap;

/// Computes routes between two cells of one level.
pub trait PathFinder: Send + Sync {
    /// Route from `start` to `target`, both inclusive, or `None` if unreachable.
    ///
    /// Coordinates are `(x, y)` pairs on `map`'s level. Only cells a
    /// creature of `materiality` can enter are walked through.
    fn find_path(
        &self,
        map: &dyn DungeonMap,
        target: (i32, i32),
        start: (i32, i32),
        materiality: Materiality,
    ) -> Option<Vec<Position>>;
}

/// A* route search over orthogonal neighbours.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStarPathFinder;

impl PathFinder for AStarPathFinder {
    fn find_path(
        &self,
        map: &dyn DungeonMap,
        target: (i32, i32),
        start: (i32, i32),
        materiality: Materiality,
    ) -> Option<Vec<Position>> {
        let level = map.level();
        let start = Position::new(start.0, start.1, level);
        let goal = Position::new(target.0, target.1, level);

        map.cell_at(start)?;
        if !map.cell_at(goal)?.is_traversable(materiality) {
            return None;
        }
        if start == goal {
            return Some(vec![start]);
        }

        // Cost so far per position, and the predecessor for path reconstruction.
        let mut cost: BTreeMap<Position, u32> = BTreeMap::new();
        let mut prev: BTreeMap<Position, Position> = BTreeMap::new();
        // Ordered by (estimated total, cost so far, position): a BTreeSet as min-heap.
        let mut open: BTreeSet<(u32, u32, Position)> = BTreeSet::new();

        cost.insert(start, 0);
        open.insert((start.manhattan_distance(goal), 0, start));

        while let Some((_, current_cost, current)) = open.pop_first() {
            if current == goal {
                break;
            }
            if cost.get(&current).is_some_and(|&best| best < current_cost) {
                continue;
            }
            let Some(next_cost) = current_cost.checked_add(1) else {
                continue;
            };

            for direction in Direction::ALL {
                let neighbour = current.step(direction);
                let walkable = map
                    .cell_at(neighbour)
                    .is_some_and(|cell| cell.is_traversable(materiality));
                if !walkable {
                    continue;
                }

                let is_shorter = cost
                    .get(&neighbour)
                    .is_none_or(|&existing| next_cost < existing);
                if is_shorter {
                    cost.insert(neighbour, next_cost);
                    prev.insert(neighbour, current);
                    let estimate = next_cost.saturating_add(neighbour.manhattan_distance(goal));
                    open.insert((estimate, next_cost, neighbour));
                }
            }
        }

        if !prev.contains_key(&goal) {
            return None;
        }

        let mut path = vec![goal];
        let mut current = goal;
        while let Some(&previous) = prev.get(&current) {
            path.push(previous);
            current = previous;
        }
        path.reverse();
        Some(path)
    }
}
