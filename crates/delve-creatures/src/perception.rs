//! Sight, hearing and reach.
//!
//! A creature perceives the party when the party stands in its sight cone
//! or within its hearing radius. Neither sense crosses levels. Walls do not
//! block either sense.

use delve_types::{Direction, Position};

use crate::stats::CreatureStats;

/// Whether `target` lies in the sight cone of a creature at `from` facing `facing`.
pub fn can_see(stats: &CreatureStats, from: Position, facing: Direction, target: Position) -> bool {
    from.same_level(target) && from.visible_from(facing, stats.sight_range).contains(&target)
}

/// Whether `target` lies within hearing distance of a creature at `from`.
pub fn can_hear(stats: &CreatureStats, from: Position, target: Position) -> bool {
    from.same_level(target) && from.surrounding(stats.awareness).contains(&target)
}

/// Whether the creature sees or hears `target`.
pub fn perceives(stats: &CreatureStats, from: Position, facing: Direction, target: Position) -> bool {
    can_see(stats, from, facing, target) || can_hear(stats, from, target)
}

/// Whether `target` is within attack reach: orthogonal, same level, within range.
pub fn can_attack(stats: &CreatureStats, from: Position, target: Position) -> bool {
    from.same_level(target) && from.attackable(stats.attack_range()).contains(&target)
}
