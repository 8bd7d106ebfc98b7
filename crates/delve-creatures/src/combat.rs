//! Damage rolls against creatures.

use delve_types::AttackType;
use rand::Rng;

use crate::stats::CreatureStats;

/// Smallest damage of a regular hit.
pub const MIN_DAMAGE: u32 = 1;

/// Largest damage of a regular hit.
pub const MAX_DAMAGE: u32 = 5;

/// Damage multiplier of a critical hit.
pub const CRITICAL_MULTIPLIER: u32 = 3;

/// Roll the damage an attack of `attack_type` would deal to a creature of this type.
///
/// Invincible types take nothing, magic-immune types take nothing from
/// magic, critical hits triple the roll.
pub fn roll_damage<R: Rng + ?Sized>(stats: &CreatureStats, attack_type: AttackType, rng: &mut R) -> u32 {
    let caps = stats.capabilities;
    if caps.invincible || (attack_type == AttackType::Magic && caps.magic_immune) {
        return 0;
    }

    let roll = rng.random_range(MIN_DAMAGE..=MAX_DAMAGE);
    match attack_type {
        AttackType::Critical => roll.saturating_mul(CRITICAL_MULTIPLIER),
        AttackType::None
        | AttackType::Fire
        | AttackType::Normal
        | AttackType::Sharp
        | AttackType::Magic
        | AttackType::Psychic => roll,
    }
}
