//! The party, as creatures see it.

use std::sync::Arc;

use delve_types::{AttackType, CreatureId, Position};
use parking_lot::Mutex;
use tracing::info;

/// One blow delivered by a creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attack {
    /// The attacking creature.
    pub attacker: CreatureId,
    /// Kind of damage.
    pub attack_type: AttackType,
    /// Strength of the blow.
    pub power: u8,
    /// Poison inflicted.
    pub poison: u8,
}

/// What creatures chase and hit.
pub trait Target: Send {
    /// Where the target stands.
    fn position(&self) -> Position;

    /// Whether the target is still worth chasing.
    fn is_alive(&self) -> bool;

    /// Apply an attack.
    fn receive_attack(&mut self, attack: &Attack);
}

/// A target shared between the creatures hunting it.
pub type SharedTarget = Arc<Mutex<dyn Target>>;

/// A bare-bones party: a position and a pool of hit points.
///
/// Keeps a count of the attacks it received and the most recent one, so a
/// long run holds constant memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleParty {
    position: Position,
    health: u32,
    attacks_received: u64,
    last_attack: Option<Attack>,
}

impl SimpleParty {
    /// A party standing at `position` with `health` hit points.
    pub const fn new(position: Position, health: u32) -> Self {
        Self {
            position,
            health,
            attacks_received: 0,
            last_attack: None,
        }
    }

    /// Move the party.
    pub const fn move_to(&mut self, position: Position) {
        self.position = position;
    }

    /// Remaining hit points.
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// How many attacks landed while the party was standing.
    pub const fn attacks_received(&self) -> u64 {
        self.attacks_received
    }

    /// The most recent attack, if any.
    pub const fn last_attack(&self) -> Option<&Attack> {
        self.last_attack.as_ref()
    }
}

impl Target for SimpleParty {
    fn position(&self) -> Position {
        self.position
    }

    fn is_alive(&self) -> bool {
        self.health > 0
    }

    fn receive_attack(&mut self, attack: &Attack) {
        if !self.is_alive() {
            return;
        }
        self.health = self.health.saturating_sub(u32::from(attack.power));
        self.attacks_received = self.attacks_received.saturating_add(1);
        self.last_attack = Some(*attack);
        if self.health == 0 {
            info!(attacker = %attack.attacker, position = %self.position, "Party has fallen");
        }
    }
}
