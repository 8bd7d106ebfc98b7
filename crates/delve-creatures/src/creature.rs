//! The creature behavior engine.
//!
//! Every tick a creature:
//!
//! 1. advances its materializer;
//! 2. counts its move and attack cooldowns down;
//! 3. attacks the party if an attack is ready and the party is in reach;
//! 4. otherwise, if a move is ready, steps along a route toward a perceived
//!    party (attacking straight away if that brought it in reach), or
//!    patrols to a random neighbouring cell.
//!
//! Attacking ends the tick, so a creature never attacks and then moves.
//! Moving and then attacking within one tick is allowed.
//!
//! Only whole-cell (footprint-4) creatures act; smaller ones still flicker
//! but otherwise stand still.

use std::fmt;
use std::sync::Arc;

use delve_core::{TickListener, TickResponse};
use delve_types::{
    AttackType, CellKind, CreatureId, CreatureState, Direction, Footprint, ItemId, Materiality,
    Position,
};
use delve_world::{DungeonMap, Occupant, PathFinder, Placement, SharedMap, WorldError};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

use crate::combat;
use crate::error::CreatureError;
use crate::materializer::{Materializer, RandomMaterializer, StaticMaterializer};
use crate::perception;
use crate::stats::CreatureStats;
use crate::target::{Attack, SharedTarget};

/// A creature shared between the scheduler and the code that spawned it.
pub type SharedCreature = Arc<Mutex<Creature>>;

/// Everything outside the creature that its behavior consults.
#[derive(Clone)]
pub struct Habitat {
    /// The level the creature lives on.
    pub map: SharedMap,
    /// Route oracle used when tracking.
    pub path_finder: Arc<dyn PathFinder>,
    /// The party.
    pub target: SharedTarget,
}

impl fmt::Debug for Habitat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Habitat").finish_non_exhaustive()
    }
}

/// Outcome of one tracking step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pursuit {
    /// Moved one cell along the route.
    Stepped(Position),
    /// A route exists but the next cell is the party's or is full.
    Blocked,
    /// The oracle found no route.
    NoRoute,
}

/// One monster roaming the dungeon.
#[derive(Debug)]
pub struct Creature {
    id: CreatureId,
    stats: Arc<CreatureStats>,
    direction: Direction,
    state: CreatureState,
    position: Option<Position>,
    health: u32,
    max_health: u32,
    items: Vec<ItemId>,
    move_cooldown: u32,
    attack_cooldown: u32,
    materializer: Box<dyn Materializer>,
    habitat: Habitat,
    rng: StdRng,
    warned_unsupported: bool,
}

impl Creature {
    /// Create a creature of type `stats`, not yet placed on the map.
    ///
    /// Health is `multiplier * base_health` plus a random bonus of up to a
    /// quarter of `base_health`. The move cooldown starts full, the attack
    /// cooldown empty. All randomness comes from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureError::InvalidMultiplier`] if `multiplier` is zero
    /// and [`CreatureError::HealthOverflow`] if the health does not fit.
    pub fn spawn(
        stats: Arc<CreatureStats>,
        multiplier: u32,
        habitat: Habitat,
        mut rng: StdRng,
    ) -> Result<Self, CreatureError> {
        if multiplier == 0 {
            return Err(CreatureError::InvalidMultiplier {
                kind: stats.name.clone(),
            });
        }

        let bonus = rng.random_range(0..=stats.base_health.checked_div(4).unwrap_or(0));
        let health = stats
            .base_health
            .checked_mul(multiplier)
            .and_then(|health| health.checked_add(bonus))
            .ok_or_else(|| CreatureError::HealthOverflow {
                kind: stats.name.clone(),
                multiplier,
            })?;

        let id = CreatureId::new();
        let materializer: Box<dyn Materializer> = if stats.capabilities.flickers {
            let label = format!("{} {id}", stats.name);
            Box::new(RandomMaterializer::new(label, StdRng::from_rng(&mut rng))?)
        } else {
            Box::new(StaticMaterializer::new(stats.materiality))
        };

        debug!(creature = %id, kind = %stats.name, health, "Creature spawned");
        Ok(Self {
            id,
            direction: Direction::North,
            state: CreatureState::Idle,
            position: None,
            health,
            max_health: health,
            items: Vec::new(),
            move_cooldown: u32::from(stats.move_duration),
            attack_cooldown: 0,
            materializer,
            habitat,
            rng,
            warned_unsupported: false,
            stats,
        })
    }

    /// Set the initial facing.
    #[must_use]
    pub const fn facing(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Wrap the creature so it can be registered with a scheduler.
    pub fn into_shared(self) -> SharedCreature {
        Arc::new(Mutex::new(self))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Unique id.
    pub const fn id(&self) -> CreatureId {
        self.id
    }

    /// Type record.
    pub fn stats(&self) -> &CreatureStats {
        &self.stats
    }

    /// Current facing.
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Current behavior state.
    pub const fn state(&self) -> CreatureState {
        self.state
    }

    /// Cell the creature stands on, if placed.
    pub const fn position(&self) -> Option<Position> {
        self.position
    }

    /// Remaining hit points.
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Hit points at spawn.
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Whether the creature still has hit points.
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Ticks until the creature may move again.
    pub const fn move_cooldown(&self) -> u32 {
        self.move_cooldown
    }

    /// Ticks until the creature may attack again.
    pub const fn attack_cooldown(&self) -> u32 {
        self.attack_cooldown
    }

    /// Current tangibility.
    pub fn materiality(&self) -> Materiality {
        self.materializer.materiality()
    }

    /// Items absorbed so far.
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// The occupancy footprint of this creature.
    pub fn occupant(&self) -> Occupant {
        Occupant {
            id: self.id,
            footprint: self.stats.footprint,
            height: self.stats.height,
        }
    }

    // -----------------------------------------------------------------------
    // Map presence
    // -----------------------------------------------------------------------

    /// Put the creature on the cell at `position`, wherever it fits there.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureError::AlreadyPlaced`] if the creature is on the map
    /// already, and [`CreatureError::World`] if the cell is missing, cannot
    /// be entered, or lacks room.
    pub fn place_at(&mut self, position: Position) -> Result<Placement, CreatureError> {
        if let Some(current) = self.position {
            return Err(CreatureError::AlreadyPlaced {
                id: self.id,
                position: current,
            });
        }

        let occupant = self.occupant();
        let materiality = self.materiality();
        let map = Arc::clone(&self.habitat.map);
        let mut map = map.lock();
        let cell = map
            .cell_at_mut(position)
            .ok_or(WorldError::CellNotFound(position))?;
        let placement = cell.enter(occupant, materiality, None, &mut self.rng)?;

        self.position = Some(position);
        info!(creature = %self.id, kind = %self.stats.name, %position, %placement, "Creature placed");
        Ok(placement)
    }

    /// Take the creature off the map, returning where it stood.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureError::World`] if the map no longer agrees with the
    /// creature about where it stands.
    pub fn remove_from_map(&mut self) -> Result<Option<Placement>, CreatureError> {
        let Some(position) = self.position else {
            return Ok(None);
        };

        let map = Arc::clone(&self.habitat.map);
        let mut map = map.lock();
        let cell = map
            .cell_at_mut(position)
            .ok_or(WorldError::CellNotFound(position))?;
        let placement = cell.leave(self.id)?;

        self.position = None;
        Ok(Some(placement))
    }

    // -----------------------------------------------------------------------
    // Damage and items
    // -----------------------------------------------------------------------

    /// Apply an attack of `attack_type`, returning the damage actually taken.
    ///
    /// Health never drops below zero. A dead creature takes no damage.
    pub fn hit(&mut self, attack_type: AttackType) -> u32 {
        if !self.is_alive() {
            return 0;
        }

        let rolled = combat::roll_damage(&self.stats, attack_type, &mut self.rng);
        let applied = rolled.min(self.health);
        self.health = self.health.saturating_sub(applied);

        debug!(creature = %self.id, ?attack_type, applied, health = self.health, "Creature hit");
        if !self.is_alive() {
            info!(creature = %self.id, kind = %self.stats.name, "Creature died");
        }
        applied
    }

    /// Absorb an item. Returns `false` if the type does not absorb items or
    /// the creature is dead.
    pub fn absorb_item(&mut self, item: ItemId) -> bool {
        if !self.is_alive() || !self.stats.capabilities.absorbs_items {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Hand over every absorbed item, once the creature is dead.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureError::StillAlive`] while the creature lives.
    pub fn drop_items(&mut self) -> Result<Vec<ItemId>, CreatureError> {
        if self.is_alive() {
            return Err(CreatureError::StillAlive(self.id));
        }
        Ok(std::mem::take(&mut self.items))
    }

    // -----------------------------------------------------------------------
    // Behavior
    // -----------------------------------------------------------------------

    /// Run one tick of behavior.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureError::UnsupportedFootprint`] for creatures smaller
    /// than a whole cell (after advancing their materializer), and
    /// [`CreatureError::World`] when the map rejects a move the creature
    /// had checked was possible.
    pub fn step(&mut self) -> Result<TickResponse, CreatureError> {
        if !self.is_alive() {
            if let Some(placement) = self.remove_from_map()? {
                debug!(creature = %self.id, %placement, "Dead creature left the map");
            }
            return Ok(TickResponse::StopListening);
        }

        self.materializer.on_tick();

        if self.stats.footprint != Footprint::Four {
            return Err(CreatureError::UnsupportedFootprint {
                id: self.id,
                footprint: self.stats.footprint,
            });
        }

        self.move_cooldown = self.move_cooldown.saturating_sub(1);
        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);

        let Some(position) = self.position else {
            return Ok(TickResponse::KeepListening);
        };

        let (target, target_alive) = {
            let party = self.habitat.target.lock();
            (party.position(), party.is_alive())
        };

        if target_alive && self.attack_ready() && perception::can_attack(&self.stats, position, target) {
            self.attack(position, target);
            return Ok(TickResponse::KeepListening);
        }

        if !self.move_ready() {
            return Ok(TickResponse::KeepListening);
        }

        if target_alive && perception::perceives(&self.stats, position, self.direction, target) {
            match self.track(position, target)? {
                Pursuit::Stepped(reached) => {
                    if self.attack_ready() && perception::can_attack(&self.stats, reached, target) {
                        self.attack(reached, target);
                    }
                    return Ok(TickResponse::KeepListening);
                }
                Pursuit::Blocked => return Ok(TickResponse::KeepListening),
                Pursuit::NoRoute => {}
            }
        }

        self.patrol(position, target)?;
        Ok(TickResponse::KeepListening)
    }

    const fn attack_ready(&self) -> bool {
        self.attack_cooldown == 0
    }

    fn move_ready(&self) -> bool {
        self.move_cooldown == 0 && self.stats.can_move()
    }

    fn face(&mut self, from: Position, towards: Position) {
        if let Some(direction) = from.direction_towards(towards, &mut self.rng) {
            self.direction = direction;
        }
    }

    fn attack(&mut self, from: Position, target: Position) {
        self.face(from, target);
        let attack = Attack {
            attacker: self.id,
            attack_type: self.stats.attack_type,
            power: self.stats.attack_power,
            poison: self.stats.poison,
        };
        self.habitat.target.lock().receive_attack(&attack);

        self.attack_cooldown = u32::from(self.stats.attack_duration);
        self.state = CreatureState::Attacking;
        debug!(creature = %self.id, from = %from, %target, "Creature attacked");
    }

    fn track(&mut self, from: Position, target: Position) -> Result<Pursuit, CreatureError> {
        let materiality = self.materiality();
        let map = Arc::clone(&self.habitat.map);
        let mut map = map.lock();

        let Some(route) = self.habitat.path_finder.find_path(
            &*map,
            (target.x, target.y),
            (from.x, from.y),
            materiality,
        ) else {
            debug!(creature = %self.id, %from, %target, "No route to target");
            return Ok(Pursuit::NoRoute);
        };

        let Some(&next) = route.get(1) else {
            return Ok(Pursuit::Blocked);
        };
        let has_room = map
            .cell_at(next)
            .is_some_and(|cell| cell.can_host(self.stats.footprint));
        if next == target || !has_room {
            return Ok(Pursuit::Blocked);
        }

        self.relocate(&mut *map, from, next)?;
        self.state = CreatureState::Tracking;
        Ok(Pursuit::Stepped(next))
    }

    fn patrol(&mut self, from: Position, target: Position) -> Result<(), CreatureError> {
        let materiality = self.materiality();
        let stats = Arc::clone(&self.stats);
        let map = Arc::clone(&self.habitat.map);
        let mut map = map.lock();

        let candidates: Vec<Position> = from
            .surrounding(1)
            .into_iter()
            .filter(|candidate| *candidate != target)
            .filter(|candidate| {
                map.cell_at(*candidate).is_some_and(|cell| {
                    let allowed = match cell.kind() {
                        CellKind::Stairs => stats.capabilities.takes_stairs,
                        CellKind::Teleporter => stats.capabilities.teleports,
                        CellKind::Floor | CellKind::Wall | CellKind::Pit => true,
                    };
                    allowed && cell.is_traversable(materiality) && cell.can_host(stats.footprint)
                })
            })
            .collect();

        let Some(&destination) = candidates.choose(&mut self.rng) else {
            debug!(creature = %self.id, %from, "Nowhere to patrol");
            return Ok(());
        };

        if self.state == CreatureState::Idle {
            self.state = CreatureState::Patrolling;
        }
        self.relocate(&mut *map, from, destination)
    }

    /// Move from `from` to the neighbouring `to`, facing the move.
    fn relocate(
        &mut self,
        map: &mut dyn DungeonMap,
        from: Position,
        to: Position,
    ) -> Result<(), CreatureError> {
        self.face(from, to);
        let occupant = self.occupant();
        let materiality = self.materiality();

        let placement = map
            .cell_at_mut(from)
            .ok_or(WorldError::CellNotFound(from))?
            .leave(self.id)?;

        let entered = match map.cell_at_mut(to) {
            Some(cell) => cell.enter(occupant, materiality, None, &mut self.rng),
            None => Err(WorldError::CellNotFound(to)),
        };
        if let Err(error) = entered {
            // Put the creature back where it was before reporting.
            if let Some(cell) = map.cell_at_mut(from) {
                cell.enter(occupant, materiality, Some(placement), &mut self.rng)?;
            }
            return Err(error.into());
        }

        self.position = Some(to);
        self.move_cooldown = u32::from(self.stats.move_duration);
        debug!(creature = %self.id, %from, %to, direction = %self.direction, "Creature moved");
        Ok(())
    }
}

impl TickListener for Creature {
    fn on_tick(&mut self) -> TickResponse {
        match self.step() {
            Ok(response) => response,
            Err(CreatureError::UnsupportedFootprint { id, footprint }) => {
                if !self.warned_unsupported {
                    warn!(creature = %id, %footprint, "Creature cannot act with this footprint");
                    self.warned_unsupported = true;
                }
                TickResponse::KeepListening
            }
            Err(error) => {
                error!(creature = %self.id, %error, "Creature behavior failed; it stops listening");
                TickResponse::StopListening
            }
        }
    }
}
