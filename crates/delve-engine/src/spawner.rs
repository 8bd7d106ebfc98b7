//! Creature spawner for populating the level at startup.
//!
//! Each configured spawn is looked up in the bestiary, given its own RNG
//! stream derived from the master seed, and placed on its cell. Spawning
//! onto the party's cell is refused.

use delve_core::config::SpawnConfig;
use delve_creatures::{Bestiary, Creature, Habitat, SharedCreature};
use delve_types::Position;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::error::EngineError;

/// Spawn and place every configured creature on level `z`.
///
/// # Errors
///
/// Returns [`EngineError::Spawner`] if a spawn targets the party's cell,
/// and [`EngineError::Creature`] for unknown kinds, invalid multipliers,
/// or cells that cannot take the creature.
pub fn spawn_creatures(
    spawns: &[SpawnConfig],
    z: i32,
    bestiary: &Bestiary,
    habitat: &Habitat,
    rng: &mut StdRng,
) -> Result<Vec<SharedCreature>, EngineError> {
    let party = habitat.target.lock().position();
    let mut creatures = Vec::with_capacity(spawns.len());

    for spawn in spawns {
        let position = Position::new(spawn.x, spawn.y, z);
        if position == party {
            return Err(EngineError::Spawner {
                message: format!("{} cannot spawn on the party at {position}", spawn.kind),
            });
        }

        let stats = bestiary.get(&spawn.kind)?;
        let mut creature = Creature::spawn(
            stats,
            spawn.multiplier,
            habitat.clone(),
            StdRng::from_rng(rng),
        )?
        .facing(spawn.direction);
        let placement = creature.place_at(position)?;

        info!(
            creature = %creature.id(),
            kind = spawn.kind,
            %position,
            %placement,
            health = creature.health(),
            "Creature spawned"
        );
        creatures.push(creature.into_shared());
    }

    Ok(creatures)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use delve_creatures::{SharedTarget, SimpleParty};
    use delve_types::Direction;
    use delve_world::{AStarPathFinder, DungeonMap, GridMap, SharedMap};
    use parking_lot::Mutex;

    use super::*;

    const BESTIARY: &str = r"
- name: ogre
  footprint: four
  height: giant
  base_health: 50
  move_duration: 6
  attack_duration: 6
  attack_power: 15
- name: rat
  footprint: one
  height: small
  base_health: 8
  move_duration: 2
  attack_duration: 2
  attack_power: 1
";

    fn setup() -> (SharedMap, Habitat, Bestiary) {
        let map: SharedMap = Arc::new(Mutex::new(
            GridMap::from_rows(2, &["#####", "#...#", "#####"]).unwrap(),
        ));
        let target: SharedTarget = Arc::new(Mutex::new(SimpleParty::new(Position::new(3, 1, 2), 100)));
        let habitat = Habitat {
            map: Arc::clone(&map),
            path_finder: Arc::new(AStarPathFinder),
            target,
        };
        (map, habitat, Bestiary::parse(BESTIARY).unwrap())
    }

    fn spawn(kind: &str, x: i32, direction: Direction) -> SpawnConfig {
        SpawnConfig {
            kind: kind.to_owned(),
            x,
            y: 1,
            multiplier: 1,
            direction,
        }
    }

    #[test]
    fn spawns_are_placed_and_facing() {
        let (map, habitat, bestiary) = setup();
        let spawns = [spawn("ogre", 1, Direction::East), spawn("rat", 2, Direction::South)];
        let mut rng = StdRng::seed_from_u64(3);

        let creatures = spawn_creatures(&spawns, 2, &bestiary, &habitat, &mut rng).unwrap();
        assert_eq!(creatures.len(), 2);

        let ogre = creatures.first().unwrap().lock();
        assert_eq!(ogre.position(), Some(Position::new(1, 1, 2)));
        assert_eq!(ogre.direction(), Direction::East);

        let map = map.lock();
        assert_eq!(map.cell(1, 1).unwrap().occupancy().free_room(), 0);
        assert_eq!(map.cell(2, 1).unwrap().occupancy().free_room(), 3);
    }

    #[test]
    fn party_cell_is_refused() {
        let (_, habitat, bestiary) = setup();
        let mut rng = StdRng::seed_from_u64(3);
        let result = spawn_creatures(
            &[spawn("ogre", 3, Direction::North)],
            2,
            &bestiary,
            &habitat,
            &mut rng,
        );
        assert!(matches!(result, Err(EngineError::Spawner { .. })));
    }

    #[test]
    fn unknown_kinds_and_walls_are_errors() {
        let (_, habitat, bestiary) = setup();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            spawn_creatures(&[spawn("dragon", 1, Direction::North)], 2, &bestiary, &habitat, &mut rng),
            Err(EngineError::Creature { .. })
        ));
        assert!(matches!(
            spawn_creatures(&[spawn("ogre", 0, Direction::North)], 2, &bestiary, &habitat, &mut rng),
            Err(EngineError::Creature { .. })
        ));
    }

    #[test]
    fn same_seed_gives_same_creatures() {
        let health = |seed| {
            let (_, habitat, bestiary) = setup();
            let mut rng = StdRng::seed_from_u64(seed);
            let creatures =
                spawn_creatures(&[spawn("ogre", 1, Direction::North)], 2, &bestiary, &habitat, &mut rng)
                    .unwrap();
            let health = creatures.first().unwrap().lock().health();
            health
        };
        assert_eq!(health(11), health(11));
    }
}
