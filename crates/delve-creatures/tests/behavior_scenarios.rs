//! End-to-end creature behavior driven through a real scheduler: tracking,
//! attack cadence, pursuit fallbacks, flickering and damage.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use delve_core::{Scheduler, TickListener};
use delve_creatures::{
    Bestiary, Creature, CreatureError, Habitat, Materializer, RandomMaterializer, SharedTarget,
    SimpleParty,
};
use delve_types::{
    AttackType, CreatureId, CreatureState, Direction, Footprint, Height, Materiality, Position,
};
use delve_world::{AStarPathFinder, DungeonMap, GridMap, Occupant, SharedMap};
use parking_lot::Mutex;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BESTIARY: &str = r"
- name: cave_troll
  footprint: four
  height: giant
  base_health: 80
  move_duration: 4
  attack_duration: 6
  attack_power: 12
  sight_range: 3
  awareness: 1
- name: wisp
  footprint: four
  height: small
  base_health: 20
  move_duration: 255
  attack_duration: 4
  attack_power: 3
  attack_type: magic
  capabilities:
    flickers: true
- name: gremlin
  footprint: one
  height: small
  base_health: 12
  move_duration: 2
  attack_duration: 2
  attack_power: 2
  awareness: 3
- name: lich
  footprint: four
  height: medium
  base_health: 60
  move_duration: 8
  attack_duration: 8
  attack_power: 30
  capabilities:
    invincible: true
    magic_immune: true
- name: hex_mage
  footprint: four
  height: medium
  base_health: 40
  move_duration: 4
  attack_duration: 6
  attack_power: 10
  attack_type: magic
  sight_range: 3
  spell_range: 2
  capabilities:
    casts_spells: true
- name: cave_listener
  footprint: four
  height: medium
  base_health: 30
  move_duration: 4
  attack_duration: 4
  attack_power: 5
  awareness: 4
";

const CORRIDOR: [&str; 3] = ["######", "#....#", "######"];

struct World {
    map: SharedMap,
    party: Arc<Mutex<SimpleParty>>,
    habitat: Habitat,
    bestiary: Bestiary,
}

fn world(rows: &[&str], party_at: Position) -> World {
    let map: SharedMap = Arc::new(Mutex::new(GridMap::from_rows(1, rows).unwrap()));
    let party = Arc::new(Mutex::new(SimpleParty::new(party_at, 1_000)));
    let target: SharedTarget = party.clone();
    let habitat = Habitat {
        map: Arc::clone(&map),
        path_finder: Arc::new(AStarPathFinder),
        target,
    };
    World {
        map,
        party,
        habitat,
        bestiary: Bestiary::parse(BESTIARY).unwrap(),
    }
}

fn spawn(world: &World, kind: &str, seed: u64) -> Creature {
    Creature::spawn(
        world.bestiary.get(kind).unwrap(),
        1,
        world.habitat.clone(),
        StdRng::seed_from_u64(seed),
    )
    .unwrap()
}

#[test]
fn tracking_creature_closes_in_once_per_move_cooldown() {
    let world = world(&CORRIDOR, Position::new(4, 1, 1));
    let mut troll = spawn(&world, "cave_troll", 1).facing(Direction::East);
    troll.place_at(Position::new(1, 1, 1)).unwrap();
    let troll = troll.into_shared();

    let scheduler = Scheduler::new();
    scheduler.register(troll.clone());

    scheduler.tick_n(3).unwrap();
    assert_eq!(troll.lock().position(), Some(Position::new(1, 1, 1)));

    scheduler.tick().unwrap();
    {
        let troll = troll.lock();
        assert_eq!(troll.position(), Some(Position::new(2, 1, 1)));
        assert_eq!(troll.direction(), Direction::East);
        assert_eq!(troll.move_cooldown(), 4);
        assert_eq!(troll.state(), CreatureState::Tracking);
    }

    let map = world.map.lock();
    assert!(map.cell(1, 1).unwrap().occupancy().is_empty());
    assert!(map.cell(2, 1).unwrap().occupancy().contains(troll.lock().id()));
    assert_eq!(world.party.lock().attacks_received(), 0);
}

#[test]
fn attacks_follow_the_attack_cooldown() {
    let world = world(&CORRIDOR, Position::new(2, 1, 1));
    let mut troll = spawn(&world, "cave_troll", 2).facing(Direction::North);
    troll.place_at(Position::new(1, 1, 1)).unwrap();
    let troll = troll.into_shared();

    let scheduler = Scheduler::new();
    scheduler.register(troll.clone());

    scheduler.tick().unwrap();
    assert_eq!(world.party.lock().attacks_received(), 1);
    assert_eq!(troll.lock().direction(), Direction::East);
    assert_eq!(troll.lock().state(), CreatureState::Attacking);

    for _ in 2..=6 {
        scheduler.tick().unwrap();
        assert_eq!(world.party.lock().attacks_received(), 1);
    }

    scheduler.tick().unwrap();
    let party = world.party.lock();
    assert_eq!(party.attacks_received(), 2);
    assert_eq!(party.health(), 976);
    assert_eq!(party.last_attack().unwrap().attack_type, AttackType::Normal);
    // The party's own cell is never entered.
    assert_eq!(troll.lock().position(), Some(Position::new(1, 1, 1)));
}

#[test]
fn casters_step_into_range_and_strike_in_the_same_tick() {
    let world = world(&CORRIDOR, Position::new(4, 1, 1));
    let mut mage = spawn(&world, "hex_mage", 7).facing(Direction::East);
    mage.place_at(Position::new(1, 1, 1)).unwrap();
    let mage = mage.into_shared();

    let scheduler = Scheduler::new();
    scheduler.register(mage.clone());

    // Three cells away is out of spell range, and the move is not ready yet.
    scheduler.tick_n(3).unwrap();
    assert_eq!(world.party.lock().attacks_received(), 0);
    assert_eq!(mage.lock().position(), Some(Position::new(1, 1, 1)));

    scheduler.tick().unwrap();
    {
        let mage = mage.lock();
        assert_eq!(mage.position(), Some(Position::new(2, 1, 1)));
        assert_eq!(mage.state(), CreatureState::Attacking);
        assert_eq!(mage.move_cooldown(), 4);
        assert_eq!(mage.attack_cooldown(), 6);
    }
    let party = world.party.lock();
    assert_eq!(party.attacks_received(), 1);
    assert_eq!(party.last_attack().unwrap().attack_type, AttackType::Magic);
    assert_eq!(party.health(), 990);
}

#[test]
fn unreachable_party_falls_back_to_patrol() {
    // Two sealed rooms; the creature hears the party through the wall.
    let rows = ["#######", "#..#..#", "#######"];
    let world = world(&rows, Position::new(4, 1, 1));
    let mut listener = spawn(&world, "cave_listener", 8);
    listener.place_at(Position::new(2, 1, 1)).unwrap();
    let listener = listener.into_shared();

    let scheduler = Scheduler::new();
    scheduler.register(listener.clone());
    scheduler.tick_n(4).unwrap();

    let listener = listener.lock();
    assert_eq!(listener.position(), Some(Position::new(1, 1, 1)));
    assert_eq!(listener.state(), CreatureState::Patrolling);
    assert_eq!(listener.move_cooldown(), 4);
    assert_eq!(world.party.lock().attacks_received(), 0);
}

#[test]
fn crowded_route_holds_position_without_spending_the_move() {
    let world = world(&CORRIDOR, Position::new(4, 1, 1));
    world
        .map
        .lock()
        .cell_mut(2, 1)
        .unwrap()
        .enter(
            Occupant {
                id: CreatureId::new(),
                footprint: Footprint::One,
                height: Height::Small,
            },
            Materiality::Material,
            None,
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();

    let mut troll = spawn(&world, "cave_troll", 9).facing(Direction::East);
    troll.place_at(Position::new(1, 1, 1)).unwrap();
    let troll = troll.into_shared();

    let scheduler = Scheduler::new();
    scheduler.register(troll.clone());
    for _ in 0..8 {
        scheduler.tick().unwrap();
        let troll = troll.lock();
        assert_eq!(troll.position(), Some(Position::new(1, 1, 1)));
        assert_eq!(troll.state(), CreatureState::Idle);
    }
    assert_eq!(troll.lock().move_cooldown(), 0);
    assert_eq!(world.party.lock().attacks_received(), 0);
}

#[test]
fn flicker_phases_follow_the_seeded_stream() {
    let seed = 99;
    let mut replay = StdRng::seed_from_u64(seed);
    let mut materializer = RandomMaterializer::new("wisp", StdRng::seed_from_u64(seed)).unwrap();

    let mut expected = Materiality::Material;
    for _ in 0..5 {
        let phase: u32 = replay.random_range(6..=18);
        assert!((6..=18).contains(&phase));
        for _ in 1..phase {
            materializer.on_tick();
            assert_eq!(materializer.materiality(), expected);
        }
        materializer.on_tick();
        expected = expected.flipped();
        assert_eq!(materializer.materiality(), expected);
    }
}

#[test]
fn flickering_creatures_change_materiality_while_ticking() {
    let world = world(&CORRIDOR, Position::new(4, 1, 9));
    let mut wisp = spawn(&world, "wisp", 5);
    wisp.place_at(Position::new(1, 1, 1)).unwrap();
    assert_eq!(wisp.materiality(), Materiality::Material);

    let mut flips = 0_u32;
    let mut last = wisp.materiality();
    for _ in 0..60 {
        wisp.on_tick();
        if wisp.materiality() != last {
            flips = flips.saturating_add(1);
            last = wisp.materiality();
        }
    }
    // Phases last 6 to 18 ticks, so 60 ticks hold between 3 and 10 flips.
    assert!((3..=10).contains(&flips));
    assert_eq!(wisp.position(), Some(Position::new(1, 1, 1)));
}

#[test]
fn small_creatures_keep_listening_without_moving() {
    let world = world(&CORRIDOR, Position::new(3, 1, 1));
    let mut gremlin = spawn(&world, "gremlin", 3);
    gremlin.place_at(Position::new(1, 1, 1)).unwrap();
    assert!(matches!(
        gremlin.step(),
        Err(CreatureError::UnsupportedFootprint { .. })
    ));
    let gremlin = gremlin.into_shared();

    let scheduler = Scheduler::new();
    scheduler.register(gremlin.clone());
    scheduler.tick_n(10).unwrap();

    assert!(scheduler.is_registered(&(gremlin.clone() as delve_core::SharedListener)));
    assert_eq!(gremlin.lock().position(), Some(Position::new(1, 1, 1)));
    assert_eq!(world.party.lock().attacks_received(), 0);
}

#[test]
fn dead_creatures_leave_the_map_and_the_scheduler() {
    let world = world(&CORRIDOR, Position::new(4, 1, 9));
    let mut troll = spawn(&world, "cave_troll", 4);
    troll.place_at(Position::new(3, 1, 1)).unwrap();
    while troll.is_alive() {
        troll.hit(AttackType::Critical);
    }
    let troll = troll.into_shared();

    let scheduler = Scheduler::new();
    scheduler.register(troll.clone());
    scheduler.tick_n(2).unwrap();

    assert_eq!(scheduler.listener_count(), 0);
    assert_eq!(troll.lock().position(), None);
    assert!(world.map.lock().cell(3, 1).unwrap().occupancy().is_empty());
}

#[test]
fn patrol_never_enters_the_party_cell() {
    let rows = ["#####", "#...#", "#####"];
    // Blind and deaf to the party, so only patrol moves it.
    let world = world(&rows, Position::new(3, 1, 1));
    let mut lich = spawn(&world, "lich", 6);
    lich.place_at(Position::new(1, 1, 1)).unwrap();
    let lich = lich.into_shared();

    let scheduler = Scheduler::new();
    scheduler.register(lich.clone());
    for _ in 0..80 {
        scheduler.tick().unwrap();
        let position = lich.lock().position().unwrap();
        assert_ne!(position, Position::new(3, 1, 1));
    }
}

proptest! {
    #[test]
    fn damage_never_exceeds_health(seed in any::<u64>(), hits in 1_usize..40) {
        let world = world(&CORRIDOR, Position::new(4, 1, 9));
        let mut troll = spawn(&world, "cave_troll", seed);
        let mut taken = 0_u32;
        for _ in 0..hits {
            let damage = troll.hit(AttackType::Critical);
            prop_assert!(damage <= 15);
            taken = taken.saturating_add(damage);
        }
        prop_assert_eq!(troll.health(), troll.max_health().saturating_sub(taken));
    }

    #[test]
    fn protected_creatures_shrug_off_what_they_resist(seed in any::<u64>()) {
        let world = world(&CORRIDOR, Position::new(4, 1, 9));
        let mut lich = spawn(&world, "lich", seed);
        prop_assert_eq!(lich.hit(AttackType::Magic), 0);
        prop_assert_eq!(lich.hit(AttackType::Normal), 0);
        prop_assert_eq!(lich.health(), lich.max_health());

        let mut troll = spawn(&world, "cave_troll", seed);
        let damage = troll.hit(AttackType::Magic);
        prop_assert!((1..=5).contains(&damage));
    }
}
