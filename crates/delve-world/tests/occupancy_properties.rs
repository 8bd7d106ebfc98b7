//! Property tests for sector packing: whatever sequence of placements and
//! removals is attempted, a cell never breaks its packing rules.

#![allow(clippy::unwrap_used)]

use delve_types::{CreatureId, Footprint, Height, Sector};
use delve_world::{OccupancyManager, Occupant, Placement};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Debug, Clone)]
enum Op {
    Add(Footprint),
    Remove(usize),
}

fn footprint() -> impl Strategy<Value = Footprint> {
    prop_oneof![
        Just(Footprint::One),
        Just(Footprint::Two),
        Just(Footprint::Four)
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => footprint().prop_map(Op::Add),
        1 => (0_usize..8).prop_map(Op::Remove),
    ]
}

fn assert_packing(cell: &OccupancyManager, placed: &[(Occupant, Placement)]) {
    let claimed: usize = placed
        .iter()
        .map(|(occupant, _)| usize::from(occupant.footprint.sectors()))
        .sum();
    assert_eq!(cell.occupied_sectors().len(), claimed);
    assert_eq!(cell.occupant_count(), placed.len());

    for (occupant, placement) in placed {
        assert_eq!(cell.placement_of(occupant.id), Some(*placement));
        if occupant.footprint == Footprint::Four {
            assert_eq!(placed.len(), 1, "a whole-cell creature never shares");
        }
        if let Placement::Side(direction) = placement {
            let [a, b] = Sector::side(*direction);
            assert!(a.is_adjacent_to(b));
        }
    }
}

proptest! {
    #[test]
    fn packing_rules_hold(seed in any::<u64>(), ops in prop::collection::vec(op(), 1..40)) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut cell = OccupancyManager::new();
        let mut placed: Vec<(Occupant, Placement)> = Vec::new();

        for op in ops {
            match op {
                Op::Add(footprint) => {
                    let occupant = Occupant {
                        id: CreatureId::new(),
                        footprint,
                        height: Height::Medium,
                    };
                    let could_host = cell.can_host(footprint);
                    match cell.add(occupant, &mut rng) {
                        Ok(placement) => {
                            prop_assert!(could_host);
                            placed.push((occupant, placement));
                        }
                        Err(_) => prop_assert!(!could_host),
                    }
                }
                Op::Remove(index) => {
                    if placed.is_empty() {
                        continue;
                    }
                    let (occupant, placement) = placed.remove(index % placed.len());
                    let free_before = cell.free_room();
                    prop_assert_eq!(cell.remove(occupant.id).unwrap(), placement);
                    prop_assert_eq!(
                        cell.free_room(),
                        free_before + usize::from(occupant.footprint.sectors())
                    );
                }
            }
            assert_packing(&cell, &placed);
        }

        for (occupant, _) in placed.drain(..) {
            cell.remove(occupant.id).unwrap();
        }
        prop_assert!(cell.is_empty());
        prop_assert_eq!(cell.tallest_height(), None);
    }
}
