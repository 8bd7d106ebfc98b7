//! Sector packing of creatures within a single map cell.
//!
//! A cell has four sectors. A creature claims one sector, one side (two
//! edge-adjacent sectors) or all four, according to its [`Footprint`]. The
//! manager enforces the packing rules:
//!
//! - a footprint-4 creature claims all four sectors at once, never sharing;
//! - a footprint-2 creature claims exactly the two sectors of one side;
//! - a footprint-1 creature claims exactly one sector.
//!
//! The manager is not synchronized on its own. It is only ever mutated from
//! inside a tick notification, which the scheduler runs one at a time.

use std::collections::{BTreeMap, BTreeSet};

use delve_types::{CreatureId, Direction, Footprint, Height, Sector};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::error::WorldError;

/// What the cell needs to know about a creature to pack it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occupant {
    /// The creature.
    pub id: CreatureId,
    /// How many sectors it claims.
    pub footprint: Footprint,
    /// How tall it stands.
    pub height: Height,
}

/// Where on a cell a creature sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// A single sector, for footprint-1 creatures.
    Sector(Sector),
    /// One side of the cell, for footprint-2 creatures.
    Side(Direction),
    /// The whole cell, for footprint-4 creatures.
    Whole,
}

impl Placement {
    /// The footprint this placement is shaped for.
    pub const fn footprint(self) -> Footprint {
        match self {
            Self::Sector(_) => Footprint::One,
            Self::Side(_) => Footprint::Two,
            Self::Whole => Footprint::Four,
        }
    }

    /// The sectors covered by this placement.
    pub fn sectors(self) -> Vec<Sector> {
        match self {
            Self::Sector(sector) => vec![sector],
            Self::Side(direction) => Sector::side(direction).to_vec(),
            Self::Whole => Sector::ALL.to_vec(),
        }
    }
}

impl core::fmt::Display for Placement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Sector(sector) => write!(f, "sector {sector}"),
            Self::Side(direction) => write!(f, "{direction} side"),
            Self::Whole => f.write_str("whole cell"),
        }
    }
}

/// Tracks which creature holds each sector of one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyManager {
    sectors: BTreeMap<Sector, Occupant>,
}

impl OccupancyManager {
    /// An empty cell.
    pub const fn new() -> Self {
        Self {
            sectors: BTreeMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Place `occupant` at an explicit placement.
    ///
    /// # Errors
    ///
    /// - [`WorldError::FootprintMismatch`] if the placement shape does not fit the footprint
    /// - [`WorldError::AlreadyPresent`] if the creature is already on this cell
    /// - [`WorldError::CellOccupied`] if a whole-cell creature meets any occupant
    /// - [`WorldError::InsufficientRoom`] if fewer sectors are free than the footprint needs
    /// - [`WorldError::SectorOccupied`] if a requested sector is held
    pub fn add_at(&mut self, occupant: Occupant, placement: Placement) -> Result<(), WorldError> {
        if placement.footprint() != occupant.footprint {
            return Err(WorldError::FootprintMismatch {
                id: occupant.id,
                footprint: occupant.footprint,
                placement,
            });
        }
        if self.contains(occupant.id) {
            return Err(WorldError::AlreadyPresent(occupant.id));
        }
        if occupant.footprint == Footprint::Four && !self.is_empty() {
            return Err(WorldError::CellOccupied {
                occupants: self.occupant_count(),
            });
        }

        let free = self.free_room();
        if free < usize::from(occupant.footprint.sectors()) {
            return Err(WorldError::InsufficientRoom {
                footprint: occupant.footprint,
                free,
            });
        }

        let wanted = placement.sectors();
        if let Some((sector, holder)) = wanted
            .iter()
            .find_map(|sector| self.sectors.get(sector).map(|held| (*sector, held.id)))
        {
            return Err(WorldError::SectorOccupied { sector, holder });
        }

        for sector in wanted {
            self.sectors.insert(sector, occupant);
        }
        Ok(())
    }

    /// Place `occupant` wherever it fits, returning the placement chosen.
    ///
    /// Footprint-1 creatures get a random free sector, footprint-2 creatures
    /// a side picked through [`Self::free_directions`].
    ///
    /// # Errors
    ///
    /// - [`WorldError::InsufficientRoom`] if there is not enough room
    /// - [`WorldError::NoAdjacentPair`] if two sectors are free but diagonal
    /// - any error of [`Self::add_at`]
    pub fn add<R: Rng + ?Sized>(
        &mut self,
        occupant: Occupant,
        rng: &mut R,
    ) -> Result<Placement, WorldError> {
        let placement = match occupant.footprint {
            Footprint::One => {
                let free = self.free_sectors();
                let Some(sector) = free.choose(rng) else {
                    return Err(WorldError::InsufficientRoom {
                        footprint: occupant.footprint,
                        free: 0,
                    });
                };
                Placement::Sector(*sector)
            }
            Footprint::Two => {
                let directions = self.free_directions(rng);
                let Some(direction) = directions.choose(rng) else {
                    let free = self.free_room();
                    return Err(if free >= 2 {
                        WorldError::NoAdjacentPair
                    } else {
                        WorldError::InsufficientRoom {
                            footprint: occupant.footprint,
                            free,
                        }
                    });
                };
                Placement::Side(*direction)
            }
            Footprint::Four => Placement::Whole,
        };

        self.add_at(occupant, placement)?;
        Ok(placement)
    }

    /// Remove creature `id` from an explicit placement.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotAtPlacement`] unless the creature holds every
    /// sector of `placement`, and [`WorldError::FootprintMismatch`] if it
    /// holds them with a different footprint.
    pub fn remove_at(&mut self, id: CreatureId, placement: Placement) -> Result<(), WorldError> {
        let wanted = placement.sectors();
        let mut footprint = None;
        for sector in &wanted {
            match self.sectors.get(sector) {
                Some(held) if held.id == id => footprint = Some(held.footprint),
                _ => return Err(WorldError::NotAtPlacement { id, placement }),
            }
        }
        if let Some(footprint) = footprint.filter(|held| *held != placement.footprint()) {
            return Err(WorldError::FootprintMismatch {
                id,
                footprint,
                placement,
            });
        }

        for sector in wanted {
            self.sectors.remove(&sector);
        }
        Ok(())
    }

    /// Remove creature `id` from wherever it sits, returning that placement.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotPresent`] if the creature is not on this cell.
    pub fn remove(&mut self, id: CreatureId) -> Result<Placement, WorldError> {
        let placement = self.placement_of(id).ok_or(WorldError::NotPresent(id))?;
        self.remove_at(id, placement)?;
        Ok(placement)
    }

    // -----------------------------------------------------------------------
    // Room
    // -----------------------------------------------------------------------

    /// Number of free sectors.
    pub fn free_room(&self) -> usize {
        Sector::ALL.len().saturating_sub(self.sectors.len())
    }

    /// Whether a creature of `footprint` could be added somewhere.
    pub fn can_host(&self, footprint: Footprint) -> bool {
        let free = self.free_sectors();
        match footprint {
            Footprint::One => !free.is_empty(),
            Footprint::Two => Direction::ALL
                .into_iter()
                .any(|direction| Sector::side(direction).iter().all(|s| free.contains(s))),
            Footprint::Four => free.len() == Sector::ALL.len(),
        }
    }

    /// Sides a footprint-2 creature could take right now.
    ///
    /// - 0 or 1 free sector: none.
    /// - 2 free sectors: their side, if they are edge-adjacent.
    /// - 3 free sectors: one of the fully free sides, chosen at random.
    /// - 4 free sectors: either east and west, or north and south, chosen at random.
    pub fn free_directions<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Direction> {
        let free = self.free_sectors();
        let free_sides: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| Sector::side(*direction).iter().all(|s| free.contains(s)))
            .collect();

        match free.len() {
            4 => {
                if rng.random_bool(0.5) {
                    vec![Direction::East, Direction::West]
                } else {
                    vec![Direction::North, Direction::South]
                }
            }
            3 => free_sides.choose(rng).copied().into_iter().collect(),
            2 => free_sides,
            _ => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The creature holding `sector`, if any.
    pub fn occupant_at(&self, sector: Sector) -> Option<&Occupant> {
        self.sectors.get(&sector)
    }

    /// Every distinct creature on the cell.
    pub fn occupants(&self) -> BTreeSet<CreatureId> {
        self.sectors.values().map(|occupant| occupant.id).collect()
    }

    /// Number of distinct creatures on the cell.
    pub fn occupant_count(&self) -> usize {
        self.occupants().len()
    }

    /// Whether creature `id` is on the cell.
    pub fn contains(&self, id: CreatureId) -> bool {
        self.sectors.values().any(|occupant| occupant.id == id)
    }

    /// Whether no creature is on the cell.
    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Sectors currently held.
    pub fn occupied_sectors(&self) -> BTreeSet<Sector> {
        self.sectors.keys().copied().collect()
    }

    /// Sectors currently free, in [`Sector::ALL`] order.
    pub fn free_sectors(&self) -> Vec<Sector> {
        Sector::ALL
            .into_iter()
            .filter(|sector| !self.sectors.contains_key(sector))
            .collect()
    }

    /// Height of the tallest creature on the cell.
    pub fn tallest_height(&self) -> Option<Height> {
        self.sectors.values().map(|occupant| occupant.height).max()
    }

    /// Where creature `id` sits, if it is on the cell.
    pub fn placement_of(&self, id: CreatureId) -> Option<Placement> {
        let held: Vec<Sector> = self
            .sectors
            .iter()
            .filter(|(_, occupant)| occupant.id == id)
            .map(|(sector, _)| *sector)
            .collect();
        let footprint = self.sectors.get(held.first()?)?.footprint;

        match (footprint, held.as_slice()) {
            (Footprint::One, [sector]) => Some(Placement::Sector(*sector)),
            (Footprint::Two, [first, second]) => first.side_between(*second).map(Placement::Side),
            (Footprint::Four, _) => Some(Placement::Whole),
            _ => None,
        }
    }

    /// The sector held by a footprint-1 occupant, if it is on the cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::WrongFootprint`] unless the occupant has footprint 1.
    pub fn sector_of(&self, occupant: &Occupant) -> Result<Option<Sector>, WorldError> {
        Self::expect_footprint(occupant, Footprint::One)?;
        Ok(match self.placement_of(occupant.id) {
            Some(Placement::Sector(sector)) => Some(sector),
            _ => None,
        })
    }

    /// The side held by a footprint-2 occupant, if it is on the cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::WrongFootprint`] unless the occupant has footprint 2.
    pub fn side_of(&self, occupant: &Occupant) -> Result<Option<Direction>, WorldError> {
        Self::expect_footprint(occupant, Footprint::Two)?;
        Ok(match self.placement_of(occupant.id) {
            Some(Placement::Side(direction)) => Some(direction),
            _ => None,
        })
    }

    fn expect_footprint(occupant: &Occupant, expected: Footprint) -> Result<(), WorldError> {
        if occupant.footprint == expected {
            Ok(())
        } else {
            Err(WorldError::WrongFootprint {
                id: occupant.id,
                footprint: occupant.footprint,
                expected,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn occupant(footprint: Footprint) -> Occupant {
        Occupant {
            id: CreatureId::new(),
            footprint,
            height: Height::Medium,
        }
    }

    #[test]
    fn whole_cell_needs_an_empty_cell() {
        let mut cell = OccupancyManager::new();
        let small = occupant(Footprint::One);
        cell.add_at(small, Placement::Sector(Sector::SouthEast)).unwrap();

        let big = occupant(Footprint::Four);
        assert!(matches!(
            cell.add_at(big, Placement::Whole),
            Err(WorldError::CellOccupied { occupants: 1 })
        ));

        cell.remove(small.id).unwrap();
        cell.add_at(big, Placement::Whole).unwrap();
        assert_eq!(cell.occupied_sectors().len(), 4);
        assert_eq!(cell.occupant_count(), 1);
        assert!(!cell.can_host(Footprint::One));
    }

    #[test]
    fn single_sectors_fill_up_regardless_of_adjacency() {
        let mut cell = OccupancyManager::new();
        cell.add_at(occupant(Footprint::One), Placement::Sector(Sector::NorthWest))
            .unwrap();
        cell.add_at(occupant(Footprint::One), Placement::Sector(Sector::SouthEast))
            .unwrap();
        cell.add_at(occupant(Footprint::One), Placement::Sector(Sector::NorthEast))
            .unwrap();
        cell.add_at(occupant(Footprint::One), Placement::Sector(Sector::SouthWest))
            .unwrap();

        let late = occupant(Footprint::One);
        assert!(matches!(
            cell.add_at(late, Placement::Sector(Sector::SouthWest)),
            Err(WorldError::InsufficientRoom { free: 0, .. })
        ));
        assert_eq!(cell.occupant_count(), 4);
    }

    #[test]
    fn taken_sector_is_rejected() {
        let mut cell = OccupancyManager::new();
        let first = occupant(Footprint::One);
        cell.add_at(first, Placement::Sector(Sector::NorthEast)).unwrap();

        let error = cell
            .add_at(occupant(Footprint::Two), Placement::Side(Direction::North))
            .unwrap_err();
        assert!(matches!(
            error,
            WorldError::SectorOccupied { sector: Sector::NorthEast, holder } if holder == first.id
        ));
    }

    #[test]
    fn diagonal_free_pair_refuses_a_side() {
        let mut cell = OccupancyManager::new();
        let mut rng = StdRng::seed_from_u64(1);
        cell.add_at(occupant(Footprint::One), Placement::Sector(Sector::NorthWest))
            .unwrap();
        cell.add_at(occupant(Footprint::One), Placement::Sector(Sector::SouthEast))
            .unwrap();

        assert!(!cell.can_host(Footprint::Two));
        assert!(cell.free_directions(&mut rng).is_empty());
        assert!(matches!(
            cell.add(occupant(Footprint::Two), &mut rng),
            Err(WorldError::NoAdjacentPair)
        ));
    }

    #[test]
    fn adjacent_free_pair_offers_its_side() {
        let mut cell = OccupancyManager::new();
        let mut rng = StdRng::seed_from_u64(2);
        cell.add_at(occupant(Footprint::Two), Placement::Side(Direction::West))
            .unwrap();

        assert_eq!(cell.free_directions(&mut rng), vec![Direction::East]);
        let placed = cell.add(occupant(Footprint::Two), &mut rng).unwrap();
        assert_eq!(placed, Placement::Side(Direction::East));
        assert_eq!(cell.free_room(), 0);
    }

    #[test]
    fn three_free_sectors_offer_one_fully_free_side() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut cell = OccupancyManager::new();
        cell.add_at(occupant(Footprint::One), Placement::Sector(Sector::NorthWest))
            .unwrap();

        for _ in 0..16 {
            let directions = cell.free_directions(&mut rng);
            assert_eq!(directions.len(), 1);
            assert!(matches!(
                directions.first(),
                Some(Direction::South | Direction::East)
            ));
        }
    }

    #[test]
    fn empty_cell_offers_opposite_sides() {
        let mut rng = StdRng::seed_from_u64(4);
        let cell = OccupancyManager::new();
        let mut seen_horizontal = false;
        let mut seen_vertical = false;
        for _ in 0..64 {
            let directions = cell.free_directions(&mut rng);
            assert_eq!(directions.len(), 2);
            let [first, second] = [directions.first().unwrap(), directions.get(1).unwrap()];
            assert_eq!(first.opposite(), *second);
            if first.is_horizontal() {
                seen_horizontal = true;
            } else {
                seen_vertical = true;
            }
        }
        assert!(seen_horizontal && seen_vertical);
    }

    #[test]
    fn two_sides_pack_a_cell() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut cell = OccupancyManager::new();
        let first = cell.add(occupant(Footprint::Two), &mut rng).unwrap();
        let second = cell.add(occupant(Footprint::Two), &mut rng).unwrap();
        assert!(
            matches!(
                (first, second),
                (Placement::Side(a), Placement::Side(b)) if a.opposite() == b
            ),
            "footprint-2 creatures must get opposite sides, got {first:?} and {second:?}"
        );
        assert!(cell.free_sectors().is_empty());
    }

    #[test]
    fn remove_checks_the_stated_placement() {
        let mut cell = OccupancyManager::new();
        let pair = occupant(Footprint::Two);
        cell.add_at(pair, Placement::Side(Direction::South)).unwrap();

        assert!(matches!(
            cell.remove_at(pair.id, Placement::Side(Direction::North)),
            Err(WorldError::NotAtPlacement { .. })
        ));
        assert!(matches!(
            cell.remove_at(pair.id, Placement::Sector(Sector::SouthEast)),
            Err(WorldError::FootprintMismatch { .. })
        ));

        cell.remove_at(pair.id, Placement::Side(Direction::South)).unwrap();
        assert!(cell.is_empty());
        assert!(matches!(
            cell.remove(pair.id),
            Err(WorldError::NotPresent(_))
        ));
    }

    #[test]
    fn removal_frees_exactly_the_held_sectors() {
        let mut cell = OccupancyManager::new();
        let single = occupant(Footprint::One);
        let pair = occupant(Footprint::Two);
        cell.add_at(single, Placement::Sector(Sector::NorthWest)).unwrap();
        cell.add_at(pair, Placement::Side(Direction::East)).unwrap();

        assert_eq!(cell.remove(pair.id).unwrap(), Placement::Side(Direction::East));
        assert_eq!(
            cell.occupied_sectors(),
            BTreeSet::from([Sector::NorthWest])
        );
        assert_eq!(cell.free_room(), 3);
    }

    #[test]
    fn lookups_check_the_footprint() {
        let mut cell = OccupancyManager::new();
        let single = occupant(Footprint::One);
        let pair = occupant(Footprint::Two);
        cell.add_at(single, Placement::Sector(Sector::SouthWest)).unwrap();
        cell.add_at(pair, Placement::Side(Direction::North)).unwrap();

        assert_eq!(cell.sector_of(&single).unwrap(), Some(Sector::SouthWest));
        assert_eq!(cell.side_of(&pair).unwrap(), Some(Direction::North));
        assert!(matches!(
            cell.sector_of(&pair),
            Err(WorldError::WrongFootprint { .. })
        ));
        assert!(cell.side_of(&single).is_err());
        assert_eq!(cell.sector_of(&occupant(Footprint::One)).unwrap(), None);
    }

    #[test]
    fn mismatched_shape_is_rejected() {
        let mut cell = OccupancyManager::new();
        assert!(matches!(
            cell.add_at(occupant(Footprint::Four), Placement::Side(Direction::East)),
            Err(WorldError::FootprintMismatch { .. })
        ));
    }

    #[test]
    fn double_placement_is_rejected() {
        let mut cell = OccupancyManager::new();
        let single = occupant(Footprint::One);
        cell.add_at(single, Placement::Sector(Sector::NorthWest)).unwrap();
        assert!(matches!(
            cell.add_at(single, Placement::Sector(Sector::NorthEast)),
            Err(WorldError::AlreadyPresent(_))
        ));
    }

    #[test]
    fn tallest_height_and_distinct_occupants() {
        let mut cell = OccupancyManager::new();
        assert_eq!(cell.tallest_height(), None);

        let short = Occupant {
            height: Height::Small,
            ..occupant(Footprint::One)
        };
        let tall = Occupant {
            height: Height::Giant,
            ..occupant(Footprint::Two)
        };
        cell.add_at(short, Placement::Sector(Sector::NorthWest)).unwrap();
        cell.add_at(tall, Placement::Side(Direction::South)).unwrap();

        assert_eq!(cell.tallest_height(), Some(Height::Giant));
        assert_eq!(cell.occupants(), BTreeSet::from([short.id, tall.id]));
        assert_eq!(cell.occupant_at(Sector::SouthEast).map(|o| o.id), Some(tall.id));
        assert_eq!(cell.occupant_at(Sector::NorthEast), None);
    }
}
