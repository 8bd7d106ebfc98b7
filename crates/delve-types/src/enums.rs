//! Enumeration types shared by the map and the creature engine.

use serde::{Deserialize, Serialize};

/// Number of sectors a creature occupies on a map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Footprint {
    /// A single sector (small creatures, up to four per cell).
    One,
    /// One side of the cell: two edge-adjacent sectors.
    Two,
    /// The whole cell.
    Four,
}

impl Footprint {
    /// How many sectors this footprint claims.
    pub const fn sectors(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
        }
    }
}

impl core::fmt::Display for Footprint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "footprint-{}", self.sectors())
    }
}

/// Height class of a creature, used to find the tallest occupant of a cell.
///
/// Ordered from lowest to tallest; `Undefined` covers floating or shapeless
/// creatures and sorts below everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Height {
    /// No meaningful height.
    Undefined,
    /// Knee-high.
    Small,
    /// Waist-high.
    Medium,
    /// Taller than a champion.
    Giant,
}

/// Whether a creature is blocked by solid obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Materiality {
    /// Tangible: walls block it and physical blows connect.
    Material,
    /// Intangible: passes through walls.
    Immaterial,
}

impl Materiality {
    /// The other materiality.
    pub const fn flipped(self) -> Self {
        match self {
            Self::Material => Self::Immaterial,
            Self::Immaterial => Self::Material,
        }
    }

    /// Whether this is [`Materiality::Material`].
    pub const fn is_material(self) -> bool {
        matches!(self, Self::Material)
    }
}

/// Kind of damage carried by an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    /// Untyped damage.
    None,
    /// Burning damage.
    Fire,
    /// A critical blow, tripling the damage roll.
    Critical,
    /// Plain physical damage.
    Normal,
    /// Cutting or piercing damage.
    Sharp,
    /// Magical damage, negated by magic immunity.
    Magic,
    /// Mind damage.
    Psychic,
}

/// Behavior state of a creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatureState {
    /// Freshly spawned, has not acted yet.
    Idle,
    /// Wandering with no target perceived.
    Patrolling,
    /// Following a route toward a perceived target.
    Tracking,
    /// Just attacked its target.
    Attacking,
}

/// Classification of a map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    /// Open floor.
    Floor,
    /// Solid rock.
    Wall,
    /// Stairs to another level.
    Stairs,
    /// A magical teleporter field.
    Teleporter,
    /// A hole in the floor.
    Pit,
}

impl CellKind {
    /// Parse the single-character map glyph for a cell kind.
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(Self::Floor),
            '#' => Some(Self::Wall),
            '>' => Some(Self::Stairs),
            '*' => Some(Self::Teleporter),
            'O' => Some(Self::Pit),
            _ => None,
        }
    }

    /// The map glyph for this cell kind.
    pub const fn glyph(self) -> char {
        match self {
            Self::Floor => '.',
            Self::Wall => '#',
            Self::Stairs => '>',
            Self::Teleporter => '*',
            Self::Pit => 'O',
        }
    }

    /// Whether a creature with the given materiality can enter the cell.
    pub const fn is_traversable(self, materiality: Materiality) -> bool {
        match self {
            Self::Wall => !materiality.is_material(),
            Self::Floor | Self::Stairs | Self::Teleporter | Self::Pit => true,
        }
    }
}
