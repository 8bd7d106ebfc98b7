//! Per-type creature stat records.
//!
//! A creature type is nothing but data: an immutable [`CreatureStats`]
//! record, capability flags included. Records are loaded from YAML into a
//! [`Bestiary`] and shared between every creature of that type.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use delve_types::{AttackType, Footprint, Height, Materiality};
use serde::{Deserialize, Serialize};

use crate::error::CreatureError;

/// Move duration of a creature that never moves.
pub const STATIONARY: u8 = u8::MAX;

/// Largest sight range or awareness radius.
pub const MAX_SENSE_RANGE: u8 = 15;

/// Largest anti-magic value.
pub const MAX_ANTI_MAGIC: u8 = 15;

/// Behavior switches of a creature type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Takes no damage at all.
    pub invincible: bool,
    /// Takes no damage from magic attacks.
    pub magic_immune: bool,
    /// Attacks with spells, from its spell range.
    pub casts_spells: bool,
    /// May patrol onto stairs.
    pub takes_stairs: bool,
    /// May patrol onto teleporters.
    pub teleports: bool,
    /// Can absorb items, dropping them on death.
    pub absorbs_items: bool,
    /// Flickers between tangible and intangible at random.
    pub flickers: bool,
}

/// Immutable stats shared by every creature of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureStats {
    /// Type name, the bestiary key.
    pub name: String,
    /// Sectors claimed on a cell.
    pub footprint: Footprint,
    /// Height class.
    pub height: Height,
    /// Default tangibility (ignored when the type flickers).
    #[serde(default = "default_materiality")]
    pub materiality: Materiality,
    /// Health before the spawn multiplier.
    pub base_health: u32,
    /// Ticks between two moves; [`STATIONARY`] for types that never move.
    pub move_duration: u8,
    /// Ticks between two attacks.
    pub attack_duration: u8,
    /// Strength of an attack.
    pub attack_power: u8,
    /// Kind of damage dealt.
    #[serde(default = "default_attack_type")]
    pub attack_type: AttackType,
    /// Poison inflicted per attack.
    #[serde(default)]
    pub poison: u8,
    /// Depth of the sight cone.
    #[serde(default)]
    pub sight_range: u8,
    /// Hearing radius.
    #[serde(default)]
    pub awareness: u8,
    /// Reach of attack spells.
    #[serde(default)]
    pub spell_range: u8,
    /// Physical armor.
    ///
    /// Creature behavior never reads it. It is carried for whoever resolves
    /// the party's attacks against the creature.
    #[serde(default)]
    pub armor: u8,
    /// Resistance to magic, up to [`MAX_ANTI_MAGIC`].
    ///
    /// Like [`Self::armor`], carried for the spell engine and unused here.
    #[serde(default)]
    pub anti_magic: u8,
    /// Behavior switches.
    #[serde(default)]
    pub capabilities: Capabilities,
}

impl CreatureStats {
    /// Whether creatures of this type ever move.
    pub const fn can_move(&self) -> bool {
        self.move_duration != STATIONARY
    }

    /// Reach of an attack: spell range for casters, adjacent cells otherwise.
    pub fn attack_range(&self) -> u8 {
        if self.capabilities.casts_spells {
            self.spell_range.max(1)
        } else {
            1
        }
    }

    /// Check the record's ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureError::InvalidStats`] describing the first problem found.
    pub fn validate(&self) -> Result<(), CreatureError> {
        let invalid = |reason: String| CreatureError::InvalidStats {
            kind: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be blank".to_owned()));
        }
        if self.base_health == 0 {
            return Err(invalid("base_health must be positive".to_owned()));
        }
        if self.sight_range > MAX_SENSE_RANGE || self.awareness > MAX_SENSE_RANGE {
            return Err(invalid(format!(
                "sight_range and awareness must be at most {MAX_SENSE_RANGE}"
            )));
        }
        if self.anti_magic > MAX_ANTI_MAGIC {
            return Err(invalid(format!("anti_magic must be at most {MAX_ANTI_MAGIC}")));
        }
        if self.capabilities.casts_spells && self.spell_range == 0 {
            return Err(invalid("spell casters need a spell_range".to_owned()));
        }
        Ok(())
    }
}

const fn default_materiality() -> Materiality {
    Materiality::Material
}

const fn default_attack_type() -> AttackType {
    AttackType::Normal
}

/// Read-only catalog of creature types, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Bestiary {
    kinds: BTreeMap<String, Arc<CreatureStats>>,
}

impl Bestiary {
    /// An empty bestiary.
    pub const fn new() -> Self {
        Self {
            kinds: BTreeMap::new(),
        }
    }

    /// Load a YAML list of stat records from a file.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureError::Io`] if the file cannot be read, or any
    /// error of [`Self::parse`].
    pub fn from_file(path: &Path) -> Result<Self, CreatureError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a YAML list of stat records.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureError::Yaml`] on malformed YAML, and the errors of
    /// [`Self::insert`] for invalid or duplicated records.
    pub fn parse(yaml: &str) -> Result<Self, CreatureError> {
        let records: Vec<CreatureStats> = serde_yml::from_str(yaml)?;
        let mut bestiary = Self::new();
        for record in records {
            bestiary.insert(record)?;
        }
        Ok(bestiary)
    }

    /// Add a record.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureError::InvalidStats`] if the record fails
    /// validation and [`CreatureError::DuplicateKind`] if the name is taken.
    pub fn insert(&mut self, stats: CreatureStats) -> Result<Arc<CreatureStats>, CreatureError> {
        stats.validate()?;
        if self.kinds.contains_key(&stats.name) {
            return Err(CreatureError::DuplicateKind(stats.name));
        }
        let stats = Arc::new(stats);
        self.kinds.insert(stats.name.clone(), Arc::clone(&stats));
        Ok(stats)
    }

    /// The record named `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureError::UnknownKind`] if there is none.
    pub fn get(&self, kind: &str) -> Result<Arc<CreatureStats>, CreatureError> {
        self.kinds
            .get(kind)
            .cloned()
            .ok_or_else(|| CreatureError::UnknownKind(kind.to_owned()))
    }

    /// Names of every known type, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    /// Number of known types.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether no type is known.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
