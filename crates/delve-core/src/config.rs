//! Configuration loading and typed config structures for the Delve engine.
//!
//! The canonical configuration lives in `delve-config.yaml` next to the
//! binary. Every field has a default, so an empty file (or no file at all)
//! yields a runnable demo dungeon.

use std::path::Path;

use delve_types::Direction;
use serde::Deserialize;

use crate::scheduler::TICKS_PER_SECOND;

/// Environment variable overriding `simulation.seed`.
pub const SEED_ENV_VAR: &str = "DELVE_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes something unusable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Tick rate.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Seed and run bounds.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// The level creatures live on.
    #[serde(default)]
    pub level: LevelConfig,

    /// Where the party stands.
    #[serde(default)]
    pub party: PartyConfig,

    /// Path of the YAML file holding creature stat records.
    #[serde(default = "default_bestiary_path")]
    pub bestiary_path: String,

    /// Creatures placed on the level at startup.
    #[serde(default)]
    pub spawns: Vec<SpawnConfig>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            simulation: SimulationBoundsConfig::default(),
            level: LevelConfig::default(),
            party: PartyConfig::default(),
            bestiary_path: default_bestiary_path(),
            spawns: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `DELVE_SEED`, when set to an integer, overrides `simulation.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if it fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML and
    /// [`ConfigError::Invalid`] if it fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.simulation.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check the cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.ticks_per_second == 0 || self.scheduler.ticks_per_second > 1000 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "scheduler.ticks_per_second must be within 1..=1000, got {}",
                    self.scheduler.ticks_per_second
                ),
            });
        }

        let Some(width) = self.level.rows.first().map(|row| row.chars().count()) else {
            return Err(ConfigError::Invalid {
                reason: "level.rows must not be empty".to_owned(),
            });
        };
        if let Some(index) = self
            .level
            .rows
            .iter()
            .position(|row| row.chars().count() != width)
        {
            return Err(ConfigError::Invalid {
                reason: format!("level row {index} is not {width} cells wide"),
            });
        }

        if let Some(spawn) = self.spawns.iter().find(|spawn| spawn.multiplier == 0) {
            return Err(ConfigError::Invalid {
                reason: format!("spawn of {} needs a positive multiplier", spawn.kind),
            });
        }
        Ok(())
    }
}

/// Scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchedulerConfig {
    /// Ticks per wall-clock second.
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: default_ticks_per_second(),
        }
    }
}

/// Seed and termination bounds of a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Maximum number of ticks before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Maximum wall-clock seconds before the run ends (0 = unlimited).
    #[serde(default = "default_max_real_time_seconds")]
    pub max_real_time_seconds: u64,
}

impl SimulationBoundsConfig {
    fn apply_env_overrides(&mut self) {
        if let Some(seed) = std::env::var(SEED_ENV_VAR)
            .ok()
            .and_then(|value| value.trim().parse().ok())
        {
            self.seed = seed;
        }
    }
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            max_ticks: 0,
            max_real_time_seconds: default_max_real_time_seconds(),
        }
    }
}

/// Layout of the level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LevelConfig {
    /// Dungeon level number.
    #[serde(default = "default_level_z")]
    pub z: i32,

    /// One string per row: `#` wall, `.` floor, `>` stairs, `*` teleporter, `O` pit.
    #[serde(default = "default_level_rows")]
    pub rows: Vec<String>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            z: default_level_z(),
            rows: default_level_rows(),
        }
    }
}

/// Placement and toughness of the party.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PartyConfig {
    /// Column of the party.
    #[serde(default = "default_party_x")]
    pub x: i32,

    /// Row of the party.
    #[serde(default = "default_party_y")]
    pub y: i32,

    /// Hit points before the party falls.
    #[serde(default = "default_party_health")]
    pub health: u32,
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            x: default_party_x(),
            y: default_party_y(),
            health: default_party_health(),
        }
    }
}

/// One creature to place at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpawnConfig {
    /// Name of the stat record in the bestiary.
    pub kind: String,

    /// Column to place the creature on.
    pub x: i32,

    /// Row to place the creature on.
    pub y: i32,

    /// Health multiplier applied to the base health.
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,

    /// Initial facing.
    #[serde(default = "default_direction")]
    pub direction: Direction,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_ticks_per_second() -> u32 {
    TICKS_PER_SECOND
}

const fn default_seed() -> u64 {
    42
}

const fn default_max_real_time_seconds() -> u64 {
    30
}

const fn default_level_z() -> i32 {
    1
}

fn default_level_rows() -> Vec<String> {
    [
        "############",
        "#....#.....#",
        "#....#..>..#",
        "#..........#",
        "#....#.....#",
        "######..*..#",
        "#..........#",
        "############",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

const fn default_party_x() -> i32 {
    9
}

const fn default_party_y() -> i32 {
    6
}

const fn default_party_health() -> u32 {
    120
}

fn default_bestiary_path() -> String {
    "bestiary.yaml".to_owned()
}

const fn default_multiplier() -> u32 {
    1
}

const fn default_direction() -> Direction {
    Direction::North
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> String {
    "pretty".to_owned()
}
