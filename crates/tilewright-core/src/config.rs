//! Level configuration.
//!
//! A [`LevelConfig`] describes everything needed to build a
//! [`Level`](crate::level::Level): board shape, entity health, the player's
//! [`Loadout`], the obstacle weight table and scheduling interval, animation
//! timings and the RNG seed. Every field has a default, so a JSON document
//! only needs to name what differs.
//!
//! # Example
//!
//! ```
//! use tilewright_core::config::LevelConfig;
//!
//! let config = LevelConfig::from_json_str(r#"{
//!     "rows": 5,
//!     "cols": 5,
//!     "mode": "repair",
//!     "obstacle_weights": { "freeze": 3, "damageEntity": 1 },
//!     "loadout": { "active1": "merge", "passive": "resistance" }
//! }"#).unwrap();
//!
//! assert_eq!(config.rows, 5);
//! assert_eq!(config.loadout.active1.as_deref(), Some("merge"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::board::MAX_BOARD_SIDE;
use crate::error::ConfigError;

pub use crate::entity::GameMode;

/// Largest accepted damage of a level-1 tile.
pub const MAX_BASE_TILE_DAMAGE: i64 = 1_000_000;

/// Abilities the player brought into the level, by name id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Loadout {
    /// First active ability.
    pub active1: Option<String>,
    /// Second active ability; requires `active1`.
    pub active2: Option<String>,
    /// Passive ability.
    pub passive: Option<String>,
}

/// Frame counts of timed animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Frames a board mutation animation lasts.
    pub board_frames: u32,
    /// Frames an entity damage or healing animation lasts.
    pub entity_frames: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            board_frames: 12,
            entity_frames: 20,
        }
    }
}

/// Complete description of one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Board rows.
    pub rows: u16,
    /// Board columns.
    pub cols: u16,
    /// Highest tile level.
    pub max_tile_level: u8,
    /// Level of generated tiles.
    pub base_tile_level: u8,
    /// Tiles spawned when the level starts.
    pub initial_tiles: usize,
    /// Win condition.
    pub mode: GameMode,
    /// Entity maximum health.
    pub max_health: i64,
    /// Entity starting health; defaults to max health in attack mode and
    /// half of it in repair mode.
    pub initial_health: Option<i64>,
    /// Damage of a level-1 tile; doubles per level.
    pub base_tile_damage: i64,
    /// Obstacle name id to weight.
    pub obstacle_weights: BTreeMap<String, u32>,
    /// Minimum turns between obstacles.
    pub min_interval: u32,
    /// Maximum turns between obstacles.
    pub max_interval: u32,
    /// Abilities in play.
    pub loadout: Loadout,
    /// Animation timings.
    pub animation: AnimationConfig,
    /// RNG seed.
    pub seed: u64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 4,
            max_tile_level: 9,
            base_tile_level: 1,
            initial_tiles: 3,
            mode: GameMode::Attack,
            max_health: 1_000,
            initial_health: None,
            base_tile_damage: 10,
            obstacle_weights: BTreeMap::new(),
            min_interval: 3,
            max_interval: 6,
            loadout: Loadout::default(),
            animation: AnimationConfig::default(),
            seed: 0,
        }
    }
}

impl LevelConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or any error
    /// [`validate`](Self::validate) reports.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the entity's starting health.
    #[must_use]
    pub fn starting_health(&self) -> i64 {
        self.initial_health.unwrap_or(match self.mode {
            GameMode::Attack => self.max_health,
            GameMode::Repair => (self.max_health / 2).max(1),
        })
    }

    /// Checks the numeric settings.
    ///
    /// Name ids are checked when the managers are built.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 || self.rows > MAX_BOARD_SIDE || self.cols > MAX_BOARD_SIDE {
            return Err(ConfigError::InvalidBoardSize {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.max_tile_level == 0 {
            return Err(ConfigError::InvalidTileLevel {
                level: 0,
                max_level: 0,
            });
        }
        if self.base_tile_level == 0 || self.base_tile_level > self.max_tile_level {
            return Err(ConfigError::InvalidTileLevel {
                level: self.base_tile_level,
                max_level: self.max_tile_level,
            });
        }
        let capacity = usize::from(self.rows) * usize::from(self.cols);
        if self.initial_tiles > capacity {
            return Err(ConfigError::TooManyInitialTiles {
                requested: self.initial_tiles,
                capacity,
            });
        }
        let health = self.starting_health();
        if self.max_health <= 0 || health <= 0 || health > self.max_health {
            return Err(ConfigError::InvalidHealth {
                health,
                max_health: self.max_health,
            });
        }
        if !(1..=MAX_BASE_TILE_DAMAGE).contains(&self.base_tile_damage) {
            return Err(ConfigError::InvalidDamage {
                damage: self.base_tile_damage,
                max: MAX_BASE_TILE_DAMAGE,
            });
        }
        if self.min_interval > self.max_interval {
            return Err(ConfigError::InvalidInterval {
                min: self.min_interval,
                max: self.max_interval,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn empty_document_gives_defaults() {
            let config = LevelConfig::from_json_str("{}").unwrap();
            assert_eq!(config, LevelConfig::default());
        }

        #[test]
        fn malformed_json_is_a_parse_error() {
            assert!(matches!(
                LevelConfig::from_json_str("{ rows: 4"),
                Err(ConfigError::Parse(_))
            ));
        }

        #[test]
        fn round_trips_through_json() {
            let mut config = LevelConfig::default();
            config.obstacle_weights.insert("freeze".into(), 2);
            config.loadout.active1 = Some("crit".into());
            let json = serde_json::to_string(&config).unwrap();
            assert_eq!(LevelConfig::from_json_str(&json).unwrap(), config);
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn inverted_interval_is_rejected() {
            let config = LevelConfig {
                min_interval: 7,
                max_interval: 6,
                ..LevelConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidInterval { min: 7, max: 6 })
            ));
        }

        #[test]
        fn too_many_initial_tiles_is_rejected() {
            let config = LevelConfig {
                rows: 2,
                cols: 2,
                initial_tiles: 5,
                ..LevelConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::TooManyInitialTiles {
                    requested: 5,
                    capacity: 4
                })
            ));
        }

        #[test]
        fn base_level_above_max_is_rejected() {
            let config = LevelConfig {
                base_tile_level: 10,
                ..LevelConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidTileLevel { level: 10, max_level: 9 })
            ));
        }

        #[test]
        fn base_damage_must_be_positive_and_bounded() {
            for damage in [0, -5, 100_000_000_000_000_000] {
                let config = LevelConfig {
                    base_tile_damage: damage,
                    ..LevelConfig::default()
                };
                assert!(matches!(
                    config.validate(),
                    Err(ConfigError::InvalidDamage { damage: d, max: MAX_BASE_TILE_DAMAGE }) if d == damage
                ));
            }
        }

        #[test]
        fn repair_mode_starts_at_half_health() {
            let config = LevelConfig {
                mode: GameMode::Repair,
                max_health: 300,
                ..LevelConfig::default()
            };
            assert_eq!(config.starting_health(), 150);
            assert!(config.validate().is_ok());
        }
    }
}
