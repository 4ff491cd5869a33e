//! The closed set of obstacles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{
    DamageEntity, Downgrade, Freeze, GarbageTile, HealEntity, RandomDispose, RandomScramble,
    RandomSwap,
};
use crate::error::ConfigError;
use crate::modifier::Modifier;

/// Every obstacle a level may use.
///
/// Declaration order is the order of the scheduler's weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Locks a tile for a while.
    Freeze,
    /// Damages the entity in repair mode.
    DamageEntity,
    /// Heals the entity in attack mode.
    HealEntity,
    /// Lowers a tile's level.
    Downgrade,
    /// Drops a base-level tile into an empty cell.
    GarbageTile,
    /// Removes a random tile.
    RandomDispose,
    /// Swaps two random tiles.
    RandomSwap,
    /// Shuffles the unlocked tiles.
    RandomScramble,
}

impl ObstacleKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Freeze,
        Self::DamageEntity,
        Self::HealEntity,
        Self::Downgrade,
        Self::GarbageTile,
        Self::RandomDispose,
        Self::RandomSwap,
        Self::RandomScramble,
    ];

    /// Returns the name id.
    #[must_use]
    pub const fn name_id(self) -> &'static str {
        match self {
            Self::Freeze => "freeze",
            Self::DamageEntity => "damageEntity",
            Self::HealEntity => "healEntity",
            Self::Downgrade => "downgrade",
            Self::GarbageTile => "garbageTile",
            Self::RandomDispose => "randomDispose",
            Self::RandomSwap => "randomSwap",
            Self::RandomScramble => "randomScramble",
        }
    }

    /// Builds the obstacle.
    ///
    /// # Arguments
    ///
    /// * `animation_frames` - Length of the board animation it plays
    #[must_use]
    pub fn create(self, animation_frames: u32) -> Box<dyn Modifier> {
        match self {
            Self::Freeze => Box::new(Freeze::new(animation_frames)),
            Self::DamageEntity => Box::new(DamageEntity::new(animation_frames)),
            Self::HealEntity => Box::new(HealEntity::new(animation_frames)),
            Self::Downgrade => Box::new(Downgrade::new(animation_frames)),
            Self::GarbageTile => Box::new(GarbageTile::new(animation_frames)),
            Self::RandomDispose => Box::new(RandomDispose::new(animation_frames)),
            Self::RandomSwap => Box::new(RandomSwap::new(animation_frames)),
            Self::RandomScramble => Box::new(RandomScramble::new(animation_frames)),
        }
    }
}

impl fmt::Display for ObstacleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_id())
    }
}

impl FromStr for ObstacleKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name_id() == s)
            .ok_or_else(|| ConfigError::UnknownObstacle(s.to_string()))
    }
}
