//! The closed sets of active and passive abilities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{
    BetterBaseLevel, BonusDamage, CooldownReduction, Crit, Dispose, Merge, Resistance, Scramble,
    Swap, Upgrade,
};
use crate::error::ConfigError;
use crate::modifier::{AbilitySlot, Modifier};

/// Abilities that may fill an active slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Boosts the next attack.
    Crit,
    /// Merges two equal tiles.
    Merge,
    /// Raises a tile's level.
    Upgrade,
    /// Removes a tile.
    Dispose,
    /// Swaps two tiles.
    Swap,
    /// Shuffles the board.
    Scramble,
}

impl AbilityKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Crit,
        Self::Merge,
        Self::Upgrade,
        Self::Dispose,
        Self::Swap,
        Self::Scramble,
    ];

    /// Returns the name id.
    #[must_use]
    pub const fn name_id(self) -> &'static str {
        match self {
            Self::Crit => "crit",
            Self::Merge => "merge",
            Self::Upgrade => "upgrade",
            Self::Dispose => "dispose",
            Self::Swap => "swap",
            Self::Scramble => "scramble",
        }
    }

    /// Builds the ability for a slot.
    ///
    /// # Arguments
    ///
    /// * `slot` - Active slot the ability occupies
    /// * `animation_frames` - Length of the board animation it plays
    #[must_use]
    pub fn create(self, slot: AbilitySlot, animation_frames: u32) -> Box<dyn Modifier> {
        match self {
            Self::Crit => Box::new(Crit::new(slot)),
            Self::Merge => Box::new(Merge::new(slot, animation_frames)),
            Self::Upgrade => Box::new(Upgrade::new(slot, animation_frames)),
            Self::Dispose => Box::new(Dispose::new(slot, animation_frames)),
            Self::Swap => Box::new(Swap::new(slot, animation_frames)),
            Self::Scramble => Box::new(Scramble::new(slot, animation_frames)),
        }
    }
}

impl fmt::Display for AbilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_id())
    }
}

impl FromStr for AbilityKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name_id() == s)
            .ok_or_else(|| ConfigError::UnknownAbility(s.to_string()))
    }
}

/// Abilities that may fill the passive slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PassiveKind {
    /// Generated tiles start a level higher.
    BetterBaseLevel,
    /// Attacks deal more damage.
    BonusDamage,
    /// Active cooldowns are shorter.
    CooldownReduction,
    /// Some obstacles are blocked.
    Resistance,
}

impl PassiveKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::BetterBaseLevel,
        Self::BonusDamage,
        Self::CooldownReduction,
        Self::Resistance,
    ];

    /// Returns the name id.
    #[must_use]
    pub const fn name_id(self) -> &'static str {
        match self {
            Self::BetterBaseLevel => "betterBaseLevel",
            Self::BonusDamage => "bonusDamage",
            Self::CooldownReduction => "cooldownReduction",
            Self::Resistance => "resistance",
        }
    }

    /// Builds the passive.
    #[must_use]
    pub fn create(self) -> Box<dyn Modifier> {
        match self {
            Self::BetterBaseLevel => Box::new(BetterBaseLevel::new()),
            Self::BonusDamage => Box::new(BonusDamage::new()),
            Self::CooldownReduction => Box::new(CooldownReduction::new()),
            Self::Resistance => Box::new(Resistance::new()),
        }
    }
}

impl fmt::Display for PassiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_id())
    }
}

impl FromStr for PassiveKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name_id() == s)
            .ok_or_else(|| ConfigError::UnknownPassive(s.to_string()))
    }
}
