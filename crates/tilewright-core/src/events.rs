//! Observable level events.
//!
//! Everything a presentation layer needs to react to (ability buttons
//! changing state, audio cues, health bars, the level outcome) is recorded
//! as a [`LevelEvent`] and drained by the host with
//! [`Level::take_events`](crate::level::Level::take_events). The core never
//! calls into UI or audio code directly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::Cell;
use crate::modifier::{ModifierId, ModifierState};
use crate::obstacles::ObstacleKind;

/// Fire-and-forget audio cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// An active ability finished applying.
    Ability,
    /// An obstacle fired.
    Obstacle,
    /// An obstacle was selected but vetoed.
    ObstacleBlocked,
}

impl Cue {
    /// Returns the sound id of the cue.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ability => "ability",
            Self::Obstacle => "obstacle",
            Self::ObstacleBlocked => "obstacleBlocked",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a level ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelOutcome {
    /// The player achieved the mode's goal.
    Won,
    /// The player failed the mode's goal.
    Lost,
}

/// Something observable that happened during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LevelEvent {
    /// An audio cue should be played.
    Cue(Cue),
    /// A modifier changed state.
    ApplicabilityChanged {
        /// Which modifier.
        id: ModifierId,
        /// Its new state.
        state: ModifierState,
    },
    /// A modifier finished one application.
    ModifierApplied {
        /// Which modifier.
        id: ModifierId,
        /// Its name id.
        name: &'static str,
    },
    /// A selection session accepted a cell.
    SelectionUpdated {
        /// Session owner.
        owner: ModifierId,
        /// Cells selected so far.
        cells: Vec<Cell>,
    },
    /// A selection session was cancelled.
    SelectionAborted {
        /// Session owner.
        owner: ModifierId,
    },
    /// An obstacle was chosen and started.
    ObstacleTriggered {
        /// The obstacle.
        kind: ObstacleKind,
    },
    /// An obstacle was chosen and then vetoed.
    ObstacleBlocked {
        /// The obstacle that would have fired.
        kind: ObstacleKind,
    },
    /// A frozen tile was released.
    TileThawed {
        /// Cell holding the released tile.
        cell: Cell,
    },
    /// The entity lost health.
    EntityDamaged {
        /// Damage dealt.
        amount: i64,
        /// Health afterwards.
        health: i64,
    },
    /// The entity regained health.
    EntityHealed {
        /// Healing applied.
        amount: i64,
        /// Health afterwards.
        health: i64,
    },
    /// The level ended.
    Outcome(LevelOutcome),
}
