//! Pending player actions.
//!
//! Input handlers enqueue [`InputAction`]s; the level consumes them once
//! per tick. Ability triggers are kept in a set ordered by priority, so a
//! trigger requested twice before a tick still fires once and the attack
//! always beats the actives.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::board::Cell;
use crate::error::UnknownTrigger;
use crate::modifier::AbilitySlot;

/// Something the player asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Trigger the attack.
    Attack,
    /// Trigger the first active ability.
    Active1,
    /// Trigger the second active ability.
    Active2,
    /// Click a cell of the running selection.
    SelectTile(Cell),
    /// Cancel the running selection.
    CancelSelection,
}

/// An ability trigger, ordered by dispatch priority (highest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// The attack.
    Attack,
    /// First active.
    Active1,
    /// Second active.
    Active2,
}

impl Trigger {
    /// Returns the loadout slot the trigger fires.
    #[must_use]
    pub const fn slot(self) -> AbilitySlot {
        match self {
            Self::Attack => AbilitySlot::Attack,
            Self::Active1 => AbilitySlot::Active1,
            Self::Active2 => AbilitySlot::Active2,
        }
    }

    /// Returns the action name of the trigger.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Active1 => "active1",
            Self::Active2 => "active2",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the ability action names. `"selectTile"` carries a cell and is
/// queued as [`InputAction::SelectTile`] instead.
impl FromStr for Trigger {
    type Err = UnknownTrigger;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attack" => Ok(Self::Attack),
            "active1" => Ok(Self::Active1),
            "active2" => Ok(Self::Active2),
            _ => Err(UnknownTrigger(s.to_string())),
        }
    }
}

/// Actions waiting for the next tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionQueue {
    triggers: BTreeSet<Trigger>,
    select: Option<Cell>,
    cancel: bool,
}

impl ActionQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues an action.
    ///
    /// A newer tile click replaces an older one that was not consumed yet.
    pub fn push(&mut self, action: InputAction) {
        match action {
            InputAction::Attack => {
                self.triggers.insert(Trigger::Attack);
            }
            InputAction::Active1 => {
                self.triggers.insert(Trigger::Active1);
            }
            InputAction::Active2 => {
                self.triggers.insert(Trigger::Active2);
            }
            InputAction::SelectTile(cell) => self.select = Some(cell),
            InputAction::CancelSelection => self.cancel = true,
        }
    }

    /// Removes and returns the highest-priority trigger.
    pub fn pop_trigger(&mut self) -> Option<Trigger> {
        self.triggers.pop_first()
    }

    /// Removes and returns the pending tile click.
    pub fn take_select(&mut self) -> Option<Cell> {
        self.select.take()
    }

    /// Removes and returns the pending cancel request.
    pub fn take_cancel(&mut self) -> bool {
        std::mem::take(&mut self.cancel)
    }

    /// Returns true if the trigger is waiting.
    #[must_use]
    pub fn contains(&self, trigger: Trigger) -> bool {
        self.triggers.contains(&trigger)
    }

    /// Returns true if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty() && self.select.is_none() && !self.cancel
    }
}
