//! The shared modifier abstraction.
//!
//! Abilities and obstacles are both *modifiers*: timed effects with a
//! cooldown, an applicability predicate and a three-state lifecycle.
//!
//! ```text
//!                 cooldown == 0 && predicate
//!  Unapplicable ──────────────────────────────▶ Applicable
//!       ▲         ◀──────────────────────────        │
//!       │              otherwise                     │ start_application
//!       │                                            ▼
//!       └──────── finish (cooldown reset) ◀──── Applying
//! ```
//!
//! Concrete modifiers implement [`Modifier`]: they hold a [`ModifierCore`]
//! and provide [`Modifier::begin`] plus whichever hooks they need. The
//! provided methods ([`Modifier::update_applicability`],
//! [`Modifier::start_application`], [`Modifier::finish`],
//! [`Modifier::cancel`]) implement the lifecycle and must not be
//! overridden.
//!
//! Modifiers never keep references to the board or entity. Each call
//! borrows them through a [`LevelContext`] for its duration only.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, trace};

use crate::board::{Board, Cell};
use crate::entity::Entity;
use crate::error::LogicError;
use crate::events::LevelEvent;
use crate::obstacles::{ObstacleEvent, ObstacleKind};

// =============================================================================
// Identity and State
// =============================================================================

/// Lifecycle state of a modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModifierState {
    /// Cooling down, or the predicate does not hold.
    #[default]
    Unapplicable,
    /// Ready to start.
    Applicable,
    /// An application is in progress.
    Applying,
}

impl fmt::Display for ModifierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unapplicable => write!(f, "Unapplicable"),
            Self::Applicable => write!(f, "Applicable"),
            Self::Applying => write!(f, "Applying"),
        }
    }
}

/// Ability slot in a player's loadout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AbilitySlot {
    /// The built-in attack.
    Attack,
    /// First active ability.
    Active1,
    /// Second active ability.
    Active2,
    /// Passive ability.
    Passive,
}

impl fmt::Display for AbilitySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => write!(f, "attack"),
            Self::Active1 => write!(f, "active1"),
            Self::Active2 => write!(f, "active2"),
            Self::Passive => write!(f, "passive"),
        }
    }
}

/// Identifies a modifier within a level.
///
/// Abilities are identified by their slot and obstacles by their kind, both
/// of which are unique per level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModifierId {
    /// An ability in a loadout slot.
    Ability(AbilitySlot),
    /// An obstacle in the level's weight table.
    Obstacle(ObstacleKind),
}

impl ModifierId {
    /// Returns true for player abilities.
    #[must_use]
    pub const fn is_ability(self) -> bool {
        matches!(self, Self::Ability(_))
    }
}

impl fmt::Display for ModifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ability(slot) => write!(f, "ability:{slot}"),
            Self::Obstacle(kind) => write!(f, "obstacle:{kind}"),
        }
    }
}

// =============================================================================
// Cooldown
// =============================================================================

/// Turn-based cooldown.
///
/// A fresh cooldown is ready. [`reset`](Self::reset) sets the remaining
/// turns to the full duration and [`tick`](Self::tick) counts down once per
/// turn, never below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cooldown {
    duration: u32,
    remaining: u32,
}

impl Cooldown {
    /// Creates a ready cooldown of `duration` turns.
    #[must_use]
    pub const fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: 0,
        }
    }

    /// Returns the full duration.
    #[must_use]
    pub const fn duration(&self) -> u32 {
        self.duration
    }

    /// Returns the turns left before the modifier is ready.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Returns true once no turns remain.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.remaining == 0
    }

    /// Counts down one turn.
    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// Restarts the cooldown at its full duration.
    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }

    /// Changes the full duration. Remaining turns never exceed it.
    pub fn set_duration(&mut self, duration: u32) {
        self.duration = duration;
        self.remaining = self.remaining.min(duration);
    }
}

// =============================================================================
// Modifier Core
// =============================================================================

/// State shared by every modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierCore {
    id: ModifierId,
    name_id: &'static str,
    state: ModifierState,
    cooldown: Cooldown,
}

impl ModifierCore {
    /// Creates an unapplicable core with a ready cooldown.
    #[must_use]
    pub const fn new(id: ModifierId, name_id: &'static str, cooldown: u32) -> Self {
        Self {
            id,
            name_id,
            state: ModifierState::Unapplicable,
            cooldown: Cooldown::new(cooldown),
        }
    }

    /// Returns the modifier id.
    #[must_use]
    pub const fn id(&self) -> ModifierId {
        self.id
    }

    /// Returns the name id.
    #[must_use]
    pub const fn name_id(&self) -> &'static str {
        self.name_id
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ModifierState {
        self.state
    }

    /// Returns the cooldown.
    #[must_use]
    pub const fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    /// Returns the cooldown for adjustment.
    pub fn cooldown_mut(&mut self) -> &mut Cooldown {
        &mut self.cooldown
    }

    fn set_state(&mut self, state: ModifierState, events: &mut Vec<LevelEvent>) {
        if self.state != state {
            trace!(id = %self.id, from = %self.state, to = %state, "modifier state changed");
            self.state = state;
            events.push(LevelEvent::ApplicabilityChanged { id: self.id, state });
        }
    }
}

// =============================================================================
// Application Context
// =============================================================================

/// Whether an application finished during a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The application continues (awaiting a selection, a strike, ...).
    Pending,
    /// The application is complete.
    Completed,
}

/// Damage packet of one attack.
///
/// Other abilities may add percentage bonuses before the strike lands.
/// Bonuses add up: two +50 % bonuses make +100 %.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strike {
    origin: Cell,
    level: u8,
    base_damage: i64,
    bonus_percent: i64,
}

impl Strike {
    /// Creates a strike without bonuses.
    #[must_use]
    pub const fn new(origin: Cell, level: u8, base_damage: i64) -> Self {
        Self {
            origin,
            level,
            base_damage,
            bonus_percent: 0,
        }
    }

    /// Returns the cell the attacking tile was taken from.
    #[must_use]
    pub const fn origin(&self) -> Cell {
        self.origin
    }

    /// Returns the level of the attacking tile.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Returns the damage before bonuses.
    #[must_use]
    pub const fn base_damage(&self) -> i64 {
        self.base_damage
    }

    /// Returns the accumulated bonus in percent.
    #[must_use]
    pub const fn bonus_percent(&self) -> i64 {
        self.bonus_percent
    }

    /// Adds a percentage bonus.
    pub fn add_bonus_percent(&mut self, percent: i64) {
        self.bonus_percent = self.bonus_percent.saturating_add(percent);
    }

    /// Returns the final damage, never negative. Saturates at `i64::MAX`.
    #[must_use]
    pub fn damage(&self) -> i64 {
        let percent = self.bonus_percent.saturating_add(100);
        (self.base_damage.saturating_mul(percent) / 100).max(0)
    }
}

/// Mutable level state lent to a modifier for one call.
pub struct LevelContext<'a> {
    /// The board.
    pub board: &'a mut Board,
    /// The entity.
    pub entity: &'a mut Entity,
    /// The level's random source.
    pub rng: &'a mut ChaCha8Rng,
    /// The level's event log.
    pub events: &'a mut Vec<LevelEvent>,
}

impl fmt::Debug for LevelContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelContext")
            .field("board", &self.board)
            .field("entity", &self.entity)
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Modifier Trait
// =============================================================================

/// A timed effect with a cooldown and an applicability predicate.
///
/// # Required Methods
///
/// - [`core`](Self::core) / [`core_mut`](Self::core_mut): the shared state
/// - [`begin`](Self::begin): the effect itself
///
/// Every hook has a no-op default; implement only those the effect needs.
pub trait Modifier {
    /// Returns the shared state.
    fn core(&self) -> &ModifierCore;

    /// Returns the shared state mutably.
    fn core_mut(&mut self) -> &mut ModifierCore;

    /// Context-dependent part of applicability. Defaults to always true.
    fn predicate(&self, board: &Board, entity: &Entity) -> bool {
        let _ = (board, entity);
        true
    }

    /// Runs the effect after the state has moved to `Applying`.
    ///
    /// # Errors
    ///
    /// Propagates board or entity contract violations.
    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError>;

    /// Called when the modifier's selection session accepts a cell.
    ///
    /// # Errors
    ///
    /// Propagates board contract violations.
    fn on_selection_updated(
        &mut self,
        cells: &[Cell],
        ctx: &mut LevelContext<'_>,
    ) -> Result<(), LogicError> {
        let _ = (cells, ctx);
        Ok(())
    }

    /// Called when the modifier's selection session completes.
    ///
    /// # Errors
    ///
    /// Propagates board contract violations.
    fn on_selection_completed(
        &mut self,
        cells: &[Cell],
        ctx: &mut LevelContext<'_>,
    ) -> Result<Progress, LogicError> {
        let _ = (cells, ctx);
        Ok(Progress::Completed)
    }

    /// Called once per board turn, after the cooldown tick.
    ///
    /// # Errors
    ///
    /// Propagates board contract violations.
    fn on_turn(&mut self, ctx: &mut LevelContext<'_>) -> Result<(), LogicError> {
        let _ = ctx;
        Ok(())
    }

    /// Called when a board animation finishes.
    ///
    /// # Errors
    ///
    /// Propagates board or entity contract violations.
    fn on_animation_finished(&mut self, ctx: &mut LevelContext<'_>) -> Result<(), LogicError> {
        let _ = ctx;
        Ok(())
    }

    /// Offered every strike before it lands.
    ///
    /// # Returns
    ///
    /// [`Progress::Completed`] if this strike completes the modifier's
    /// application.
    fn on_strike(&mut self, strike: &mut Strike) -> Progress {
        let _ = strike;
        Progress::Pending
    }

    /// Offered every obstacle the scheduler selects; may veto it by clearing
    /// the event.
    fn on_obstacle(&mut self, event: &mut ObstacleEvent, rng: &mut ChaCha8Rng) {
        let _ = (event, rng);
    }

    /// Adjusts the cooldown of other abilities in the same loadout.
    fn adjust_cooldown(&self, duration: u32) -> u32 {
        duration
    }

    // -------------------------------------------------------------------------
    // Provided lifecycle
    // -------------------------------------------------------------------------

    /// Returns the modifier id.
    fn id(&self) -> ModifierId {
        self.core().id()
    }

    /// Returns the name id.
    fn name_id(&self) -> &'static str {
        self.core().name_id()
    }

    /// Returns the lifecycle state.
    fn state(&self) -> ModifierState {
        self.core().state()
    }

    /// Returns true if the modifier can start now.
    fn is_applicable(&self) -> bool {
        self.state() == ModifierState::Applicable
    }

    /// Recomputes applicability from cooldown and predicate.
    ///
    /// A modifier that is `Applying` keeps its state.
    fn update_applicability(&mut self, board: &Board, entity: &Entity, events: &mut Vec<LevelEvent>) {
        if self.state() == ModifierState::Applying {
            return;
        }
        let state = if self.core().cooldown().is_ready() && self.predicate(board, entity) {
            ModifierState::Applicable
        } else {
            ModifierState::Unapplicable
        };
        self.core_mut().set_state(state, events);
    }

    /// Counts the cooldown down by one turn.
    fn tick_cooldown(&mut self) {
        self.core_mut().cooldown_mut().tick();
    }

    /// Starts an application.
    ///
    /// If the effect completes immediately, [`finish`](Self::finish) has
    /// already run when this returns.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::NotApplicable`] unless the modifier is
    /// `Applicable`, and propagates errors raised by the effect (the
    /// modifier is then cancelled).
    fn start_application(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        if !self.is_applicable() {
            return Err(LogicError::NotApplicable {
                id: self.id(),
                name: self.name_id(),
                state: self.state(),
            });
        }
        debug!(id = %self.id(), name = self.name_id(), "application started");
        self.core_mut().set_state(ModifierState::Applying, ctx.events);
        match self.begin(ctx) {
            Ok(Progress::Completed) => {
                self.finish(ctx);
                Ok(Progress::Completed)
            }
            Ok(Progress::Pending) => Ok(Progress::Pending),
            Err(err) => {
                self.cancel(ctx);
                Err(err)
            }
        }
    }

    /// Completes the running application.
    ///
    /// Resets the cooldown, leaves `Applying`, and only then records the
    /// applied event.
    fn finish(&mut self, ctx: &mut LevelContext<'_>) {
        self.core_mut().cooldown_mut().reset();
        self.core_mut().set_state(ModifierState::Unapplicable, ctx.events);
        self.update_applicability(ctx.board, ctx.entity, ctx.events);
        info!(id = %self.id(), name = self.name_id(), "modifier applied");
        ctx.events.push(LevelEvent::ModifierApplied {
            id: self.id(),
            name: self.name_id(),
        });
    }

    /// Abandons the running application without touching the cooldown.
    fn cancel(&mut self, ctx: &mut LevelContext<'_>) {
        if self.state() != ModifierState::Applying {
            return;
        }
        debug!(id = %self.id(), name = self.name_id(), "application cancelled");
        self.core_mut().set_state(ModifierState::Unapplicable, ctx.events);
        self.update_applicability(ctx.board, ctx.entity, ctx.events);
    }
}

// =============================================================================
// Tests
// =============================================================================
