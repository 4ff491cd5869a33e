//! Ability dispatch.
//!
//! The [`AbilityManager`] owns the attack, the two active slots and the
//! passive slot of one level. It turns queued triggers into applications,
//! routes selection results to the ability that opened the session, runs
//! the strike pipeline and keeps every ability's applicability current.
//!
//! # Dispatch
//!
//! Each call to [`update`](AbilityManager::update) consumes at most one
//! trigger, the highest-priority one (`attack`, then `active1`, then
//! `active2`). The trigger starts its ability only if the board is unlocked
//! and the ability is `Applicable` at that moment; otherwise it is dropped.
//! Lower-priority triggers stay queued for later ticks.

use rand_chacha::ChaCha8Rng;
use std::fmt;
use tracing::{debug, trace};

use super::{AbilityKind, Attack, PassiveKind};
use crate::board::{Board, Cell};
use crate::config::Loadout;
use crate::entity::Entity;
use crate::error::{ConfigError, LogicError};
use crate::events::{Cue, LevelEvent};
use crate::input::{ActionQueue, Trigger};
use crate::modifier::{AbilitySlot, LevelContext, Modifier, ModifierState, Progress, Strike};
use crate::obstacles::{ObstacleEvent, ObstacleListener};

/// The abilities of one level.
pub struct AbilityManager {
    attack: Attack,
    active1: Option<Box<dyn Modifier>>,
    active2: Option<Box<dyn Modifier>>,
    passive: Option<Box<dyn Modifier>>,
    active_kinds: [Option<AbilityKind>; 2],
    passive_kind: Option<PassiveKind>,
}

impl fmt::Debug for AbilityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbilityManager")
            .field("attack", &self.attack)
            .field("active1", &self.active_kinds[0])
            .field("active2", &self.active_kinds[1])
            .field("passive", &self.passive_kind)
            .finish()
    }
}

impl AbilityManager {
    /// Builds the abilities named by a loadout.
    ///
    /// The passive's cooldown adjustment is applied here; the passive itself
    /// starts in [`start`](Self::start).
    ///
    /// # Arguments
    ///
    /// * `loadout` - Name ids of the chosen abilities
    /// * `base_tile_damage` - Damage of a level-1 tile
    /// * `animation_frames` - Length of ability board animations
    ///
    /// # Errors
    ///
    /// - [`ConfigError::SecondActiveWithoutFirst`] if only the second active
    ///   slot is filled
    /// - [`ConfigError::UnknownAbility`] / [`ConfigError::UnknownPassive`]
    ///   for unrecognised name ids
    /// - [`ConfigError::DuplicateAbility`] if both actives are the same
    pub fn new(loadout: &Loadout, base_tile_damage: i64, animation_frames: u32) -> Result<Self, ConfigError> {
        if let (None, Some(second)) = (&loadout.active1, &loadout.active2) {
            return Err(ConfigError::SecondActiveWithoutFirst(second.clone()));
        }

        let kind1 = loadout.active1.as_deref().map(str::parse::<AbilityKind>).transpose()?;
        let kind2 = loadout.active2.as_deref().map(str::parse::<AbilityKind>).transpose()?;
        let passive_kind = loadout.passive.as_deref().map(str::parse::<PassiveKind>).transpose()?;
        if let (Some(a), Some(b)) = (kind1, kind2) {
            if a == b {
                return Err(ConfigError::DuplicateAbility(a.name_id().to_string()));
            }
        }

        let mut manager = Self {
            attack: Attack::new(base_tile_damage, animation_frames),
            active1: kind1.map(|kind| kind.create(AbilitySlot::Active1, animation_frames)),
            active2: kind2.map(|kind| kind.create(AbilitySlot::Active2, animation_frames)),
            passive: passive_kind.map(PassiveKind::create),
            active_kinds: [kind1, kind2],
            passive_kind,
        };
        manager.apply_cooldown_adjustment();
        Ok(manager)
    }

    fn apply_cooldown_adjustment(&mut self) {
        let Some(passive) = self.passive.as_deref() else {
            return;
        };
        adjust_cooldown(passive, &mut self.attack);
        for ability in [self.active1.as_deref_mut(), self.active2.as_deref_mut()]
            .into_iter()
            .flatten()
        {
            adjust_cooldown(passive, ability);
        }
    }

    /// Computes initial applicability and starts the passive.
    ///
    /// # Errors
    ///
    /// Propagates errors from the passive's start.
    pub fn start(&mut self, ctx: &mut LevelContext<'_>) -> Result<(), LogicError> {
        self.update_applicability(ctx.board, ctx.entity, ctx.events);
        if let Some(passive) = self.passive.as_deref_mut() {
            passive.start_application(ctx)?;
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the attack.
    #[must_use]
    pub fn attack(&self) -> &Attack {
        &self.attack
    }

    /// Returns the ability in a slot, if filled.
    #[must_use]
    pub fn ability(&self, slot: AbilitySlot) -> Option<&dyn Modifier> {
        match slot {
            AbilitySlot::Attack => Some(&self.attack),
            AbilitySlot::Active1 => self.active1.as_deref(),
            AbilitySlot::Active2 => self.active2.as_deref(),
            AbilitySlot::Passive => self.passive.as_deref(),
        }
    }

    /// Returns the state of the ability in a slot, if filled.
    #[must_use]
    pub fn state(&self, slot: AbilitySlot) -> Option<ModifierState> {
        self.ability(slot).map(Modifier::state)
    }

    /// Returns the active kinds in slot order.
    #[must_use]
    pub fn active_kinds(&self) -> [Option<AbilityKind>; 2] {
        self.active_kinds
    }

    /// Returns the passive kind.
    #[must_use]
    pub fn passive_kind(&self) -> Option<PassiveKind> {
        self.passive_kind
    }

    fn slot_mut(&mut self, slot: AbilitySlot) -> Option<&mut (dyn Modifier + 'static)> {
        match slot {
            AbilitySlot::Attack => Some(&mut self.attack),
            AbilitySlot::Active1 => self.active1.as_deref_mut(),
            AbilitySlot::Active2 => self.active2.as_deref_mut(),
            AbilitySlot::Passive => self.passive.as_deref_mut(),
        }
    }

    fn all_mut(&mut self) -> Vec<&mut (dyn Modifier + 'static)> {
        let mut all: Vec<&mut (dyn Modifier + 'static)> = Vec::with_capacity(4);
        all.push(&mut self.attack);
        for ability in [&mut self.active1, &mut self.active2, &mut self.passive]
            .into_iter()
            .flatten()
        {
            all.push(ability.as_mut());
        }
        all
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Consumes the highest-priority trigger and starts its ability if it can.
    ///
    /// # Returns
    ///
    /// The trigger that started an application, if any.
    ///
    /// # Errors
    ///
    /// Propagates errors raised by the started ability.
    pub fn update(
        &mut self,
        queue: &mut ActionQueue,
        ctx: &mut LevelContext<'_>,
    ) -> Result<Option<Trigger>, LogicError> {
        let Some(trigger) = queue.pop_trigger() else {
            return Ok(None);
        };
        let slot = trigger.slot();
        let locked = ctx.board.is_locked();
        let Some(ability) = self.slot_mut(slot) else {
            debug!(%trigger, "trigger dropped: slot is empty");
            return Ok(None);
        };
        if locked || !ability.is_applicable() {
            debug!(%trigger, locked, state = %ability.state(), "trigger dropped");
            return Ok(None);
        }

        debug!(%trigger, name = ability.name_id(), "trigger dispatched");
        if ability.start_application(ctx)? == Progress::Completed {
            self.after_applied(slot, ctx);
        }
        Ok(Some(trigger))
    }

    /// Refreshes every ability and plays the cue for actives.
    fn after_applied(&mut self, slot: AbilitySlot, ctx: &mut LevelContext<'_>) {
        self.update_applicability(ctx.board, ctx.entity, ctx.events);
        if matches!(slot, AbilitySlot::Active1 | AbilitySlot::Active2) {
            ctx.events.push(LevelEvent::Cue(Cue::Ability));
        }
    }

    /// Recomputes applicability of every ability.
    pub fn update_applicability(&mut self, board: &Board, entity: &Entity, events: &mut Vec<LevelEvent>) {
        for ability in self.all_mut() {
            ability.update_applicability(board, entity, events);
        }
    }

    // =========================================================================
    // Board Event Routing
    // =========================================================================

    /// Handles a completed turn: ticks cooldowns, runs turn hooks and
    /// refreshes applicability.
    ///
    /// # Errors
    ///
    /// Propagates errors from ability hooks.
    pub fn on_turn(&mut self, ctx: &mut LevelContext<'_>) -> Result<(), LogicError> {
        for ability in self.all_mut() {
            ability.tick_cooldown();
            trace!(
                name = ability.name_id(),
                remaining = ability.core().cooldown().remaining(),
                "cooldown ticked"
            );
            ability.on_turn(ctx)?;
        }
        self.update_applicability(ctx.board, ctx.entity, ctx.events);
        Ok(())
    }

    /// Forwards the end of a board animation to every ability.
    ///
    /// # Errors
    ///
    /// Propagates errors from ability hooks.
    pub fn on_animation_finished(&mut self, ctx: &mut LevelContext<'_>) -> Result<(), LogicError> {
        for ability in self.all_mut() {
            ability.on_animation_finished(ctx)?;
        }
        Ok(())
    }

    /// Routes a selection update to the session owner.
    ///
    /// # Errors
    ///
    /// Propagates errors from the owner's hook.
    pub fn on_selection_updated(
        &mut self,
        slot: AbilitySlot,
        cells: &[Cell],
        ctx: &mut LevelContext<'_>,
    ) -> Result<(), LogicError> {
        match self.slot_mut(slot) {
            Some(ability) => ability.on_selection_updated(cells, ctx),
            None => Ok(()),
        }
    }

    /// Routes a completed selection to the session owner.
    ///
    /// For the attack this runs the strike pipeline: the strike is offered to
    /// every other ability, then launched.
    ///
    /// # Errors
    ///
    /// Propagates errors from the owner's hook.
    pub fn on_selection_completed(
        &mut self,
        slot: AbilitySlot,
        cells: &[Cell],
        ctx: &mut LevelContext<'_>,
    ) -> Result<(), LogicError> {
        let Some(ability) = self.slot_mut(slot) else {
            return Ok(());
        };
        if ability.on_selection_completed(cells, ctx)? == Progress::Pending {
            return Ok(());
        }

        if slot == AbilitySlot::Attack {
            if let Some(mut strike) = self.attack.take_strike() {
                self.offer_strike(&mut strike, ctx);
                self.attack.launch(strike, ctx);
            }
        }
        if let Some(ability) = self.slot_mut(slot) {
            ability.finish(ctx);
        }
        self.after_applied(slot, ctx);
        Ok(())
    }

    /// Routes an aborted selection to the session owner.
    pub fn on_selection_aborted(&mut self, slot: AbilitySlot, ctx: &mut LevelContext<'_>) {
        if let Some(ability) = self.slot_mut(slot) {
            ability.cancel(ctx);
        }
    }

    fn offer_strike(&mut self, strike: &mut Strike, ctx: &mut LevelContext<'_>) {
        let mut completed = Vec::new();
        let slots = [
            (AbilitySlot::Active1, &mut self.active1),
            (AbilitySlot::Active2, &mut self.active2),
            (AbilitySlot::Passive, &mut self.passive),
        ];
        for (slot, ability) in slots {
            if let Some(ability) = ability {
                if ability.on_strike(strike) == Progress::Completed {
                    ability.finish(ctx);
                    completed.push(slot);
                }
            }
        }
        for slot in completed {
            self.after_applied(slot, ctx);
        }
    }
}

fn adjust_cooldown(passive: &dyn Modifier, ability: &mut dyn Modifier) {
    let duration = passive.adjust_cooldown(ability.core().cooldown().duration());
    ability.core_mut().cooldown_mut().set_duration(duration);
}

impl ObstacleListener for AbilityManager {
    fn on_obstacle_selected(&mut self, event: &mut ObstacleEvent, rng: &mut ChaCha8Rng) {
        for ability in self.all_mut() {
            ability.on_obstacle(event, rng);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
