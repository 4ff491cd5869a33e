//! Obstacle scheduling.
//!
//! The [`ObstacleManager`] decides after every turn whether an obstacle
//! fires, and which one.
//!
//! # Scheduling
//!
//! Let `elapsed` be the turns since the last obstacle fired (or was
//! blocked). Each attempt:
//!
//! 1. does nothing while `elapsed < min_interval`;
//! 2. rolls *trigger* (weight 1) against *no trigger* (weight
//!    `max_interval + 1 - elapsed`, clamped at zero), so a trigger becomes
//!    more likely every turn and is certain once `elapsed >= max_interval`;
//! 3. on trigger, draws obstacles by weight from a scratch copy of the
//!    table, discarding each one that is not applicable, until an applicable
//!    one turns up or none are left;
//! 4. offers the pick to the listener, which may veto it;
//! 5. starts the obstacle (or records the veto) and resets `elapsed`.
//!
//! If every candidate was discarded in step 3, `elapsed` is left alone, so
//! once past the maximum interval the next attempt is guaranteed to roll a
//! trigger again.

use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

use super::ObstacleKind;
use crate::board::Board;
use crate::entity::Entity;
use crate::error::{ConfigError, LogicError};
use crate::events::{Cue, LevelEvent};
use crate::modifier::{LevelContext, Modifier};
use crate::weighted::{weighted_choice, weighted_choice_clamped};

// =============================================================================
// Obstacle Event and Listener
// =============================================================================

/// An obstacle chosen by the scheduler, offered to listeners before it
/// starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleEvent {
    obstacle: Option<ObstacleKind>,
}

impl ObstacleEvent {
    /// Wraps a chosen obstacle.
    #[must_use]
    pub const fn new(obstacle: ObstacleKind) -> Self {
        Self {
            obstacle: Some(obstacle),
        }
    }

    /// Returns the obstacle, or `None` once blocked.
    #[must_use]
    pub const fn obstacle(&self) -> Option<ObstacleKind> {
        self.obstacle
    }

    /// Vetoes the obstacle.
    pub fn block(&mut self) {
        self.obstacle = None;
    }
}

/// Receives every obstacle the scheduler picks.
pub trait ObstacleListener {
    /// Inspects, and possibly blocks, the chosen obstacle.
    fn on_obstacle_selected(&mut self, event: &mut ObstacleEvent, rng: &mut ChaCha8Rng);
}

/// Listener that lets every obstacle through, for hosts that drive the
/// scheduler without an ability loadout.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoListener;

impl ObstacleListener for NoListener {
    fn on_obstacle_selected(&mut self, _event: &mut ObstacleEvent, _rng: &mut ChaCha8Rng) {}
}

// =============================================================================
// Obstacle Manager
// =============================================================================

/// Weighted, interval-bounded obstacle scheduler.
pub struct ObstacleManager {
    obstacles: Vec<(Box<dyn Modifier>, u32)>,
    kinds: Vec<ObstacleKind>,
    min_interval: u32,
    max_interval: u32,
    turns_elapsed: u32,
    latest_obstacle: Option<ObstacleKind>,
    blocked_count: u32,
}

impl fmt::Debug for ObstacleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table: Vec<(ObstacleKind, u32)> = self
            .kinds
            .iter()
            .copied()
            .zip(self.obstacles.iter().map(|(_, weight)| *weight))
            .collect();
        f.debug_struct("ObstacleManager")
            .field("table", &table)
            .field("min_interval", &self.min_interval)
            .field("max_interval", &self.max_interval)
            .field("turns_elapsed", &self.turns_elapsed)
            .field("latest_obstacle", &self.latest_obstacle)
            .field("blocked_count", &self.blocked_count)
            .finish()
    }
}

impl ObstacleManager {
    /// Builds the manager from a name-id weight table.
    ///
    /// No obstacle is attempted yet; call [`start`](Self::start) once the
    /// rest of the level exists.
    ///
    /// # Arguments
    ///
    /// * `weights` - Obstacle name id to relative weight
    /// * `min_interval` - Minimum turns between obstacles
    /// * `max_interval` - Turns after which an obstacle is certain
    /// * `animation_frames` - Length of obstacle board animations
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnknownObstacle`] for an unrecognised name id
    /// - [`ConfigError::InvalidInterval`] if `min_interval > max_interval`
    pub fn new(
        weights: &BTreeMap<String, u32>,
        min_interval: u32,
        max_interval: u32,
        animation_frames: u32,
    ) -> Result<Self, ConfigError> {
        if min_interval > max_interval {
            return Err(ConfigError::InvalidInterval {
                min: min_interval,
                max: max_interval,
            });
        }

        let mut table: Vec<(ObstacleKind, u32)> = weights
            .iter()
            .map(|(name, weight)| name.parse::<ObstacleKind>().map(|kind| (kind, *weight)))
            .collect::<Result<_, _>>()?;
        table.sort_by_key(|(kind, _)| *kind);

        let kinds = table.iter().map(|(kind, _)| *kind).collect();
        let obstacles = table
            .into_iter()
            .map(|(kind, weight)| (kind.create(animation_frames), weight))
            .collect();

        Ok(Self {
            obstacles,
            kinds,
            min_interval,
            max_interval,
            turns_elapsed: 0,
            latest_obstacle: None,
            blocked_count: 0,
        })
    }

    /// Refreshes applicability and makes the level's opening attempt.
    ///
    /// # Errors
    ///
    /// Propagates errors from the started obstacle.
    pub fn start(
        &mut self,
        ctx: &mut LevelContext<'_>,
        listener: &mut dyn ObstacleListener,
    ) -> Result<Option<ObstacleKind>, LogicError> {
        self.update_applicability(ctx.board, ctx.entity, ctx.events);
        self.attempt(ctx, listener)
    }

    /// Returns the obstacles in table order.
    #[must_use]
    pub fn kinds(&self) -> &[ObstacleKind] {
        &self.kinds
    }

    /// Returns the obstacle of a kind, if the level uses it.
    #[must_use]
    pub fn obstacle(&self, kind: ObstacleKind) -> Option<&dyn Modifier> {
        let index = self.kinds.iter().position(|k| *k == kind)?;
        Some(self.obstacles[index].0.as_ref())
    }

    /// Returns the turns since the last obstacle fired or was blocked.
    #[must_use]
    pub fn turns_elapsed(&self) -> u32 {
        self.turns_elapsed
    }

    /// Returns the most recent pick, or `None` if nothing fired yet or the
    /// last pick was blocked.
    #[must_use]
    pub fn latest_obstacle(&self) -> Option<ObstacleKind> {
        self.latest_obstacle
    }

    /// Returns how many picks were blocked by listeners.
    #[must_use]
    pub fn blocked_count(&self) -> u32 {
        self.blocked_count
    }

    /// Recomputes applicability of every obstacle.
    pub fn update_applicability(&mut self, board: &Board, entity: &Entity, events: &mut Vec<LevelEvent>) {
        for (obstacle, _) in &mut self.obstacles {
            obstacle.update_applicability(board, entity, events);
        }
    }

    /// Handles a completed turn: ticks cooldowns, runs turn hooks, refreshes
    /// applicability, then attempts an obstacle.
    ///
    /// # Returns
    ///
    /// The obstacle that fired, if any.
    ///
    /// # Errors
    ///
    /// Propagates errors from obstacle hooks.
    pub fn on_turn(
        &mut self,
        ctx: &mut LevelContext<'_>,
        listener: &mut dyn ObstacleListener,
    ) -> Result<Option<ObstacleKind>, LogicError> {
        for (obstacle, _) in &mut self.obstacles {
            obstacle.tick_cooldown();
            obstacle.on_turn(ctx)?;
        }
        self.update_applicability(ctx.board, ctx.entity, ctx.events);
        self.turns_elapsed += 1;
        self.attempt(ctx, listener)
    }

    /// Forwards the end of a board animation to every obstacle.
    ///
    /// # Errors
    ///
    /// Propagates errors from obstacle hooks.
    pub fn on_animation_finished(&mut self, ctx: &mut LevelContext<'_>) -> Result<(), LogicError> {
        for (obstacle, _) in &mut self.obstacles {
            obstacle.on_animation_finished(ctx)?;
        }
        Ok(())
    }

    fn no_trigger_weight(&self) -> i64 {
        if self.turns_elapsed >= self.max_interval {
            0
        } else {
            i64::from(self.max_interval) + 1 - i64::from(self.turns_elapsed)
        }
    }

    fn attempt(
        &mut self,
        ctx: &mut LevelContext<'_>,
        listener: &mut dyn ObstacleListener,
    ) -> Result<Option<ObstacleKind>, LogicError> {
        if self.turns_elapsed < self.min_interval {
            return Ok(None);
        }

        let no_trigger = self.no_trigger_weight();
        let roll = weighted_choice_clamped(ctx.rng, &[(true, 1), (false, no_trigger)]);
        debug!(elapsed = self.turns_elapsed, no_trigger, triggered = ?roll, "obstacle roll");
        if roll != Some(true) {
            return Ok(None);
        }

        let Some(index) = self.pick_applicable(ctx.rng) else {
            debug!(elapsed = self.turns_elapsed, "no applicable obstacle");
            return Ok(None);
        };
        let kind = self.kinds[index];

        let mut event = ObstacleEvent::new(kind);
        listener.on_obstacle_selected(&mut event, ctx.rng);
        self.latest_obstacle = event.obstacle();
        self.turns_elapsed = 0;

        if event.obstacle().is_some() {
            info!(obstacle = %kind, "obstacle triggered");
            self.obstacles[index].0.start_application(ctx)?;
            ctx.events.push(LevelEvent::ObstacleTriggered { kind });
            ctx.events.push(LevelEvent::Cue(Cue::Obstacle));
            Ok(Some(kind))
        } else {
            info!(obstacle = %kind, "obstacle blocked");
            self.blocked_count += 1;
            ctx.events.push(LevelEvent::ObstacleBlocked { kind });
            ctx.events.push(LevelEvent::Cue(Cue::ObstacleBlocked));
            Ok(None)
        }
    }

    fn pick_applicable(&self, rng: &mut ChaCha8Rng) -> Option<usize> {
        let mut candidates: Vec<(usize, u32)> = self
            .obstacles
            .iter()
            .enumerate()
            .map(|(index, (_, weight))| (index, *weight))
            .collect();
        loop {
            let index = weighted_choice(rng, &candidates)?;
            if self.obstacles[index].0.is_applicable() {
                return Some(index);
            }
            candidates.retain(|(candidate, _)| *candidate != index);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
