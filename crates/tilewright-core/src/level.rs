//! The per-level session.
//!
//! A [`Level`] owns everything one level needs: the board, the entity, both
//! modifier managers, the seeded RNG, the pending input and the event log.
//! Nothing outlives it and nothing is shared between levels.
//!
//! # Tick Order
//!
//! Each call to [`Level::update`] runs, in order:
//!
//! 1. **ANIMATE**: board and entity animations advance one frame.
//! 2. **CANCEL**: a queued cancel aborts the running selection.
//! 3. **SELECT**: a queued tile click is offered to the running selection.
//! 4. **DISPATCH**: the ability manager consumes at most one trigger.
//! 5. **REFRESH**: every modifier recomputes applicability.
//! 6. **DECIDE**: the first win or loss is recorded.
//!
//! Board events are pumped to the managers after every phase that can
//! produce them, so a modifier always sees the consequences of the previous
//! phase.
//!
//! # Determinism
//!
//! The RNG is a [`ChaCha8Rng`] seeded from the configuration. Given the same
//! configuration and the same sequence of calls, a level records the same
//! events.
//!
//! # Example
//!
//! ```
//! use tilewright_core::config::LevelConfig;
//! use tilewright_core::input::InputAction;
//! use tilewright_core::level::Level;
//!
//! let mut level = Level::new(LevelConfig::default()).unwrap();
//! level.request(InputAction::Attack);
//! level.update().unwrap();
//! assert!(level.board().selection().is_some());
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::abilities::AbilityManager;
use crate::board::{Board, BoardEvent, BoardState, Cell};
use crate::config::LevelConfig;
use crate::entity::Entity;
use crate::error::{LevelError, LogicError};
use crate::events::{LevelEvent, LevelOutcome};
use crate::input::{ActionQueue, InputAction};
use crate::modifier::{LevelContext, ModifierId};
use crate::obstacles::ObstacleManager;

/// Lends the level's board, entity, RNG and event log to one modifier call.
macro_rules! context {
    ($level:ident) => {
        LevelContext {
            board: &mut $level.board,
            entity: &mut $level.entity,
            rng: &mut $level.rng,
            events: &mut $level.events,
        }
    };
}

/// All state of one running level.
#[derive(Debug)]
pub struct Level {
    config: LevelConfig,
    board: Board,
    entity: Entity,
    abilities: AbilityManager,
    obstacles: ObstacleManager,
    actions: ActionQueue,
    rng: ChaCha8Rng,
    events: Vec<LevelEvent>,
    outcome: Option<LevelOutcome>,
}

impl Level {
    /// Builds a level from its configuration.
    ///
    /// The configuration is validated, the board is filled with its initial
    /// tiles, the passive starts applying and the obstacle scheduler makes
    /// its opening attempt.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::Config`] if the configuration is rejected. No
    /// partial level is produced.
    pub fn new(config: LevelConfig) -> Result<Self, LevelError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut board = Board::new(config.rows, config.cols, config.max_tile_level)?;
        board.set_base_level(config.base_tile_level);
        for _ in 0..config.initial_tiles {
            board.generate_random_tile(&mut rng);
        }

        let entity = Entity::new(config.mode, config.max_health, config.starting_health())?
            .with_animation_frames(config.animation.entity_frames);
        let abilities = AbilityManager::new(
            &config.loadout,
            config.base_tile_damage,
            config.animation.board_frames,
        )?;
        let obstacles = ObstacleManager::new(
            &config.obstacle_weights,
            config.min_interval,
            config.max_interval,
            config.animation.board_frames,
        )?;

        let mut level = Self {
            config,
            board,
            entity,
            abilities,
            obstacles,
            actions: ActionQueue::new(),
            rng,
            events: Vec::new(),
            outcome: None,
        };
        level.start()?;
        info!(
            rows = level.config.rows,
            cols = level.config.cols,
            mode = %level.config.mode,
            seed = level.config.seed,
            "level started"
        );
        Ok(level)
    }

    fn start(&mut self) -> Result<(), LogicError> {
        let mut ctx = context!(self);
        self.abilities.start(&mut ctx)?;
        self.obstacles.start(&mut ctx, &mut self.abilities)?;
        self.pump()?;
        self.refresh();
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the configuration the level was built from.
    #[must_use]
    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Returns the board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the board for setup.
    ///
    /// Changes made here are not seen by modifiers until the next
    /// [`update`](Self::update) refreshes applicability.
    #[must_use]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Returns the entity.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Returns the ability manager.
    #[must_use]
    pub fn abilities(&self) -> &AbilityManager {
        &self.abilities
    }

    /// Returns the obstacle manager.
    #[must_use]
    pub fn obstacles(&self) -> &ObstacleManager {
        &self.obstacles
    }

    /// Returns how the level ended, if it has.
    #[must_use]
    pub fn outcome(&self) -> Option<LevelOutcome> {
        self.outcome
    }

    /// Returns true once the level is decided.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    // =========================================================================
    // Host Interface
    // =========================================================================

    /// Queues a player action for the next [`update`](Self::update).
    pub fn request(&mut self, action: InputAction) {
        trace!(?action, "action requested");
        self.actions.push(action);
    }

    /// Drains the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.events)
    }

    /// Records a completed player move.
    ///
    /// Cooldowns tick, turn hooks run and the obstacle scheduler rolls.
    /// Once the level is decided the turn no longer advances.
    ///
    /// # Returns
    ///
    /// The new turn counter, or the unchanged one after the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::BoardLocked`] unless the board is idle, and
    /// propagates errors raised by modifier hooks.
    pub fn complete_turn(&mut self) -> Result<u64, LogicError> {
        self.decide();
        if self.is_over() {
            debug!(turn = self.board.turn(), "turn ignored: level is over");
            return Ok(self.board.turn());
        }
        let turn = self.board.complete_turn()?;
        self.pump()?;
        self.refresh();
        self.decide();
        Ok(turn)
    }

    /// Spawns a tile in a random empty cell.
    ///
    /// # Returns
    ///
    /// The cell that received the tile, or `None` if the board is full.
    pub fn generate_tile(&mut self) -> Option<Cell> {
        let cell = self.board.generate_random_tile(&mut self.rng);
        self.refresh();
        cell
    }

    /// Runs one tick.
    ///
    /// Once the level is decided, animations still advance but queued
    /// actions are dropped.
    ///
    /// # Errors
    ///
    /// Propagates contract violations raised by the board or by modifiers,
    /// including [`LogicError::CellOutOfBounds`] for a click off the board.
    pub fn update(&mut self) -> Result<(), LogicError> {
        self.board.update();
        self.entity.update();
        self.pump()?;
        self.decide();

        if self.is_over() {
            self.actions = ActionQueue::new();
        } else {
            self.handle_input()?;
        }

        self.refresh();
        self.decide();
        Ok(())
    }

    fn handle_input(&mut self) -> Result<(), LogicError> {
        if self.actions.take_cancel() {
            if let Some(owner) = self.board.abort_selection() {
                debug!(%owner, "selection cancelled");
            }
            self.pump()?;
        }

        if let Some(cell) = self.actions.take_select() {
            if self.board.state() == BoardState::Selecting {
                let outcome = self.board.select(cell)?;
                trace!(%cell, ?outcome, "tile clicked");
                self.pump()?;
            } else {
                debug!(%cell, "click ignored: no selection running");
            }
        }

        let mut ctx = context!(self);
        self.abilities.update(&mut self.actions, &mut ctx)?;
        self.pump()
    }

    // =========================================================================
    // Event Pump
    // =========================================================================

    /// Delivers queued board events to the managers until none are left.
    fn pump(&mut self) -> Result<(), LogicError> {
        while let Some(event) = self.board.pop_event() {
            trace!(?event, "board event");
            let mut ctx = context!(self);
            match event {
                BoardEvent::TurnAdvanced { turn } => {
                    debug!(turn, "turn advanced");
                    self.abilities.on_turn(&mut ctx)?;
                    self.obstacles.on_turn(&mut ctx, &mut self.abilities)?;
                }
                BoardEvent::StateChanged {
                    from: BoardState::Animating,
                    to: BoardState::Idle,
                } => {
                    self.abilities.on_animation_finished(&mut ctx)?;
                    self.obstacles.on_animation_finished(&mut ctx)?;
                }
                BoardEvent::StateChanged { .. } => {}
                BoardEvent::SelectionUpdated { owner, cells } => {
                    if let ModifierId::Ability(slot) = owner {
                        self.abilities.on_selection_updated(slot, &cells, &mut ctx)?;
                    }
                    ctx.events.push(LevelEvent::SelectionUpdated { owner, cells });
                }
                BoardEvent::SelectionCompleted { owner, cells } => {
                    if let ModifierId::Ability(slot) = owner {
                        self.abilities.on_selection_completed(slot, &cells, &mut ctx)?;
                    }
                }
                BoardEvent::SelectionAborted { owner } => {
                    if let ModifierId::Ability(slot) = owner {
                        self.abilities.on_selection_aborted(slot, &mut ctx);
                    }
                    ctx.events.push(LevelEvent::SelectionAborted { owner });
                }
            }
        }
        Ok(())
    }

    fn refresh(&mut self) {
        self.abilities
            .update_applicability(&self.board, &self.entity, &mut self.events);
        self.obstacles
            .update_applicability(&self.board, &self.entity, &mut self.events);
    }

    fn decide(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        if let Some(outcome) = self.entity.outcome() {
            info!(?outcome, turn = self.board.turn(), "level over");
            self.outcome = Some(outcome);
            self.events.push(LevelEvent::Outcome(outcome));
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
