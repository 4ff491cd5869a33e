//! The entity above the board.
//!
//! In [`GameMode::Attack`] the player wins by bringing the entity's health
//! to zero; in [`GameMode::Repair`] they win by healing it to full and lose
//! if it drops to zero. The entity records the first outcome reached and
//! never reports another.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::error::{ConfigError, LogicError};
use crate::events::LevelOutcome;

/// Default number of frames a damage or healing animation lasts.
pub const DEFAULT_ENTITY_ANIMATION_FRAMES: u32 = 20;

/// Win condition of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Bring the entity to zero health.
    #[default]
    Attack,
    /// Heal the entity to full health without letting it die.
    Repair,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => write!(f, "attack"),
            Self::Repair => write!(f, "repair"),
        }
    }
}

/// Animation state of the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EntityState {
    /// Nothing is playing.
    #[default]
    Idle,
    /// A damage or healing animation is playing.
    Animating,
}

/// Health pool with mode-dependent win/lose signalling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    health: i64,
    max_health: i64,
    mode: GameMode,
    state: EntityState,
    animation_frames: u32,
    frames_left: u32,
    outcome: Option<LevelOutcome>,
}

impl Entity {
    /// Creates an entity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHealth`] unless
    /// `0 < health <= max_health`.
    pub fn new(mode: GameMode, max_health: i64, health: i64) -> Result<Self, ConfigError> {
        if max_health <= 0 || health <= 0 || health > max_health {
            return Err(ConfigError::InvalidHealth { health, max_health });
        }
        Ok(Self {
            health,
            max_health,
            mode,
            state: EntityState::Idle,
            animation_frames: DEFAULT_ENTITY_ANIMATION_FRAMES,
            frames_left: 0,
            outcome: None,
        })
    }

    /// Sets how many frames damage and healing animations last.
    #[must_use]
    pub fn with_animation_frames(mut self, frames: u32) -> Self {
        self.animation_frames = frames.max(1);
        self
    }

    /// Returns current health.
    #[must_use]
    pub fn health(&self) -> i64 {
        self.health
    }

    /// Returns maximum health.
    #[must_use]
    pub fn max_health(&self) -> i64 {
        self.max_health
    }

    /// Returns the game mode.
    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Returns the animation state.
    #[must_use]
    pub fn state(&self) -> EntityState {
        self.state
    }

    /// Returns the outcome reached so far.
    #[must_use]
    pub fn outcome(&self) -> Option<LevelOutcome> {
        self.outcome
    }

    /// Reduces health, clamping at zero.
    ///
    /// # Returns
    ///
    /// The level outcome if this call decided the level.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::NegativeAmount`] for a negative amount; health
    /// is left unchanged.
    pub fn take_damage(&mut self, amount: i64) -> Result<Option<LevelOutcome>, LogicError> {
        if amount < 0 {
            return Err(LogicError::NegativeAmount {
                operation: "damage",
                amount,
            });
        }
        self.health = self.health.saturating_sub(amount).max(0);
        if self.health == 0 {
            let outcome = match self.mode {
                GameMode::Attack => LevelOutcome::Won,
                GameMode::Repair => LevelOutcome::Lost,
            };
            return Ok(self.settle(outcome));
        }
        Ok(None)
    }

    /// Increases health, clamping at the maximum.
    ///
    /// # Returns
    ///
    /// The level outcome if this call decided the level.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::NegativeAmount`] for a negative amount; health
    /// is left unchanged.
    pub fn take_healing(&mut self, amount: i64) -> Result<Option<LevelOutcome>, LogicError> {
        if amount < 0 {
            return Err(LogicError::NegativeAmount {
                operation: "heal",
                amount,
            });
        }
        self.health = self.health.saturating_add(amount).min(self.max_health);
        if self.health == self.max_health && self.mode == GameMode::Repair {
            return Ok(self.settle(LevelOutcome::Won));
        }
        Ok(None)
    }

    fn settle(&mut self, outcome: LevelOutcome) -> Option<LevelOutcome> {
        if self.outcome.is_some() {
            return None;
        }
        info!(?outcome, mode = %self.mode, "level decided");
        self.outcome = Some(outcome);
        Some(outcome)
    }

    /// Plays the damage animation. Zero amounts play nothing.
    pub fn animate_damage(&mut self, amount: i64) {
        if amount > 0 {
            self.start_animation();
        }
    }

    /// Plays the healing animation. Zero amounts play nothing.
    pub fn animate_healing(&mut self, amount: i64) {
        if amount > 0 {
            self.start_animation();
        }
    }

    fn start_animation(&mut self) {
        self.state = EntityState::Animating;
        self.frames_left = self.animation_frames;
    }

    /// Advances the animation by one frame.
    pub fn update(&mut self) {
        if self.state == EntityState::Animating {
            self.frames_left = self.frames_left.saturating_sub(1);
            if self.frames_left == 0 {
                self.state = EntityState::Idle;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod health_tests {
        use super::*;

        #[test]
        fn attack_mode_wins_exactly_once() {
            let mut entity = Entity::new(GameMode::Attack, 100, 100).unwrap();
            assert_eq!(entity.take_damage(150), Ok(Some(LevelOutcome::Won)));
            assert_eq!(entity.health(), 0);
            assert_eq!(entity.take_damage(10), Ok(None));
            assert_eq!(entity.outcome(), Some(LevelOutcome::Won));
        }

        #[test]
        fn repair_mode_loses_at_zero() {
            let mut entity = Entity::new(GameMode::Repair, 100, 5).unwrap();
            assert_eq!(entity.take_damage(5), Ok(Some(LevelOutcome::Lost)));
        }

        #[test]
        fn repair_mode_wins_at_full_health() {
            let mut entity = Entity::new(GameMode::Repair, 100, 50).unwrap();
            assert_eq!(entity.take_healing(20), Ok(None));
            assert_eq!(entity.take_healing(500), Ok(Some(LevelOutcome::Won)));
            assert_eq!(entity.health(), 100);
        }

        #[test]
        fn healing_in_attack_mode_only_clamps() {
            let mut entity = Entity::new(GameMode::Attack, 100, 90).unwrap();
            assert_eq!(entity.take_healing(30), Ok(None));
            assert_eq!(entity.health(), 100);
        }

        #[test]
        fn negative_damage_is_rejected() {
            let mut entity = Entity::new(GameMode::Attack, 100, 60).unwrap();
            assert_eq!(
                entity.take_damage(-5),
                Err(LogicError::NegativeAmount {
                    operation: "damage",
                    amount: -5
                })
            );
            assert_eq!(entity.health(), 60);
        }

        #[test]
        fn negative_healing_is_rejected() {
            let mut entity = Entity::new(GameMode::Repair, 100, 60).unwrap();
            assert!(entity.take_healing(-1).is_err());
            assert_eq!(entity.health(), 60);
        }

        #[test]
        fn invalid_health_is_a_config_error() {
            assert!(Entity::new(GameMode::Attack, 0, 0).is_err());
            assert!(Entity::new(GameMode::Attack, 10, 11).is_err());
            assert!(Entity::new(GameMode::Repair, 10, 0).is_err());
        }
    }

    mod animation_tests {
        use super::*;

        #[test]
        fn animation_counts_down_to_idle() {
            let mut entity = Entity::new(GameMode::Attack, 10, 10)
                .unwrap()
                .with_animation_frames(2);
            entity.animate_damage(3);
            assert_eq!(entity.state(), EntityState::Animating);
            entity.update();
            assert_eq!(entity.state(), EntityState::Animating);
            entity.update();
            assert_eq!(entity.state(), EntityState::Idle);
        }

        #[test]
        fn zero_amount_does_not_animate() {
            let mut entity = Entity::new(GameMode::Attack, 10, 10).unwrap();
            entity.animate_healing(0);
            assert_eq!(entity.state(), EntityState::Idle);
        }
    }
}
