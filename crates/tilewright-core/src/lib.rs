//! # Tilewright Core
//!
//! Ability, obstacle and cell-selection core for the Tilewright merge puzzle.
//!
//! Player abilities and adversarial obstacles are both modifiers: they share
//! one lifecycle (`Unapplicable` → `Applicable` → `Applying`), tick their
//! cooldowns on completed turns, and change the board or the entity through
//! a borrowed [`LevelContext`](modifier::LevelContext).
//!
//! ## Architecture
//!
//! - **Board**: grid of tiles, interaction state and the cell-selection
//!   protocol abilities use to ask the player for cells
//! - **Modifiers**: the shared state machine, implemented by every ability
//!   and obstacle
//! - **Managers**: the [`AbilityManager`](abilities::AbilityManager) turns
//!   input into applications; the
//!   [`ObstacleManager`](obstacles::ObstacleManager) fires obstacles at a
//!   bounded random interval
//! - **Level**: owns all of the above for one level and pumps board events to
//!   the managers
//!
//! ## Usage
//!
//! ```
//! use tilewright_core::{InputAction, Level, LevelConfig};
//!
//! let config = LevelConfig::from_json_str(r#"{ "seed": 7, "loadout": { "active1": "merge" } }"#)?;
//! let mut level = Level::new(config)?;
//!
//! level.request(InputAction::Attack);
//! level.update()?;
//! level.complete_turn().ok();
//!
//! for event in level.take_events() {
//!     println!("{event:?}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod abilities;
pub mod board;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod input;
pub mod level;
pub mod modifier;
pub mod obstacles;
pub mod weighted;

pub use config::{GameMode, LevelConfig, Loadout};
pub use error::{ConfigError, LevelError, LogicError, UnknownTrigger};
pub use events::{Cue, LevelEvent, LevelOutcome};
pub use input::InputAction;
pub use level::Level;

#[cfg(test)]
mod tests;
