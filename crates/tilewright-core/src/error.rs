//! Error types for level construction and modifier/board contracts.
//!
//! Two families exist:
//!
//! - [`ConfigError`]: fatal problems detected while building a level
//!   (unknown name ids, impossible intervals, bad board sizes). No partial
//!   level or manager is ever produced when one of these is returned.
//! - [`LogicError`]: call-discipline violations such as starting a modifier
//!   that is not applicable or damaging with a negative amount. Correct
//!   callers never see these during play, but they are surfaced as `Err`
//!   (never clamped or ignored) so tests can detect them.
//!
//! [`LevelError`] wraps both for [`Level`](crate::level::Level), which can
//! fail either way.
//!
//! Expected no-op outcomes (a discarded input trigger, an obstacle attempt
//! with no eligible candidate, a rejected selection click) are not errors and
//! have no variant here.

use thiserror::Error;

use crate::board::Cell;
use crate::modifier::{ModifierId, ModifierState};

/// Errors raised while validating a level configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An active ability name id did not match any known ability.
    #[error("active ability '{0}' does not exist")]
    UnknownAbility(String),

    /// A passive ability name id did not match any known passive.
    #[error("passive ability '{0}' does not exist")]
    UnknownPassive(String),

    /// An obstacle name id did not match any known obstacle.
    #[error("obstacle '{0}' does not exist")]
    UnknownObstacle(String),

    /// The second active slot was filled while the first is empty.
    #[error("active ability '{0}' passed into the second slot while the first is empty")]
    SecondActiveWithoutFirst(String),

    /// Both active slots hold the same ability.
    #[error("active ability '{0}' selected for both slots")]
    DuplicateAbility(String),

    /// Obstacle interval bounds are inverted.
    #[error("obstacle interval is invalid: min {min} > max {max}")]
    InvalidInterval {
        /// Configured minimum interval in turns.
        min: u32,
        /// Configured maximum interval in turns.
        max: u32,
    },

    /// Board dimensions are zero or too large.
    #[error("board size {rows}x{cols} is invalid")]
    InvalidBoardSize {
        /// Configured row count.
        rows: u16,
        /// Configured column count.
        cols: u16,
    },

    /// Entity health configuration is outside its bounds.
    #[error("entity health {health} is invalid for max health {max_health}")]
    InvalidHealth {
        /// Configured starting health.
        health: i64,
        /// Configured maximum health.
        max_health: i64,
    },

    /// Base tile damage is not positive or exceeds the supported maximum.
    #[error("base tile damage {damage} is outside 1..={max}")]
    InvalidDamage {
        /// Configured base tile damage.
        damage: i64,
        /// Largest accepted base tile damage.
        max: i64,
    },

    /// A tile level setting is outside `1..=max_level`.
    #[error("tile level {level} is outside 1..={max_level}")]
    InvalidTileLevel {
        /// Offending level.
        level: u8,
        /// Configured maximum level.
        max_level: u8,
    },

    /// More initial tiles were requested than the board has cells.
    #[error("{requested} initial tiles do not fit on a board with {capacity} cells")]
    TooManyInitialTiles {
        /// Requested number of tiles.
        requested: usize,
        /// Number of cells on the board.
        capacity: usize,
    },

    /// The configuration document could not be parsed.
    #[error("failed to parse level configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An action name that does not name an ability trigger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown trigger '{0}'")]
pub struct UnknownTrigger(pub String);

/// Any error raised while building or running a level.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A modifier, board or entity contract was violated.
    #[error(transparent)]
    Logic(#[from] LogicError),
}

/// Precondition violations of the modifier, board and entity contracts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogicError {
    /// `start_application` was called on a modifier that is not applicable.
    #[error("modifier '{name}' ({id}) cannot be applied in state {state}")]
    NotApplicable {
        /// Slot or obstacle the modifier occupies.
        id: ModifierId,
        /// Name id of the modifier.
        name: &'static str,
        /// State the modifier was in.
        state: ModifierState,
    },

    /// Damage or healing was requested with a negative amount.
    #[error("trying to {operation} by negative amount {amount}")]
    NegativeAmount {
        /// Operation that was attempted ("damage" or "heal").
        operation: &'static str,
        /// The rejected amount.
        amount: i64,
    },

    /// The board is not idle.
    #[error("board is locked")]
    BoardLocked,

    /// A selection session is already running.
    #[error("a selection session is already active (owner {0})")]
    SelectionActive(ModifierId),

    /// A selection call was made without a running session.
    #[error("no selection session is active")]
    NoSelection,

    /// A selection session was requested for zero cells.
    #[error("selection must request at least one cell")]
    InvalidSelectionCount,

    /// Fewer cells satisfy the predicate than the session requests.
    #[error("selection requests {requested} cells but only {eligible} are eligible")]
    UnsatisfiableSelection {
        /// Requested cell count.
        requested: usize,
        /// Currently eligible cell count.
        eligible: usize,
    },

    /// A cell lies outside the board.
    #[error("cell {0} is outside the board")]
    CellOutOfBounds(Cell),

    /// A tile was expected but the cell is empty.
    #[error("cell {0} is empty")]
    EmptyCell(Cell),

    /// A cell was expected to be empty.
    #[error("cell {0} is already occupied")]
    CellOccupied(Cell),

    /// Two tiles were merged with different levels.
    #[error("cannot merge tile of level {source_level} into level {target_level}")]
    LevelMismatch {
        /// Level of the tile being merged away.
        source_level: u8,
        /// Level of the tile absorbing it.
        target_level: u8,
    },

    /// A locked tile was targeted by a mutation that requires an unlocked one.
    #[error("tile in cell {0} is locked")]
    TileLocked(Cell),
}
