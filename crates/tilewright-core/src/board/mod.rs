//! The tile grid and its interaction state.
//!
//! The [`Board`] owns every [`Tile`] in a fixed `rows × cols` table and a
//! small state machine that serialises interaction with it:
//!
//! ```text
//!            init_selection             start_animation
//!   Idle  ───────────────────▶ Selecting ───────────────▶ Animating
//!    ▲  ◀─── complete / abort ──┘                            │
//!    └───────────────────── animation finished ◀─────────────┘
//! ```
//!
//! [`Board::is_locked`] is true in every state except [`BoardState::Idle`];
//! modifier applications and player moves require an unlocked board.
//!
//! # Events
//!
//! The board never calls back into modifiers. Instead it queues
//! [`BoardEvent`]s (turn advanced, state changes, selection progress) which
//! the owning [`Level`](crate::level::Level) drains with
//! [`Board::pop_event`] and routes to whoever owns the affected session.
//!
//! # Example
//!
//! ```
//! use tilewright_core::board::{Board, BoardEvent, Cell};
//!
//! let mut board = Board::new(4, 4, 9).unwrap();
//! board.place_tile(Cell::new(0, 0), 2).unwrap();
//! assert_eq!(board.tile(Cell::new(0, 0)).map(|t| t.level()), Some(2));
//!
//! board.complete_turn().unwrap();
//! assert_eq!(board.turn(), 1);
//! assert_eq!(board.pop_event(), Some(BoardEvent::TurnAdvanced { turn: 1 }));
//! ```

mod cell;
mod selection;
mod tile;

pub use cell::Cell;
pub use selection::{CellPredicate, SelectOutcome, SelectionSession};
pub use tile::{Tile, TileFlags, TileId};

use std::collections::VecDeque;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ConfigError, LogicError};
use crate::modifier::ModifierId;

/// Largest supported side length of a board.
pub const MAX_BOARD_SIDE: u16 = 64;

/// Chance, in percent, that a generated tile spawns one level above base.
pub const HIGH_SPAWN_PERCENT: u32 = 10;

// =============================================================================
// Board State and Events
// =============================================================================

/// Interaction state of the board. Exactly one holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoardState {
    /// Free for moves, selections and applications.
    #[default]
    Idle,
    /// A selection session is collecting cells.
    Selecting,
    /// A timed mutation is being shown; nothing new may start.
    Animating,
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Selecting => write!(f, "Selecting"),
            Self::Animating => write!(f, "Animating"),
        }
    }
}

/// Notifications queued by the board for the level to dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardEvent {
    /// A player move completed.
    TurnAdvanced {
        /// Turn counter after the move.
        turn: u64,
    },
    /// The board changed interaction state.
    StateChanged {
        /// State before the change.
        from: BoardState,
        /// State after the change.
        to: BoardState,
    },
    /// A cell was accepted into the running selection.
    SelectionUpdated {
        /// Modifier that opened the session.
        owner: ModifierId,
        /// Every cell selected so far, first-selected first.
        cells: Vec<Cell>,
    },
    /// The running selection collected all requested cells.
    SelectionCompleted {
        /// Modifier that opened the session.
        owner: ModifierId,
        /// The selected cells, first-selected first.
        cells: Vec<Cell>,
    },
    /// The running selection was cancelled before completion.
    SelectionAborted {
        /// Modifier that opened the session.
        owner: ModifierId,
    },
}

// =============================================================================
// Board
// =============================================================================

/// Fixed-size grid mapping [`Cell`] to an optional [`Tile`].
///
/// A tile lives in exactly one cell: tiles are stored by value in the cell
/// table, so moving one always vacates its previous cell.
pub struct Board {
    rows: u16,
    cols: u16,
    cells: Vec<Option<Tile>>,
    state: BoardState,
    turn: u64,
    base_level: u8,
    max_level: u8,
    next_tile_id: u64,
    animation_frames_left: u32,
    selection: Option<SelectionSession>,
    events: VecDeque<BoardEvent>,
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("tiles", &self.tile_count())
            .field("state", &self.state)
            .field("turn", &self.turn)
            .field("selection", &self.selection)
            .field("pending_events", &self.events.len())
            .finish()
    }
}

impl Board {
    /// Creates an empty idle board.
    ///
    /// # Arguments
    ///
    /// * `rows` - Number of rows (1..=[`MAX_BOARD_SIDE`])
    /// * `cols` - Number of columns (1..=[`MAX_BOARD_SIDE`])
    /// * `max_level` - Highest level a tile may reach (at least 1)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBoardSize`] or
    /// [`ConfigError::InvalidTileLevel`] for out-of-range arguments.
    pub fn new(rows: u16, cols: u16, max_level: u8) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 || rows > MAX_BOARD_SIDE || cols > MAX_BOARD_SIDE {
            return Err(ConfigError::InvalidBoardSize { rows, cols });
        }
        if max_level == 0 {
            return Err(ConfigError::InvalidTileLevel {
                level: max_level,
                max_level,
            });
        }

        Ok(Self {
            rows,
            cols,
            cells: vec![None; usize::from(rows) * usize::from(cols)],
            state: BoardState::Idle,
            turn: 0,
            base_level: 1,
            max_level,
            next_tile_id: 0,
            animation_frames_left: 0,
            selection: None,
            events: VecDeque::new(),
        })
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Returns the number of cells.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Returns the current interaction state.
    #[must_use]
    pub fn state(&self) -> BoardState {
        self.state
    }

    /// Returns true whenever the board is not idle.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state != BoardState::Idle
    }

    /// Returns the number of completed player moves.
    #[must_use]
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Returns the level newly generated tiles start at.
    #[must_use]
    pub fn base_level(&self) -> u8 {
        self.base_level
    }

    /// Sets the level newly generated tiles start at, capped at the max level.
    pub fn set_base_level(&mut self, level: u8) {
        self.base_level = level.clamp(1, self.max_level);
    }

    /// Returns the highest level a tile may reach.
    #[must_use]
    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    /// Returns true if the cell lies on the board.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row() < self.rows && cell.col() < self.cols
    }

    fn index(&self, cell: Cell) -> Result<usize, LogicError> {
        if self.contains(cell) {
            Ok(usize::from(cell.row()) * usize::from(self.cols) + usize::from(cell.col()))
        } else {
            Err(LogicError::CellOutOfBounds(cell))
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Cell::new(row, col)))
    }

    /// Returns the tile in a cell, if any. Cells off the board are empty.
    #[must_use]
    pub fn tile(&self, cell: Cell) -> Option<&Tile> {
        self.index(cell).ok().and_then(|i| self.cells[i].as_ref())
    }

    /// Returns a mutable reference to the tile in a cell, if any.
    pub fn tile_mut(&mut self, cell: Cell) -> Option<&mut Tile> {
        let index = self.index(cell).ok()?;
        self.cells[index].as_mut()
    }

    /// Returns the cells matching `predicate`, in row-major order.
    pub fn cells_where<F>(&self, predicate: F) -> Vec<Cell>
    where
        F: Fn(Cell) -> bool,
    {
        self.cells().filter(|cell| predicate(*cell)).collect()
    }

    /// Returns every occupied cell.
    #[must_use]
    pub fn occupied_cells(&self) -> Vec<Cell> {
        self.cells_where(|cell| self.tile(cell).is_some())
    }

    /// Returns every empty cell.
    #[must_use]
    pub fn empty_cells(&self) -> Vec<Cell> {
        self.cells_where(|cell| self.tile(cell).is_none())
    }

    /// Returns every cell holding an unlocked tile.
    #[must_use]
    pub fn unlocked_cells(&self) -> Vec<Cell> {
        self.cells_where(|cell| self.tile(cell).is_some_and(|tile| !tile.is_locked()))
    }

    /// Returns the number of tiles on the board.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.cells.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns the cell currently holding the tile with `id`.
    #[must_use]
    pub fn find_tile(&self, id: TileId) -> Option<Cell> {
        self.cells()
            .find(|cell| self.tile(*cell).is_some_and(|tile| tile.id() == id))
    }

    // =========================================================================
    // Mutation Primitives
    // =========================================================================

    /// Places a new tile in an empty cell.
    ///
    /// # Errors
    ///
    /// Fails if the cell is off the board, occupied, or the level is outside
    /// `1..=max_level` (reported as [`LogicError::LevelMismatch`] against the
    /// max level).
    pub fn place_tile(&mut self, cell: Cell, level: u8) -> Result<TileId, LogicError> {
        let index = self.index(cell)?;
        if self.cells[index].is_some() {
            return Err(LogicError::CellOccupied(cell));
        }
        if level == 0 || level > self.max_level {
            return Err(LogicError::LevelMismatch {
                source_level: level,
                target_level: self.max_level,
            });
        }

        let id = TileId::new(self.next_tile_id);
        self.next_tile_id += 1;
        self.cells[index] = Some(Tile::new(id, level));
        trace!(%cell, level, %id, "tile placed");
        Ok(id)
    }

    /// Spawns a tile in a random empty cell.
    ///
    /// The tile starts at [`base_level`](Self::base_level), or one level
    /// higher with [`HIGH_SPAWN_PERCENT`] probability.
    ///
    /// # Returns
    ///
    /// The cell the tile was placed in, or `None` if the board is full.
    pub fn generate_random_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Cell> {
        let empty = self.empty_cells();
        let cell = *empty.choose(rng)?;
        let mut level = self.base_level;
        if rng.gen_range(0..100) < HIGH_SPAWN_PERCENT {
            level = level.saturating_add(1).min(self.max_level);
        }
        self.place_tile(cell, level).ok().map(|_| cell)
    }

    /// Removes and returns the tile in a cell.
    ///
    /// # Errors
    ///
    /// Fails if the cell is off the board or empty.
    pub fn dispose_cell_content(&mut self, cell: Cell) -> Result<Tile, LogicError> {
        let index = self.index(cell)?;
        let tile = self.cells[index].take().ok_or(LogicError::EmptyCell(cell))?;
        debug!(%cell, level = tile.level(), "tile disposed");
        Ok(tile)
    }

    /// Merges the tile in `source` into the tile in `target`.
    ///
    /// The source tile is removed and the target tile gains one level
    /// (capped at the max level).
    ///
    /// # Returns
    ///
    /// The new level of the target tile.
    ///
    /// # Errors
    ///
    /// Fails if either cell is empty or off the board, if both are the same
    /// cell, or if the levels differ.
    pub fn full_merge(&mut self, source: Cell, target: Cell) -> Result<u8, LogicError> {
        if source == target {
            return Err(LogicError::CellOccupied(target));
        }
        let source_index = self.index(source)?;
        let target_index = self.index(target)?;
        let source_level = self.cells[source_index]
            .as_ref()
            .map(Tile::level)
            .ok_or(LogicError::EmptyCell(source))?;
        let target_level = self.cells[target_index]
            .as_ref()
            .map(Tile::level)
            .ok_or(LogicError::EmptyCell(target))?;
        if source_level != target_level {
            return Err(LogicError::LevelMismatch {
                source_level,
                target_level,
            });
        }

        self.cells[source_index] = None;
        let new_level = target_level.saturating_add(1).min(self.max_level);
        if let Some(tile) = self.cells[target_index].as_mut() {
            tile.set_level(new_level);
        }
        debug!(%source, %target, new_level, "tiles merged");
        Ok(new_level)
    }

    /// Sets the level of the tile in a cell.
    ///
    /// # Errors
    ///
    /// Fails if the cell is empty or the level is outside `1..=max_level`.
    pub fn set_tile_level(&mut self, cell: Cell, level: u8) -> Result<(), LogicError> {
        let max_level = self.max_level;
        let tile = self.tile_mut(cell).ok_or(LogicError::EmptyCell(cell))?;
        if level == 0 || level > max_level {
            return Err(LogicError::LevelMismatch {
                source_level: level,
                target_level: max_level,
            });
        }
        tile.set_level(level);
        Ok(())
    }

    /// Exchanges the contents of two cells. Either may be empty.
    ///
    /// # Errors
    ///
    /// Fails if either cell is off the board.
    pub fn swap_cells(&mut self, a: Cell, b: Cell) -> Result<(), LogicError> {
        let a_index = self.index(a)?;
        let b_index = self.index(b)?;
        self.cells.swap(a_index, b_index);
        debug!(%a, %b, "cells swapped");
        Ok(())
    }

    /// Shuffles every unlocked tile among the cells unlocked tiles occupy.
    ///
    /// Locked tiles and empty cells are untouched.
    ///
    /// # Returns
    ///
    /// The number of tiles that took part in the shuffle.
    pub fn scramble<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let cells = self.unlocked_cells();
        let mut tiles: Vec<Tile> = cells
            .iter()
            .filter_map(|cell| self.tile(*cell).cloned())
            .collect();
        tiles.shuffle(rng);
        for (cell, tile) in cells.iter().zip(tiles) {
            if let Ok(index) = self.index(*cell) {
                self.cells[index] = Some(tile);
            }
        }
        debug!(count = cells.len(), "tiles scrambled");
        cells.len()
    }

    // =========================================================================
    // Turns, State and Animation
    // =========================================================================

    /// Records a completed player move and queues [`BoardEvent::TurnAdvanced`].
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::BoardLocked`] unless the board is idle.
    pub fn complete_turn(&mut self) -> Result<u64, LogicError> {
        if self.is_locked() {
            return Err(LogicError::BoardLocked);
        }
        self.turn += 1;
        self.events.push_back(BoardEvent::TurnAdvanced { turn: self.turn });
        trace!(turn = self.turn, "turn advanced");
        Ok(self.turn)
    }

    /// Starts (or extends) a timed visual mutation.
    ///
    /// Starting an animation locks the board; a running selection session is
    /// aborted first. The board returns to idle after `frames` calls to
    /// [`update`](Self::update) (at least one).
    pub fn start_animation(&mut self, frames: u32) {
        if self.selection.is_some() {
            self.abort_selection_inner();
        }
        self.animation_frames_left = self.animation_frames_left.max(frames.max(1));
        self.set_state(BoardState::Animating);
    }

    /// Advances the animation timer by one frame.
    pub fn update(&mut self) {
        if self.state == BoardState::Animating {
            self.animation_frames_left = self.animation_frames_left.saturating_sub(1);
            if self.animation_frames_left == 0 {
                self.set_state(BoardState::Idle);
            }
        }
    }

    fn set_state(&mut self, state: BoardState) {
        if self.state != state {
            let from = self.state;
            self.state = state;
            self.events.push_back(BoardEvent::StateChanged { from, to: state });
            trace!(%from, to = %state, "board state changed");
        }
    }

    /// Pops the oldest queued event.
    pub fn pop_event(&mut self) -> Option<BoardEvent> {
        self.events.pop_front()
    }

    /// Returns true if events are waiting to be dispatched.
    #[must_use]
    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn board() -> Board {
        Board::new(3, 3, 9).unwrap()
    }

    mod construction_tests {
        use super::*;

        #[test]
        fn new_board_is_idle_and_empty() {
            let board = board();
            assert_eq!(board.state(), BoardState::Idle);
            assert!(!board.is_locked());
            assert_eq!(board.tile_count(), 0);
            assert_eq!(board.capacity(), 9);
            assert_eq!(board.turn(), 0);
        }

        #[test]
        fn zero_sized_board_is_rejected() {
            assert!(matches!(
                Board::new(0, 4, 9),
                Err(ConfigError::InvalidBoardSize { rows: 0, cols: 4 })
            ));
        }

        #[test]
        fn zero_max_level_is_rejected() {
            assert!(matches!(
                Board::new(4, 4, 0),
                Err(ConfigError::InvalidTileLevel { .. })
            ));
        }
    }

    mod mutation_tests {
        use super::*;

        #[test]
        fn place_into_occupied_cell_fails() {
            let mut board = board();
            board.place_tile(Cell::new(0, 0), 1).unwrap();
            assert_eq!(
                board.place_tile(Cell::new(0, 0), 1),
                Err(LogicError::CellOccupied(Cell::new(0, 0)))
            );
        }

        #[test]
        fn place_off_board_fails() {
            let mut board = board();
            assert_eq!(
                board.place_tile(Cell::new(3, 0), 1),
                Err(LogicError::CellOutOfBounds(Cell::new(3, 0)))
            );
        }

        #[test]
        fn tile_ids_are_unique() {
            let mut board = board();
            let a = board.place_tile(Cell::new(0, 0), 1).unwrap();
            let b = board.place_tile(Cell::new(0, 1), 1).unwrap();
            assert_ne!(a, b);
            assert_eq!(board.find_tile(b), Some(Cell::new(0, 1)));
        }

        #[test]
        fn full_merge_upgrades_target_and_clears_source() {
            let mut board = board();
            board.place_tile(Cell::new(0, 0), 2).unwrap();
            board.place_tile(Cell::new(1, 1), 2).unwrap();

            let level = board.full_merge(Cell::new(1, 1), Cell::new(0, 0)).unwrap();

            assert_eq!(level, 3);
            assert_eq!(board.tile(Cell::new(0, 0)).map(Tile::level), Some(3));
            assert!(board.tile(Cell::new(1, 1)).is_none());
            assert_eq!(board.tile_count(), 1);
        }

        #[test]
        fn full_merge_rejects_level_mismatch() {
            let mut board = board();
            board.place_tile(Cell::new(0, 0), 2).unwrap();
            board.place_tile(Cell::new(0, 1), 3).unwrap();
            assert_eq!(
                board.full_merge(Cell::new(0, 1), Cell::new(0, 0)),
                Err(LogicError::LevelMismatch {
                    source_level: 3,
                    target_level: 2
                })
            );
            assert_eq!(board.tile_count(), 2);
        }

        #[test]
        fn full_merge_caps_at_max_level() {
            let mut board = Board::new(2, 2, 4).unwrap();
            board.place_tile(Cell::new(0, 0), 4).unwrap();
            board.place_tile(Cell::new(0, 1), 4).unwrap();
            assert_eq!(board.full_merge(Cell::new(0, 1), Cell::new(0, 0)), Ok(4));
        }

        #[test]
        fn swap_moves_tile_with_its_id() {
            let mut board = board();
            let id = board.place_tile(Cell::new(0, 0), 5).unwrap();
            board.swap_cells(Cell::new(0, 0), Cell::new(2, 2)).unwrap();
            assert!(board.tile(Cell::new(0, 0)).is_none());
            assert_eq!(board.find_tile(id), Some(Cell::new(2, 2)));
        }

        #[test]
        fn scramble_keeps_locked_tiles_and_tile_set() {
            let mut board = board();
            for (i, cell) in [(0, 0), (0, 1), (1, 0), (1, 1)].into_iter().enumerate() {
                board.place_tile(Cell::from(cell), u8::try_from(i + 1).unwrap()).unwrap();
            }
            board.tile_mut(Cell::new(1, 1)).unwrap().set_locked(true);

            let mut rng = ChaCha8Rng::seed_from_u64(5);
            let moved = board.scramble(&mut rng);

            assert_eq!(moved, 3);
            assert_eq!(board.tile(Cell::new(1, 1)).map(Tile::level), Some(4));
            let mut levels: Vec<u8> = board
                .occupied_cells()
                .into_iter()
                .filter_map(|cell| board.tile(cell).map(Tile::level))
                .collect();
            levels.sort_unstable();
            assert_eq!(levels, vec![1, 2, 3, 4]);
        }

        #[test]
        fn generate_fills_board_then_stops() {
            let mut board = board();
            let mut rng = ChaCha8Rng::seed_from_u64(11);
            for _ in 0..9 {
                assert!(board.generate_random_tile(&mut rng).is_some());
            }
            assert_eq!(board.generate_random_tile(&mut rng), None);
            assert_eq!(board.tile_count(), 9);
        }
    }

    mod state_tests {
        use super::*;

        #[test]
        fn turn_requires_idle_board() {
            let mut board = board();
            board.start_animation(2);
            assert_eq!(board.complete_turn(), Err(LogicError::BoardLocked));
        }

        #[test]
        fn animation_returns_to_idle_after_frames() {
            let mut board = board();
            board.start_animation(2);
            assert_eq!(
                board.pop_event(),
                Some(BoardEvent::StateChanged {
                    from: BoardState::Idle,
                    to: BoardState::Animating
                })
            );

            board.update();
            assert!(board.is_locked());
            board.update();
            assert!(!board.is_locked());
            assert_eq!(
                board.pop_event(),
                Some(BoardEvent::StateChanged {
                    from: BoardState::Animating,
                    to: BoardState::Idle
                })
            );
        }

        #[test]
        fn zero_frame_animation_still_locks_for_one_update() {
            let mut board = board();
            board.start_animation(0);
            assert!(board.is_locked());
            board.update();
            assert!(!board.is_locked());
        }
    }
}
