//! Cell selection sessions.
//!
//! A modifier that needs player-chosen targets opens a session with
//! [`Board::init_selection`], naming itself as the owner. The board then
//! accepts [`Board::select`] clicks that satisfy the session's current
//! predicate until the requested number of cells is collected, at which
//! point the session is torn down and a
//! [`BoardEvent::SelectionCompleted`] carrying the owner is queued.
//!
//! Only one session exists at a time and it lives only while the board is
//! in [`BoardState::Selecting`].

use std::fmt;

use tracing::debug;

use super::{Board, BoardEvent, BoardState, Cell};
use crate::error::LogicError;
use crate::modifier::ModifierId;

/// Decides whether a cell may be selected, given the current board.
pub type CellPredicate = Box<dyn Fn(&Board, Cell) -> bool>;

/// A live selection session.
pub struct SelectionSession {
    owner: ModifierId,
    predicate: CellPredicate,
    count: usize,
    selected: Vec<Cell>,
}

impl SelectionSession {
    /// Returns the modifier that opened the session.
    #[must_use]
    pub fn owner(&self) -> ModifierId {
        self.owner
    }

    /// Returns the number of cells the session collects.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the cells selected so far, first-selected first.
    #[must_use]
    pub fn selected(&self) -> &[Cell] {
        &self.selected
    }
}

impl fmt::Debug for SelectionSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionSession")
            .field("owner", &self.owner)
            .field("count", &self.count)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

/// Result of a selection click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The cell failed the predicate or was already selected.
    Rejected,
    /// The cell was added; more cells are needed.
    Accepted {
        /// Number of cells selected so far.
        selected: usize,
    },
    /// The cell was added and the session completed.
    Completed,
}

impl Board {
    /// Opens a selection session.
    ///
    /// # Arguments
    ///
    /// * `owner` - Modifier that receives the session's events
    /// * `predicate` - Which cells may be selected
    /// * `count` - Number of cells to collect (at least 1)
    ///
    /// # Errors
    ///
    /// - [`LogicError::SelectionActive`] if a session is already running
    /// - [`LogicError::BoardLocked`] if the board is animating
    /// - [`LogicError::InvalidSelectionCount`] if `count` is zero
    /// - [`LogicError::UnsatisfiableSelection`] if fewer than `count` cells
    ///   currently satisfy the predicate
    pub fn init_selection(
        &mut self,
        owner: ModifierId,
        predicate: CellPredicate,
        count: usize,
    ) -> Result<(), LogicError> {
        if let Some(session) = &self.selection {
            return Err(LogicError::SelectionActive(session.owner));
        }
        if self.is_locked() {
            return Err(LogicError::BoardLocked);
        }
        if count == 0 {
            return Err(LogicError::InvalidSelectionCount);
        }
        let eligible = self.cells().filter(|cell| predicate(self, *cell)).count();
        if eligible < count {
            return Err(LogicError::UnsatisfiableSelection {
                requested: count,
                eligible,
            });
        }

        debug!(%owner, count, eligible, "selection started");
        self.selection = Some(SelectionSession {
            owner,
            predicate,
            count,
            selected: Vec::with_capacity(count),
        });
        self.set_state(BoardState::Selecting);
        Ok(())
    }

    /// Offers a cell to the running session.
    ///
    /// # Errors
    ///
    /// - [`LogicError::NoSelection`] if no session is running
    /// - [`LogicError::CellOutOfBounds`] if the cell is off the board
    pub fn select(&mut self, cell: Cell) -> Result<SelectOutcome, LogicError> {
        if self.selection.is_none() {
            return Err(LogicError::NoSelection);
        }
        if !self.contains(cell) {
            return Err(LogicError::CellOutOfBounds(cell));
        }
        if !self.is_selectable(cell) {
            debug!(%cell, "selection rejected");
            return Ok(SelectOutcome::Rejected);
        }

        let Some(session) = self.selection.as_mut() else {
            return Err(LogicError::NoSelection);
        };
        session.selected.push(cell);
        let owner = session.owner;
        let cells = session.selected.clone();
        let done = cells.len() >= session.count;
        debug!(%owner, %cell, selected = cells.len(), "selection accepted");

        self.events.push_back(BoardEvent::SelectionUpdated {
            owner,
            cells: cells.clone(),
        });

        if done {
            self.selection = None;
            self.set_state(BoardState::Idle);
            self.events
                .push_back(BoardEvent::SelectionCompleted { owner, cells });
            Ok(SelectOutcome::Completed)
        } else {
            Ok(SelectOutcome::Accepted {
                selected: cells.len(),
            })
        }
    }

    /// Replaces the predicate of the running session.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::NoSelection`] if no session is running.
    pub fn change_selection_predicate(&mut self, predicate: CellPredicate) -> Result<(), LogicError> {
        let session = self.selection.as_mut().ok_or(LogicError::NoSelection)?;
        session.predicate = predicate;
        Ok(())
    }

    /// Cancels the running session.
    ///
    /// # Returns
    ///
    /// The owner of the aborted session, or `None` if nothing was running.
    pub fn abort_selection(&mut self) -> Option<ModifierId> {
        self.abort_selection_inner()
    }

    pub(super) fn abort_selection_inner(&mut self) -> Option<ModifierId> {
        let session = self.selection.take()?;
        debug!(owner = %session.owner, "selection aborted");
        self.set_state(BoardState::Idle);
        self.events.push_back(BoardEvent::SelectionAborted {
            owner: session.owner,
        });
        Some(session.owner)
    }

    /// Returns the running session, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&SelectionSession> {
        self.selection.as_ref()
    }

    /// Returns true if `cell` would currently be accepted by [`select`](Self::select).
    #[must_use]
    pub fn is_selectable(&self, cell: Cell) -> bool {
        self.selection.as_ref().is_some_and(|session| {
            self.contains(cell)
                && !session.selected.contains(&cell)
                && (session.predicate)(self, cell)
        })
    }

    /// Returns every cell the running session would currently accept.
    #[must_use]
    pub fn selectable_cells(&self) -> Vec<Cell> {
        self.cells_where(|cell| self.is_selectable(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::AbilitySlot;

    const OWNER: ModifierId = ModifierId::Ability(AbilitySlot::Active1);
    const OTHER: ModifierId = ModifierId::Ability(AbilitySlot::Attack);

    fn occupied() -> CellPredicate {
        Box::new(|board: &Board, cell| board.tile(cell).is_some())
    }

    fn board_with_tiles() -> Board {
        let mut board = Board::new(3, 3, 9).unwrap();
        board.place_tile(Cell::new(0, 0), 2).unwrap();
        board.place_tile(Cell::new(0, 1), 3).unwrap();
        board.place_tile(Cell::new(1, 1), 2).unwrap();
        board
    }

    fn drain(board: &mut Board) -> Vec<BoardEvent> {
        std::iter::from_fn(|| board.pop_event()).collect()
    }

    mod session_tests {
        use super::*;

        #[test]
        fn init_moves_board_to_selecting() {
            let mut board = board_with_tiles();
            board.init_selection(OWNER, occupied(), 1).unwrap();
            assert_eq!(board.state(), BoardState::Selecting);
            assert!(board.is_locked());
            assert_eq!(board.selection().map(SelectionSession::owner), Some(OWNER));
        }

        #[test]
        fn second_session_is_refused() {
            let mut board = board_with_tiles();
            board.init_selection(OWNER, occupied(), 1).unwrap();
            assert_eq!(
                board.init_selection(OTHER, occupied(), 1),
                Err(LogicError::SelectionActive(OWNER))
            );
            assert_eq!(board.selection().map(SelectionSession::owner), Some(OWNER));
        }

        #[test]
        fn init_refused_while_animating() {
            let mut board = board_with_tiles();
            board.start_animation(3);
            assert_eq!(
                board.init_selection(OWNER, occupied(), 1),
                Err(LogicError::BoardLocked)
            );
        }

        #[test]
        fn zero_count_is_refused() {
            let mut board = board_with_tiles();
            assert_eq!(
                board.init_selection(OWNER, occupied(), 0),
                Err(LogicError::InvalidSelectionCount)
            );
            assert!(!board.is_locked());
        }

        #[test]
        fn unsatisfiable_count_is_refused() {
            let mut board = board_with_tiles();
            assert_eq!(
                board.init_selection(OWNER, occupied(), 4),
                Err(LogicError::UnsatisfiableSelection {
                    requested: 4,
                    eligible: 3
                })
            );
        }
    }

    mod select_tests {
        use super::*;

        #[test]
        fn select_without_session_fails() {
            let mut board = board_with_tiles();
            assert_eq!(board.select(Cell::new(0, 0)), Err(LogicError::NoSelection));
        }

        #[test]
        fn predicate_failure_is_rejected() {
            let mut board = board_with_tiles();
            board.init_selection(OWNER, occupied(), 1).unwrap();
            assert_eq!(board.select(Cell::new(2, 2)), Ok(SelectOutcome::Rejected));
            assert_eq!(board.state(), BoardState::Selecting);
        }

        #[test]
        fn duplicate_cell_is_rejected() {
            let mut board = board_with_tiles();
            board.init_selection(OWNER, occupied(), 2).unwrap();
            assert_eq!(
                board.select(Cell::new(0, 0)),
                Ok(SelectOutcome::Accepted { selected: 1 })
            );
            assert_eq!(board.select(Cell::new(0, 0)), Ok(SelectOutcome::Rejected));
        }

        #[test]
        fn completion_tears_down_and_reports_in_order() {
            let mut board = board_with_tiles();
            board.init_selection(OWNER, occupied(), 2).unwrap();
            board.select(Cell::new(1, 1)).unwrap();
            assert_eq!(board.select(Cell::new(0, 0)), Ok(SelectOutcome::Completed));

            assert!(board.selection().is_none());
            assert_eq!(board.state(), BoardState::Idle);

            let events = drain(&mut board);
            let expected_cells = vec![Cell::new(1, 1), Cell::new(0, 0)];
            assert_eq!(
                events.last(),
                Some(&BoardEvent::SelectionCompleted {
                    owner: OWNER,
                    cells: expected_cells
                })
            );
        }

        #[test]
        fn narrowed_predicate_applies_to_next_click() {
            let mut board = board_with_tiles();
            board.init_selection(OWNER, occupied(), 2).unwrap();
            board.select(Cell::new(0, 0)).unwrap();
            board
                .change_selection_predicate(Box::new(|board: &Board, cell| {
                    board.tile(cell).is_some_and(|tile| tile.level() == 2)
                }))
                .unwrap();

            assert_eq!(board.select(Cell::new(0, 1)), Ok(SelectOutcome::Rejected));
            assert_eq!(board.select(Cell::new(1, 1)), Ok(SelectOutcome::Completed));
        }
    }

    mod abort_tests {
        use super::*;

        #[test]
        fn abort_returns_to_idle_with_owner() {
            let mut board = board_with_tiles();
            board.init_selection(OWNER, occupied(), 2).unwrap();
            board.select(Cell::new(0, 0)).unwrap();

            assert_eq!(board.abort_selection(), Some(OWNER));
            assert_eq!(board.state(), BoardState::Idle);
            assert!(drain(&mut board).contains(&BoardEvent::SelectionAborted { owner: OWNER }));
            assert_eq!(board.abort_selection(), None);
        }

        #[test]
        fn animation_aborts_running_session() {
            let mut board = board_with_tiles();
            board.init_selection(OWNER, occupied(), 1).unwrap();
            board.start_animation(2);

            assert!(board.selection().is_none());
            assert_eq!(board.state(), BoardState::Animating);
            assert!(drain(&mut board).contains(&BoardEvent::SelectionAborted { owner: OWNER }));
        }

        #[test]
        fn change_predicate_without_session_fails() {
            let mut board = board_with_tiles();
            assert_eq!(
                board.change_selection_predicate(occupied()),
                Err(LogicError::NoSelection)
            );
        }
    }
}
