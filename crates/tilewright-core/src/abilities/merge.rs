//! The `merge` active.

use tracing::debug;

use super::is_unlocked_tile;
use crate::board::{Board, Cell, CellPredicate};
use crate::entity::Entity;
use crate::error::LogicError;
use crate::modifier::{AbilitySlot, LevelContext, Modifier, ModifierCore, ModifierId, Progress};

const MERGE_COOLDOWN: u32 = 5;

/// Merges two player-selected tiles of the same level.
///
/// The first click may pick any unlocked tile that has an unlocked partner
/// of the same level. The predicate then narrows to tiles of the first
/// tile's level, and the second tile is merged into the first.
#[derive(Debug)]
pub struct Merge {
    core: ModifierCore,
    animation_frames: u32,
}

impl Merge {
    /// Creates the ability for a slot.
    #[must_use]
    pub fn new(slot: AbilitySlot, animation_frames: u32) -> Self {
        Self {
            core: ModifierCore::new(ModifierId::Ability(slot), "merge", MERGE_COOLDOWN),
            animation_frames,
        }
    }
}

fn has_unlocked_pair(board: &Board, cell: Cell) -> bool {
    let Some(level) = board.tile(cell).filter(|tile| !tile.is_locked()).map(|tile| tile.level()) else {
        return false;
    };
    board.cells().any(|other| {
        other != cell
            && board
                .tile(other)
                .is_some_and(|tile| !tile.is_locked() && tile.level() == level)
    })
}

fn first_pick() -> CellPredicate {
    Box::new(has_unlocked_pair)
}

fn same_level_as(level: u8) -> CellPredicate {
    Box::new(move |board: &Board, cell: Cell| {
        is_unlocked_tile(board, cell) && board.tile(cell).is_some_and(|tile| tile.level() == level)
    })
}

impl Modifier for Merge {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn predicate(&self, board: &Board, _entity: &Entity) -> bool {
        board.cells().any(|cell| has_unlocked_pair(board, cell))
    }

    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        ctx.board.init_selection(self.id(), first_pick(), 2)?;
        Ok(Progress::Pending)
    }

    fn on_selection_updated(
        &mut self,
        cells: &[Cell],
        ctx: &mut LevelContext<'_>,
    ) -> Result<(), LogicError> {
        match cells {
            [] => ctx.board.change_selection_predicate(first_pick()),
            [first] => {
                let level = ctx
                    .board
                    .tile(*first)
                    .map(|tile| tile.level())
                    .ok_or(LogicError::EmptyCell(*first))?;
                debug!(cell = %first, level, "merge narrowed to level");
                ctx.board.change_selection_predicate(same_level_as(level))
            }
            _ => Ok(()),
        }
    }

    fn on_selection_completed(
        &mut self,
        cells: &[Cell],
        ctx: &mut LevelContext<'_>,
    ) -> Result<Progress, LogicError> {
        let [target, source] = cells else {
            return Err(LogicError::InvalidSelectionCount);
        };
        ctx.board.full_merge(*source, *target)?;
        ctx.board.start_animation(self.animation_frames);
        Ok(Progress::Completed)
    }
}
