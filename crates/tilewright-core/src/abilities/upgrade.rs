//! The `upgrade` active.

use super::is_unlocked_tile;
use crate::board::{Board, Cell};
use crate::entity::Entity;
use crate::error::LogicError;
use crate::modifier::{AbilitySlot, LevelContext, Modifier, ModifierCore, ModifierId, Progress};

const UPGRADE_COOLDOWN: u32 = 35;

/// Raises a player-selected unlocked tile by one level.
#[derive(Debug)]
pub struct Upgrade {
    core: ModifierCore,
    animation_frames: u32,
}

impl Upgrade {
    /// Creates the ability for a slot.
    #[must_use]
    pub fn new(slot: AbilitySlot, animation_frames: u32) -> Self {
        Self {
            core: ModifierCore::new(ModifierId::Ability(slot), "upgrade", UPGRADE_COOLDOWN),
            animation_frames,
        }
    }
}

fn upgradable(board: &Board, cell: Cell) -> bool {
    is_unlocked_tile(board, cell)
        && board
            .tile(cell)
            .is_some_and(|tile| tile.level() < board.max_level())
}

impl Modifier for Upgrade {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn predicate(&self, board: &Board, _entity: &Entity) -> bool {
        board.cells().any(|cell| upgradable(board, cell))
    }

    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        ctx.board.init_selection(self.id(), Box::new(upgradable), 1)?;
        Ok(Progress::Pending)
    }

    fn on_selection_completed(
        &mut self,
        cells: &[Cell],
        ctx: &mut LevelContext<'_>,
    ) -> Result<Progress, LogicError> {
        let cell = *cells.first().ok_or(LogicError::InvalidSelectionCount)?;
        let level = ctx
            .board
            .tile(cell)
            .map(|tile| tile.level())
            .ok_or(LogicError::EmptyCell(cell))?;
        ctx.board.set_tile_level(cell, level + 1)?;
        ctx.board.start_animation(self.animation_frames);
        Ok(Progress::Completed)
    }
}
