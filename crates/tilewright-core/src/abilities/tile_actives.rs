//! Actives that move or remove tiles: `dispose`, `swap` and `scramble`.

use tracing::debug;

use super::is_unlocked_tile;
use crate::board::{Board, Cell};
use crate::entity::Entity;
use crate::error::LogicError;
use crate::modifier::{AbilitySlot, LevelContext, Modifier, ModifierCore, ModifierId, Progress};

const DISPOSE_COOLDOWN: u32 = 20;
const SWAP_COOLDOWN: u32 = 15;
const SCRAMBLE_COOLDOWN: u32 = 30;

fn unlocked_count(board: &Board) -> usize {
    board.unlocked_cells().len()
}

// =============================================================================
// Dispose
// =============================================================================

/// Removes a player-selected unlocked tile.
#[derive(Debug)]
pub struct Dispose {
    core: ModifierCore,
    animation_frames: u32,
}

impl Dispose {
    /// Creates the ability for a slot.
    #[must_use]
    pub fn new(slot: AbilitySlot, animation_frames: u32) -> Self {
        Self {
            core: ModifierCore::new(ModifierId::Ability(slot), "dispose", DISPOSE_COOLDOWN),
            animation_frames,
        }
    }
}

impl Modifier for Dispose {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn predicate(&self, board: &Board, _entity: &Entity) -> bool {
        unlocked_count(board) > 0
    }

    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        ctx.board.init_selection(self.id(), Box::new(is_unlocked_tile), 1)?;
        Ok(Progress::Pending)
    }

    fn on_selection_completed(
        &mut self,
        cells: &[Cell],
        ctx: &mut LevelContext<'_>,
    ) -> Result<Progress, LogicError> {
        let cell = *cells.first().ok_or(LogicError::InvalidSelectionCount)?;
        ctx.board.dispose_cell_content(cell)?;
        ctx.board.start_animation(self.animation_frames);
        Ok(Progress::Completed)
    }
}

// =============================================================================
// Swap
// =============================================================================

/// Swaps two player-selected unlocked tiles.
#[derive(Debug)]
pub struct Swap {
    core: ModifierCore,
    animation_frames: u32,
}

impl Swap {
    /// Creates the ability for a slot.
    #[must_use]
    pub fn new(slot: AbilitySlot, animation_frames: u32) -> Self {
        Self {
            core: ModifierCore::new(ModifierId::Ability(slot), "swap", SWAP_COOLDOWN),
            animation_frames,
        }
    }
}

impl Modifier for Swap {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn predicate(&self, board: &Board, _entity: &Entity) -> bool {
        unlocked_count(board) >= 2
    }

    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        ctx.board.init_selection(self.id(), Box::new(is_unlocked_tile), 2)?;
        Ok(Progress::Pending)
    }

    fn on_selection_completed(
        &mut self,
        cells: &[Cell],
        ctx: &mut LevelContext<'_>,
    ) -> Result<Progress, LogicError> {
        let [a, b] = cells else {
            return Err(LogicError::InvalidSelectionCount);
        };
        ctx.board.swap_cells(*a, *b)?;
        ctx.board.start_animation(self.animation_frames);
        Ok(Progress::Completed)
    }
}

// =============================================================================
// Scramble
// =============================================================================

/// Shuffles every unlocked tile among the cells they occupy.
#[derive(Debug)]
pub struct Scramble {
    core: ModifierCore,
    animation_frames: u32,
}

impl Scramble {
    /// Creates the ability for a slot.
    #[must_use]
    pub fn new(slot: AbilitySlot, animation_frames: u32) -> Self {
        Self {
            core: ModifierCore::new(ModifierId::Ability(slot), "scramble", SCRAMBLE_COOLDOWN),
            animation_frames,
        }
    }
}

impl Modifier for Scramble {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn predicate(&self, board: &Board, _entity: &Entity) -> bool {
        unlocked_count(board) >= 2
    }

    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        let moved = ctx.board.scramble(ctx.rng);
        debug!(moved, "board scrambled");
        ctx.board.start_animation(self.animation_frames);
        Ok(Progress::Completed)
    }
}
