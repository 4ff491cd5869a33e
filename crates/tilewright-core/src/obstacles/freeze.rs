//! The `freeze` obstacle.

use rand::seq::SliceRandom;
use tracing::info;

use super::ObstacleKind;
use crate::board::{Board, TileId};
use crate::entity::Entity;
use crate::error::LogicError;
use crate::events::LevelEvent;
use crate::modifier::{LevelContext, Modifier, ModifierCore, ModifierId, Progress};

/// Turns a frozen tile stays locked.
pub const FREEZE_TURNS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
struct FrozenTile {
    tile: TileId,
    turns: u32,
}

/// Locks a random unlocked tile, releasing it after [`FREEZE_TURNS`] turns.
///
/// The tile is locked for gameplay immediately and drawn as locked once the
/// freeze animation finishes. Frozen tiles are tracked by id, so a tile
/// moved by a swap or scramble still thaws on time.
#[derive(Debug)]
pub struct Freeze {
    core: ModifierCore,
    animation_frames: u32,
    frozen: Vec<FrozenTile>,
    awaiting_visual: Vec<TileId>,
}

impl Freeze {
    /// Creates the obstacle.
    #[must_use]
    pub fn new(animation_frames: u32) -> Self {
        Self {
            core: ModifierCore::new(ModifierId::Obstacle(ObstacleKind::Freeze), "freeze", 0),
            animation_frames,
            frozen: Vec::new(),
            awaiting_visual: Vec::new(),
        }
    }

    /// Returns the number of tiles currently frozen by this obstacle.
    #[must_use]
    pub fn frozen_count(&self) -> usize {
        self.frozen.len()
    }
}

impl Modifier for Freeze {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn predicate(&self, board: &Board, _entity: &Entity) -> bool {
        !board.unlocked_cells().is_empty()
    }

    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        let candidates = ctx.board.unlocked_cells();
        let Some(cell) = candidates.choose(ctx.rng).copied() else {
            return Ok(Progress::Completed);
        };
        let tile = ctx.board.tile_mut(cell).ok_or(LogicError::EmptyCell(cell))?;
        tile.set_locked(true);
        let id = tile.id();
        info!(%cell, tile = %id, "tile frozen");

        self.frozen.push(FrozenTile { tile: id, turns: 0 });
        self.awaiting_visual.push(id);
        ctx.board.start_animation(self.animation_frames);
        Ok(Progress::Completed)
    }

    fn on_animation_finished(&mut self, ctx: &mut LevelContext<'_>) -> Result<(), LogicError> {
        for id in self.awaiting_visual.drain(..) {
            let Some(cell) = ctx.board.find_tile(id) else {
                continue;
            };
            if let Some(tile) = ctx.board.tile_mut(cell) {
                if tile.is_locked() {
                    tile.set_visually_locked(true);
                }
            }
        }
        Ok(())
    }

    fn on_turn(&mut self, ctx: &mut LevelContext<'_>) -> Result<(), LogicError> {
        let board = &mut *ctx.board;
        let events = &mut *ctx.events;
        self.frozen.retain_mut(|frozen| {
            let Some(cell) = board.find_tile(frozen.tile) else {
                return false;
            };
            frozen.turns += 1;
            if frozen.turns < FREEZE_TURNS {
                return true;
            }
            if let Some(tile) = board.tile_mut(cell) {
                tile.set_locked(false);
                tile.set_visually_locked(false);
            }
            info!(%cell, "tile thawed");
            events.push(LevelEvent::TileThawed { cell });
            false
        });
        self.awaiting_visual
            .retain(|id| self.frozen.iter().any(|frozen| frozen.tile == *id));
        Ok(())
    }
}
