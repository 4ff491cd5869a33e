//! Obstacles that rearrange or alter tiles.

use rand::seq::SliceRandom;
use tracing::info;

use super::ObstacleKind;
use crate::board::{Board, Cell};
use crate::entity::Entity;
use crate::error::LogicError;
use crate::modifier::{LevelContext, Modifier, ModifierCore, ModifierId, Progress};

fn obstacle_core(kind: ObstacleKind) -> ModifierCore {
    ModifierCore::new(ModifierId::Obstacle(kind), kind.name_id(), 0)
}

fn downgradable_cells(board: &Board) -> Vec<Cell> {
    board.cells_where(|cell| {
        board
            .tile(cell)
            .is_some_and(|tile| !tile.is_locked() && tile.level() > 1)
    })
}

macro_rules! obstacle_struct {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            core: ModifierCore,
            animation_frames: u32,
        }

        impl $name {
            /// Creates the obstacle.
            #[must_use]
            pub fn new(animation_frames: u32) -> Self {
                Self {
                    core: obstacle_core($kind),
                    animation_frames,
                }
            }
        }
    };
}

obstacle_struct!(
    /// Lowers a random unlocked tile above level 1 by one level.
    Downgrade,
    ObstacleKind::Downgrade
);
obstacle_struct!(
    /// Drops a base-level tile into a random empty cell.
    GarbageTile,
    ObstacleKind::GarbageTile
);
obstacle_struct!(
    /// Removes a random unlocked tile.
    RandomDispose,
    ObstacleKind::RandomDispose
);
obstacle_struct!(
    /// Swaps two random unlocked tiles.
    RandomSwap,
    ObstacleKind::RandomSwap
);
obstacle_struct!(
    /// Shuffles every unlocked tile among their cells.
    RandomScramble,
    ObstacleKind::RandomScramble
);

impl Modifier for Downgrade {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn predicate(&self, board: &Board, _entity: &Entity) -> bool {
        !downgradable_cells(board).is_empty()
    }

    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        if let Some(cell) = downgradable_cells(ctx.board).choose(ctx.rng).copied() {
            let level = ctx.board.tile(cell).map_or(1, |tile| tile.level());
            ctx.board.set_tile_level(cell, level - 1)?;
            info!(%cell, level = level - 1, "tile downgraded");
            ctx.board.start_animation(self.animation_frames);
        }
        Ok(Progress::Completed)
    }
}

impl Modifier for GarbageTile {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn predicate(&self, board: &Board, _entity: &Entity) -> bool {
        !board.empty_cells().is_empty()
    }

    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        if let Some(cell) = ctx.board.empty_cells().choose(ctx.rng).copied() {
            let level = ctx.board.base_level();
            ctx.board.place_tile(cell, level)?;
            info!(%cell, level, "garbage tile dropped");
            ctx.board.start_animation(self.animation_frames);
        }
        Ok(Progress::Completed)
    }
}

impl Modifier for RandomDispose {
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
        if let Some(cell) = ctx.board.unlocked_cells().choose(ctx.rng).copied() {
            let tile = ctx.board.dispose_cell_content(cell)?;
            info!(%cell, level = tile.level(), "tile removed by obstacle");
            ctx.board.start_animation(self.animation_frames);
        }
        Ok(Progress::Completed)
    }
}

impl Modifier for RandomSwap {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn predicate(&self, board: &Board, _entity: &Entity) -> bool {
        board.unlocked_cells().len() >= 2
    }

    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        let cells = ctx.board.unlocked_cells();
        let picked: Vec<Cell> = cells.choose_multiple(ctx.rng, 2).copied().collect();
        if let &[a, b] = picked.as_slice() {
            ctx.board.swap_cells(a, b)?;
            info!(%a, %b, "tiles swapped by obstacle");
            ctx.board.start_animation(self.animation_frames);
        }
        Ok(Progress::Completed)
    }
}

impl Modifier for RandomScramble {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn predicate(&self, board: &Board, _entity: &Entity) -> bool {
        board.unlocked_cells().len() >= 2
    }

    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        let moved = ctx.board.scramble(ctx.rng);
        info!(moved, "board scrambled by obstacle");
        ctx.board.start_animation(self.animation_frames);
        Ok(Progress::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardState, Tile};
    use crate::entity::GameMode;
    use crate::events::LevelEvent;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Fixture {
        board: Board,
        entity: Entity,
        rng: ChaCha8Rng,
        events: Vec<LevelEvent>,
    }

    impl Fixture {
        fn new(tiles: &[((u16, u16), u8)]) -> Self {
            let mut board = Board::new(3, 3, 9).unwrap();
            for (cell, level) in tiles {
                board.place_tile(Cell::from(*cell), *level).unwrap();
            }
            Self {
                board,
                entity: Entity::new(GameMode::Attack, 100, 100).unwrap(),
                rng: ChaCha8Rng::seed_from_u64(21),
                events: Vec::new(),
            }
        }

        fn apply(&mut self, obstacle: &mut dyn Modifier) -> Result<Progress, LogicError> {
            obstacle.update_applicability(&self.board, &self.entity, &mut self.events);
            obstacle.start_application(&mut LevelContext {
                board: &mut self.board,
                entity: &mut self.entity,
                rng: &mut self.rng,
                events: &mut self.events,
            })
        }

        fn level(&self, cell: (u16, u16)) -> Option<u8> {
            self.board.tile(Cell::from(cell)).map(Tile::level)
        }
    }

    #[test]
    fn downgrade_skips_level_one_tiles() {
        let mut fx = Fixture::new(&[((0, 0), 1), ((1, 1), 4)]);
        assert_eq!(fx.apply(&mut Downgrade::new(3)), Ok(Progress::Completed));
        assert_eq!(fx.level((0, 0)), Some(1));
        assert_eq!(fx.level((1, 1)), Some(3));
        assert_eq!(fx.board.state(), BoardState::Animating);
    }

    #[test]
    fn downgrade_not_applicable_on_level_one_board() {
        let mut fx = Fixture::new(&[((0, 0), 1)]);
        assert!(matches!(
            fx.apply(&mut Downgrade::new(3)),
            Err(LogicError::NotApplicable { .. })
        ));
    }

    #[test]
    fn garbage_tile_uses_base_level() {
        let mut fx = Fixture::new(&[((0, 0), 5)]);
        fx.board.set_base_level(2);
        fx.apply(&mut GarbageTile::new(3)).unwrap();
        assert_eq!(fx.board.tile_count(), 2);
        let placed: Vec<u8> = fx
            .board
            .occupied_cells()
            .into_iter()
            .filter(|cell| *cell != Cell::new(0, 0))
            .filter_map(|cell| fx.board.tile(cell).map(Tile::level))
            .collect();
        assert_eq!(placed, vec![2]);
    }

    #[test]
    fn random_dispose_spares_locked_tiles() {
        let mut fx = Fixture::new(&[((0, 0), 2), ((0, 1), 3)]);
        fx.board.tile_mut(Cell::new(0, 0)).unwrap().set_locked(true);
        fx.apply(&mut RandomDispose::new(3)).unwrap();
        assert_eq!(fx.level((0, 0)), Some(2));
        assert_eq!(fx.level((0, 1)), None);
    }

    #[test]
    fn random_swap_exchanges_two_tiles() {
        let mut fx = Fixture::new(&[((0, 0), 2), ((2, 2), 7)]);
        fx.apply(&mut RandomSwap::new(3)).unwrap();
        assert_eq!(fx.level((0, 0)), Some(7));
        assert_eq!(fx.level((2, 2)), Some(2));
    }

    #[test]
    fn random_scramble_needs_two_unlocked_tiles() {
        let mut fx = Fixture::new(&[((0, 0), 2)]);
        assert!(fx.apply(&mut RandomScramble::new(3)).is_err());
    }
}
