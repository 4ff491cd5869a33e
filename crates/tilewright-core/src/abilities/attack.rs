//! The built-in attack.

use tracing::{debug, info};

use crate::board::{Board, Cell, CellPredicate};
use crate::entity::{Entity, GameMode};
use crate::error::LogicError;
use crate::events::LevelEvent;
use crate::modifier::{
    AbilitySlot, LevelContext, Modifier, ModifierCore, ModifierId, Progress, Strike,
};

/// Turns the attack is unavailable after use.
pub const ATTACK_COOLDOWN: u32 = 10;

/// Throws a player-selected tile at the entity.
///
/// The thrown tile leaves the board when the selection completes. Its
/// [`Strike`] is built at that point, offered to the other abilities by the
/// [`AbilityManager`](super::AbilityManager), then launched: the board
/// animates and the damage lands once the animation finishes. In repair
/// mode the strike heals instead.
///
/// Damage is `base_tile_damage × 2^(level − 1)`.
#[derive(Debug)]
pub struct Attack {
    core: ModifierCore,
    base_tile_damage: i64,
    animation_frames: u32,
    prepared: Option<Strike>,
    in_flight: Option<i64>,
}

impl Attack {
    /// Creates the attack.
    #[must_use]
    pub fn new(base_tile_damage: i64, animation_frames: u32) -> Self {
        Self {
            core: ModifierCore::new(ModifierId::Ability(AbilitySlot::Attack), "attack", ATTACK_COOLDOWN),
            base_tile_damage,
            animation_frames,
            prepared: None,
            in_flight: None,
        }
    }

    /// Returns the damage a tile of `level` deals before bonuses.
    #[must_use]
    pub fn tile_damage(&self, level: u8) -> i64 {
        let doublings = u32::from(level.saturating_sub(1)).min(62);
        self.base_tile_damage.saturating_mul(1_i64 << doublings)
    }

    /// Takes the strike built by the last completed selection.
    pub fn take_strike(&mut self) -> Option<Strike> {
        self.prepared.take()
    }

    /// Sends a strike on its way. It lands when the board animation ends.
    pub fn launch(&mut self, strike: Strike, ctx: &mut LevelContext<'_>) {
        let damage = strike.damage();
        info!(
            origin = %strike.origin(),
            level = strike.level(),
            bonus = strike.bonus_percent(),
            damage,
            "attack launched"
        );
        self.in_flight = Some(damage);
        ctx.board.start_animation(self.animation_frames);
    }

    /// Returns the damage waiting for the launch animation to finish.
    #[must_use]
    pub fn in_flight(&self) -> Option<i64> {
        self.in_flight
    }

    fn targets() -> CellPredicate {
        Box::new(|board: &Board, cell: Cell| board.tile(cell).is_some())
    }
}

impl Modifier for Attack {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn predicate(&self, board: &Board, _entity: &Entity) -> bool {
        board.tile_count() > 0
    }

    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        ctx.board.init_selection(self.id(), Self::targets(), 1)?;
        Ok(Progress::Pending)
    }

    fn on_selection_completed(
        &mut self,
        cells: &[Cell],
        ctx: &mut LevelContext<'_>,
    ) -> Result<Progress, LogicError> {
        let cell = *cells.first().ok_or(LogicError::InvalidSelectionCount)?;
        let tile = ctx.board.dispose_cell_content(cell)?;
        let strike = Strike::new(cell, tile.level(), self.tile_damage(tile.level()));
        debug!(%cell, level = tile.level(), base_damage = strike.base_damage(), "attack prepared");
        self.prepared = Some(strike);
        Ok(Progress::Completed)
    }

    fn on_animation_finished(&mut self, ctx: &mut LevelContext<'_>) -> Result<(), LogicError> {
        let Some(amount) = self.in_flight.take() else {
            return Ok(());
        };
        match ctx.entity.mode() {
            GameMode::Attack => {
                ctx.entity.take_damage(amount)?;
                ctx.entity.animate_damage(amount);
                ctx.events.push(LevelEvent::EntityDamaged {
                    amount,
                    health: ctx.entity.health(),
                });
            }
            GameMode::Repair => {
                ctx.entity.take_healing(amount)?;
                ctx.entity.animate_healing(amount);
                ctx.events.push(LevelEvent::EntityHealed {
                    amount,
                    health: ctx.entity.health(),
                });
            }
        }
        info!(amount, health = ctx.entity.health(), "attack landed");
        Ok(())
    }
}
