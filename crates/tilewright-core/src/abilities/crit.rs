//! The `crit` active.

use tracing::debug;

use crate::error::LogicError;
use crate::modifier::{
    AbilitySlot, LevelContext, Modifier, ModifierCore, ModifierId, ModifierState, Progress, Strike,
};

/// Bonus a critical strike adds, in percent.
pub const CRIT_BONUS_PERCENT: i64 = 200;

const CRIT_COOLDOWN: u32 = 40;

/// Charges the next attack with a [`CRIT_BONUS_PERCENT`] bonus.
///
/// Crit stays `Applying` until a strike is offered to it; that strike
/// completes the application.
#[derive(Debug)]
pub struct Crit {
    core: ModifierCore,
}

impl Crit {
    /// Creates the ability for a slot.
    #[must_use]
    pub fn new(slot: AbilitySlot) -> Self {
        Self {
            core: ModifierCore::new(ModifierId::Ability(slot), "crit", CRIT_COOLDOWN),
        }
    }
}

impl Modifier for Crit {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn begin(&mut self, _ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        debug!("next attack charged");
        Ok(Progress::Pending)
    }

    fn on_strike(&mut self, strike: &mut Strike) -> Progress {
        if self.state() != ModifierState::Applying {
            return Progress::Pending;
        }
        strike.add_bonus_percent(CRIT_BONUS_PERCENT);
        Progress::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Cell};
    use crate::entity::{Entity, GameMode};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn idle_crit_ignores_strikes() {
        let mut crit = Crit::new(AbilitySlot::Active1);
        let mut strike = Strike::new(Cell::new(0, 0), 1, 10);
        assert_eq!(crit.on_strike(&mut strike), Progress::Pending);
        assert_eq!(strike.damage(), 10);
    }

    #[test]
    fn charged_crit_triples_next_strike() {
        let mut board = Board::new(2, 2, 9).unwrap();
        let mut entity = Entity::new(GameMode::Attack, 100, 100).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut events = Vec::new();
        let mut crit = Crit::new(AbilitySlot::Active1);
        crit.update_applicability(&board, &entity, &mut events);
        let mut ctx = LevelContext {
            board: &mut board,
            entity: &mut entity,
            rng: &mut rng,
            events: &mut events,
        };
        assert_eq!(crit.start_application(&mut ctx), Ok(Progress::Pending));

        let mut strike = Strike::new(Cell::new(0, 0), 1, 10);
        assert_eq!(crit.on_strike(&mut strike), Progress::Completed);
        assert_eq!(strike.damage(), 30);
    }
}
