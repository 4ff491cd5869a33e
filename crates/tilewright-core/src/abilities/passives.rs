//! Passive abilities.
//!
//! Passives start applying when the [`AbilityManager`](super::AbilityManager)
//! is built and stay `Applying` for the whole level. Their effects run
//! through the modifier hooks: strikes, obstacle picks and cooldown
//! adjustment.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::error::LogicError;
use crate::modifier::{AbilitySlot, LevelContext, Modifier, ModifierCore, ModifierId, Progress, Strike};
use crate::obstacles::ObstacleEvent;

/// Bonus every strike gets from `bonusDamage`, in percent.
pub const BONUS_DAMAGE_PERCENT: i64 = 50;

/// Share of active cooldowns `cooldownReduction` removes, in percent.
pub const COOLDOWN_REDUCTION_PERCENT: u32 = 25;

/// Chance `resistance` blocks an obstacle, in percent.
pub const RESISTANCE_PERCENT: u32 = 25;

fn passive_core(name_id: &'static str) -> ModifierCore {
    ModifierCore::new(ModifierId::Ability(AbilitySlot::Passive), name_id, 0)
}

/// Adds [`BONUS_DAMAGE_PERCENT`] to every strike.
#[derive(Debug)]
pub struct BonusDamage {
    core: ModifierCore,
}

impl BonusDamage {
    /// Creates the passive.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: passive_core("bonusDamage"),
        }
    }
}

impl Default for BonusDamage {
    fn default() -> Self {
        Self::new()
    }
}

impl Modifier for BonusDamage {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn begin(&mut self, _ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        Ok(Progress::Pending)
    }

    fn on_strike(&mut self, strike: &mut Strike) -> Progress {
        strike.add_bonus_percent(BONUS_DAMAGE_PERCENT);
        Progress::Pending
    }
}

/// Shortens the cooldown of every other ability by
/// [`COOLDOWN_REDUCTION_PERCENT`].
#[derive(Debug)]
pub struct CooldownReduction {
    core: ModifierCore,
}

impl CooldownReduction {
    /// Creates the passive.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: passive_core("cooldownReduction"),
        }
    }
}

impl Default for CooldownReduction {
    fn default() -> Self {
        Self::new()
    }
}

impl Modifier for CooldownReduction {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn begin(&mut self, _ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        Ok(Progress::Pending)
    }

    fn adjust_cooldown(&self, duration: u32) -> u32 {
        duration - duration * COOLDOWN_REDUCTION_PERCENT / 100
    }
}

/// Blocks each obstacle pick with [`RESISTANCE_PERCENT`] probability.
#[derive(Debug)]
pub struct Resistance {
    core: ModifierCore,
}

impl Resistance {
    /// Creates the passive.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: passive_core("resistance"),
        }
    }
}

impl Default for Resistance {
    fn default() -> Self {
        Self::new()
    }
}

impl Modifier for Resistance {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn begin(&mut self, _ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        Ok(Progress::Pending)
    }

    fn on_obstacle(&mut self, event: &mut ObstacleEvent, rng: &mut ChaCha8Rng) {
        let Some(kind) = event.obstacle() else {
            return;
        };
        if rng.gen_range(0..100) < RESISTANCE_PERCENT {
            debug!(obstacle = %kind, "obstacle resisted");
            event.block();
        }
    }
}

/// Raises the level of generated tiles by one.
#[derive(Debug)]
pub struct BetterBaseLevel {
    core: ModifierCore,
}

impl BetterBaseLevel {
    /// Creates the passive.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: passive_core("betterBaseLevel"),
        }
    }
}

impl Default for BetterBaseLevel {
    fn default() -> Self {
        Self::new()
    }
}

impl Modifier for BetterBaseLevel {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        let level = ctx.board.base_level().saturating_add(1);
        ctx.board.set_base_level(level);
        info!(base_level = ctx.board.base_level(), "base tile level raised");
        Ok(Progress::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Cell};
    use crate::entity::{Entity, GameMode};
    use crate::obstacles::ObstacleKind;
    use rand::SeedableRng;

    #[test]
    fn bonus_damage_adds_half() {
        let mut bonus = BonusDamage::new();
        let mut strike = Strike::new(Cell::new(0, 0), 2, 20);
        bonus.on_strike(&mut strike);
        assert_eq!(strike.damage(), 30);
    }

    #[test]
    fn cooldown_reduction_takes_a_quarter() {
        let reduction = CooldownReduction::new();
        assert_eq!(reduction.adjust_cooldown(40), 30);
        assert_eq!(reduction.adjust_cooldown(10), 8);
        assert_eq!(reduction.adjust_cooldown(0), 0);
    }

    #[test]
    fn resistance_blocks_about_a_quarter() {
        let mut resistance = Resistance::new();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let blocked = (0..4_000)
            .filter(|_| {
                let mut event = ObstacleEvent::new(ObstacleKind::Freeze);
                resistance.on_obstacle(&mut event, &mut rng);
                event.obstacle().is_none()
            })
            .count();
        assert!((800..=1_200).contains(&blocked), "blocked {blocked} of 4000");
    }

    #[test]
    fn better_base_level_raises_generated_tiles() {
        let mut board = Board::new(2, 2, 9).unwrap();
        let mut entity = Entity::new(GameMode::Attack, 10, 10).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut events = Vec::new();
        let mut passive = BetterBaseLevel::new();
        passive.update_applicability(&board, &entity, &mut events);
        let progress = passive
            .start_application(&mut LevelContext {
                board: &mut board,
                entity: &mut entity,
                rng: &mut rng,
                events: &mut events,
            })
            .unwrap();
        assert_eq!(progress, Progress::Pending);
        assert_eq!(board.base_level(), 2);
    }
}
