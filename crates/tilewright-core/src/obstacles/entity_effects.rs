//! Obstacles that act on the entity.

use tracing::info;

use super::ObstacleKind;
use crate::board::Board;
use crate::entity::{Entity, GameMode};
use crate::error::LogicError;
use crate::events::LevelEvent;
use crate::modifier::{LevelContext, Modifier, ModifierCore, ModifierId, Progress};

/// Share of max health, in percent, the entity obstacles move.
pub const ENTITY_EFFECT_PERCENT: i64 = 10;

fn effect_amount(entity: &Entity) -> i64 {
    (entity.max_health() * ENTITY_EFFECT_PERCENT / 100).max(1)
}

/// Damages the entity in repair mode.
#[derive(Debug)]
pub struct DamageEntity {
    core: ModifierCore,
    animation_frames: u32,
}

impl DamageEntity {
    /// Creates the obstacle.
    #[must_use]
    pub fn new(animation_frames: u32) -> Self {
        let kind = ObstacleKind::DamageEntity;
        Self {
            core: ModifierCore::new(ModifierId::Obstacle(kind), kind.name_id(), 0),
            animation_frames,
        }
    }
}

impl Modifier for DamageEntity {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn predicate(&self, _board: &Board, entity: &Entity) -> bool {
        entity.mode() == GameMode::Repair && entity.health() > 0
    }

    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        let amount = effect_amount(ctx.entity);
        ctx.entity.take_damage(amount)?;
        ctx.entity.animate_damage(amount);
        info!(amount, health = ctx.entity.health(), "entity damaged by obstacle");
        ctx.events.push(LevelEvent::EntityDamaged {
            amount,
            health: ctx.entity.health(),
        });
        ctx.board.start_animation(self.animation_frames);
        Ok(Progress::Completed)
    }
}

/// Heals the entity in attack mode.
#[derive(Debug)]
pub struct HealEntity {
    core: ModifierCore,
    animation_frames: u32,
}

impl HealEntity {
    /// Creates the obstacle.
    #[must_use]
    pub fn new(animation_frames: u32) -> Self {
        let kind = ObstacleKind::HealEntity;
        Self {
            core: ModifierCore::new(ModifierId::Obstacle(kind), kind.name_id(), 0),
            animation_frames,
        }
    }
}

impl Modifier for HealEntity {
    fn core(&self) -> &ModifierCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModifierCore {
        &mut self.core
    }

    fn predicate(&self, _board: &Board, entity: &Entity) -> bool {
        entity.mode() == GameMode::Attack && entity.health() < entity.max_health()
    }

    fn begin(&mut self, ctx: &mut LevelContext<'_>) -> Result<Progress, LogicError> {
        let amount = effect_amount(ctx.entity);
        ctx.entity.take_healing(amount)?;
        ctx.entity.animate_healing(amount);
        info!(amount, health = ctx.entity.health(), "entity healed by obstacle");
        ctx.events.push(LevelEvent::EntityHealed {
            amount,
            health: ctx.entity.health(),
        });
        ctx.board.start_animation(self.animation_frames);
        Ok(Progress::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn run(obstacle: &mut dyn Modifier, entity: &mut Entity) -> Result<Progress, LogicError> {
        let mut board = Board::new(2, 2, 9).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut events = Vec::new();
        obstacle.update_applicability(&board, entity, &mut events);
        obstacle.start_application(&mut LevelContext {
            board: &mut board,
            entity,
            rng: &mut rng,
            events: &mut events,
        })
    }

    #[test]
    fn damage_entity_takes_a_tenth_in_repair_mode() {
        let mut entity = Entity::new(GameMode::Repair, 200, 100).unwrap();
        run(&mut DamageEntity::new(2), &mut entity).unwrap();
        assert_eq!(entity.health(), 80);
    }

    #[test]
    fn damage_entity_is_idle_in_attack_mode() {
        let mut entity = Entity::new(GameMode::Attack, 200, 100).unwrap();
        assert!(run(&mut DamageEntity::new(2), &mut entity).is_err());
        assert_eq!(entity.health(), 100);
    }

    #[test]
    fn heal_entity_needs_missing_health() {
        let mut entity = Entity::new(GameMode::Attack, 200, 200).unwrap();
        assert!(run(&mut HealEntity::new(2), &mut entity).is_err());
    }

    #[test]
    fn heal_entity_heals_at_least_one() {
        let mut entity = Entity::new(GameMode::Attack, 5, 3).unwrap();
        run(&mut HealEntity::new(2), &mut entity).unwrap();
        assert_eq!(entity.health(), 4);
    }
}
