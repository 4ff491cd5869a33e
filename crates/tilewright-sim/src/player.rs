//! A greedy scripted player.
//!
//! Each turn the player fires the first ability that is applicable, in the
//! order `active1`, `active2`, `attack`, and answers its selection with the
//! highest-level eligible tiles. Then a tile spawns and the turn ends.

use anyhow::{bail, Result};
use tilewright_core::board::{BoardState, Cell};
use tilewright_core::entity::EntityState;
use tilewright_core::modifier::{AbilitySlot, ModifierState};
use tilewright_core::{InputAction, Level};
use tracing::debug;

/// Ticks allowed for animations to finish before the run is abandoned.
const MAX_SETTLE_TICKS: u32 = 10_000;

/// Order in which the player tries its abilities.
const PREFERENCE: [(AbilitySlot, InputAction); 3] = [
    (AbilitySlot::Active1, InputAction::Active1),
    (AbilitySlot::Active2, InputAction::Active2),
    (AbilitySlot::Attack, InputAction::Attack),
];

/// Plays one turn at a time against a [`Level`].
#[derive(Debug, Default)]
pub struct ScriptedPlayer {
    turns: u32,
}

impl ScriptedPlayer {
    /// Creates a player.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses at most one ability, spawns a tile and completes the turn.
    pub fn play_turn(&mut self, level: &mut Level) -> Result<()> {
        self.turns += 1;

        let choice = PREFERENCE
            .into_iter()
            .find(|(slot, _)| level.abilities().state(*slot) == Some(ModifierState::Applicable));
        if let Some((slot, action)) = choice {
            debug!(turn = self.turns, %slot, "using ability");
            level.request(action);
            level.update()?;
            answer_selection(level)?;
        }

        settle(level)?;
        if level.generate_tile().is_none() {
            debug!(turn = self.turns, "board full");
        }
        level.complete_turn()?;
        settle(level)
    }
}

/// Clicks the highest-level eligible cell until the selection completes.
fn answer_selection(level: &mut Level) -> Result<()> {
    while let Some(session) = level.board().selection() {
        let remaining = session.count() - session.selected().len();
        let Some(cell) = best_cell(level) else {
            level.request(InputAction::CancelSelection);
            level.update()?;
            return Ok(());
        };
        level.request(InputAction::SelectTile(cell));
        level.update()?;

        let still_waiting = level
            .board()
            .selection()
            .is_some_and(|session| session.count() - session.selected().len() == remaining);
        if still_waiting {
            bail!("selection of {cell} was not accepted");
        }
    }
    Ok(())
}

fn best_cell(level: &Level) -> Option<Cell> {
    let board = level.board();
    board
        .selectable_cells()
        .into_iter()
        .max_by_key(|cell| board.tile(*cell).map_or(0, |tile| tile.level()))
}

fn settle(level: &mut Level) -> Result<()> {
    for _ in 0..MAX_SETTLE_TICKS {
        let animating = level.board().state() == BoardState::Animating
            || level.entity().state() == EntityState::Animating;
        if !animating {
            return Ok(());
        }
        level.update()?;
    }
    bail!("animations did not finish within {MAX_SETTLE_TICKS} ticks")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilewright_core::{LevelConfig, Loadout};

    #[test]
    fn plays_default_level() {
        let mut level = Level::new(LevelConfig::default()).unwrap();
        let mut player = ScriptedPlayer::new();
        for _ in 0..30 {
            if level.is_over() {
                break;
            }
            player.play_turn(&mut level).unwrap();
        }
        assert!(level.board().turn() > 0);
        assert_eq!(level.board().state(), BoardState::Idle);
    }

    #[test]
    fn merges_with_full_loadout() {
        let config = LevelConfig {
            initial_tiles: 8,
            loadout: Loadout {
                active1: Some("merge".to_string()),
                active2: Some("upgrade".to_string()),
                passive: Some("bonusDamage".to_string()),
            },
            ..LevelConfig::default()
        };
        let mut level = Level::new(config).unwrap();
        let mut player = ScriptedPlayer::new();
        let mut events = Vec::new();
        for _ in 0..20 {
            player.play_turn(&mut level).unwrap();
            events.extend(level.take_events());
        }
        assert!(events.iter().any(|event| matches!(
            event,
            tilewright_core::LevelEvent::ModifierApplied { name: "merge" | "upgrade" | "attack", .. }
        )));
    }
}
