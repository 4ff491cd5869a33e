//! Test helpers for building levels and driving input.

use std::collections::BTreeMap;

use crate::board::{BoardState, Cell, Tile};
use crate::config::{LevelConfig, Loadout};
use crate::entity::EntityState;
use crate::events::LevelEvent;
use crate::input::InputAction;
use crate::level::Level;
use crate::modifier::{AbilitySlot, ModifierState};

/// Ticks to wait for animations before giving up.
const SETTLE_LIMIT: usize = 64;

// =============================================================================
// Configuration
// =============================================================================

/// Returns a config with an empty board, no obstacles and one-frame
/// animations.
pub fn quick_config() -> LevelConfig {
    let mut config = LevelConfig {
        initial_tiles: 0,
        ..LevelConfig::default()
    };
    config.animation.board_frames = 1;
    config.animation.entity_frames = 1;
    config
}

/// Builds a loadout from optional name ids.
pub fn loadout(active1: Option<&str>, active2: Option<&str>, passive: Option<&str>) -> Loadout {
    Loadout {
        active1: active1.map(str::to_string),
        active2: active2.map(str::to_string),
        passive: passive.map(str::to_string),
    }
}

/// Builds an obstacle weight table.
pub fn weights(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
    entries
        .iter()
        .map(|(name, weight)| ((*name).to_string(), *weight))
        .collect()
}

// =============================================================================
// Level Setup
// =============================================================================

/// Builds a level and places tiles before any input.
///
/// # Arguments
///
/// * `config` - Level configuration
/// * `tiles` - `(row, col, level)` triples to place
///
/// Events from construction and placement are drained.
pub fn level_with_tiles(config: LevelConfig, tiles: &[(u16, u16, u8)]) -> Level {
    let mut level = Level::new(config).unwrap();
    for &(row, col, tile_level) in tiles {
        level.board_mut().place_tile(Cell::new(row, col), tile_level).unwrap();
    }
    // An empty tick refreshes applicability after placement.
    level.update().unwrap();
    level.take_events();
    level
}

/// Returns the level of the tile in a cell.
pub fn tile_level(level: &Level, row: u16, col: u16) -> Option<u8> {
    level.board().tile(Cell::new(row, col)).map(Tile::level)
}

// =============================================================================
// Input
// =============================================================================

/// Queues an action and runs one tick.
pub fn act(level: &mut Level, action: InputAction) {
    level.request(action);
    level.update().unwrap();
}

/// Clicks a cell and runs one tick.
pub fn click(level: &mut Level, row: u16, col: u16) {
    act(level, InputAction::SelectTile(Cell::new(row, col)));
}

/// Ticks until the board and entity animations have finished.
pub fn settle(level: &mut Level) {
    for _ in 0..SETTLE_LIMIT {
        let animating = level.board().state() == BoardState::Animating
            || level.entity().state() == EntityState::Animating;
        if !animating {
            return;
        }
        level.update().unwrap();
    }
    panic!("level did not settle within {SETTLE_LIMIT} ticks");
}

/// Completes a turn and lets any obstacle animation finish.
pub fn turn(level: &mut Level) {
    level.complete_turn().unwrap();
    settle(level);
}

/// Plays a simple scripted game: merge when possible, otherwise attack the
/// first eligible tile, then spawn a tile and end the turn.
///
/// Returns every event the level recorded.
pub fn play_scripted(level: &mut Level, turns: usize) -> Vec<LevelEvent> {
    let mut events = level.take_events();
    for _ in 0..turns {
        if level.is_over() {
            break;
        }
        let trigger = if level.abilities().state(AbilitySlot::Active1) == Some(ModifierState::Applicable) {
            Some(InputAction::Active1)
        } else if level.abilities().state(AbilitySlot::Attack) == Some(ModifierState::Applicable) {
            Some(InputAction::Attack)
        } else {
            None
        };
        if let Some(trigger) = trigger {
            act(level, trigger);
            for _ in 0..2 {
                let Some(cell) = level.board().selectable_cells().first().copied() else {
                    break;
                };
                act(level, InputAction::SelectTile(cell));
            }
            if level.board().selection().is_some() {
                act(level, InputAction::CancelSelection);
            }
        }
        settle(level);
        level.generate_tile();
        level.complete_turn().unwrap();
        settle(level);
        events.extend(level.take_events());
    }
    events
}

/// Counts events matching a predicate.
pub fn count(events: &[LevelEvent], predicate: impl Fn(&LevelEvent) -> bool) -> usize {
    events.iter().filter(|event| predicate(event)).count()
}
