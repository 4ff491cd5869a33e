//! Run summary printed at the end of a simulation.

use std::collections::BTreeMap;

use serde::Serialize;
use tilewright_core::{Cue, GameMode, Level, LevelEvent, LevelOutcome};

/// What happened during one run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub mode: GameMode,
    pub turns: u64,
    pub outcome: Option<LevelOutcome>,
    pub health: i64,
    pub max_health: i64,
    pub tiles: usize,
    pub abilities_applied: BTreeMap<String, u32>,
    pub obstacles_triggered: BTreeMap<String, u32>,
    pub obstacles_blocked: u32,
    pub cues: BTreeMap<String, u32>,
}

impl RunSummary {
    /// Starts a summary for a freshly built level.
    pub fn new(level: &Level) -> Self {
        Self {
            seed: level.config().seed,
            mode: level.config().mode,
            turns: 0,
            outcome: None,
            health: level.entity().health(),
            max_health: level.entity().max_health(),
            tiles: level.board().tile_count(),
            abilities_applied: BTreeMap::new(),
            obstacles_triggered: BTreeMap::new(),
            obstacles_blocked: 0,
            cues: BTreeMap::new(),
        }
    }

    /// Fills the summary from the final level state and its event log.
    pub fn record(&mut self, level: &Level, events: &[LevelEvent]) {
        self.turns = level.board().turn();
        self.outcome = level.outcome();
        self.health = level.entity().health();
        self.tiles = level.board().tile_count();
        self.obstacles_blocked = level.obstacles().blocked_count();

        for event in events {
            match event {
                LevelEvent::ModifierApplied { id, name } if id.is_ability() => {
                    *self.abilities_applied.entry((*name).to_string()).or_default() += 1;
                }
                LevelEvent::ObstacleTriggered { kind } => {
                    *self.obstacles_triggered.entry(kind.to_string()).or_default() += 1;
                }
                LevelEvent::Cue(cue) => self.count_cue(*cue),
                _ => {}
            }
        }
    }

    fn count_cue(&mut self, cue: Cue) {
        *self.cues.entry(cue.as_str().to_string()).or_default() += 1;
    }
}
