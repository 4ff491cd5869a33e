//! Adversarial modifiers and their scheduler.
//!
//! Obstacles are [`Modifier`](crate::modifier::Modifier)s that the
//! [`ObstacleManager`] fires on its own, at a random but bounded interval,
//! choosing among the level's obstacles by weight. Every obstacle applies
//! instantly and plays a short board animation.
//!
//! | name id | applicable when | effect |
//! |---|---|---|
//! | `freeze` | an unlocked tile exists | locks a random tile for [`FREEZE_TURNS`] turns |
//! | `damageEntity` | repair mode, health above zero | entity loses a tenth of its max health |
//! | `healEntity` | attack mode, health below max | entity regains a tenth of its max health |
//! | `downgrade` | an unlocked tile above level 1 exists | that tile loses a level |
//! | `garbageTile` | an empty cell exists | a base-level tile appears |
//! | `randomDispose` | an unlocked tile exists | a random unlocked tile is removed |
//! | `randomSwap` | two unlocked tiles exist | two random unlocked tiles trade places |
//! | `randomScramble` | two unlocked tiles exist | unlocked tiles are shuffled |

mod board_effects;
mod entity_effects;
mod freeze;
mod kinds;
pub mod manager;

pub use board_effects::{Downgrade, GarbageTile, RandomDispose, RandomScramble, RandomSwap};
pub use entity_effects::{DamageEntity, HealEntity};
pub use freeze::{Freeze, FREEZE_TURNS};
pub use kinds::ObstacleKind;
pub use manager::{ObstacleEvent, ObstacleListener, ObstacleManager};
