//! Player abilities.
//!
//! Every loadout has the built-in [`Attack`], up to two active abilities and
//! an optional passive. Actives are triggered by the player and go through
//! the usual modifier lifecycle; passives start applying when the level is
//! built and never finish.
//!
//! | name id | kind | cooldown | effect |
//! |---|---|---|---|
//! | `attack` | built in | 10 | throws a tile at the entity |
//! | `crit` | active | 40 | next attack deals +200 % |
//! | `merge` | active | 5 | merges two tiles of the same level |
//! | `upgrade` | active | 35 | raises a tile by one level |
//! | `dispose` | active | 20 | removes a tile |
//! | `swap` | active | 15 | swaps two tiles |
//! | `scramble` | active | 30 | shuffles the unlocked tiles |
//! | `bonusDamage` | passive | | every attack deals +50 % |
//! | `cooldownReduction` | passive | | active cooldowns are a quarter shorter |
//! | `resistance` | passive | | blocks a quarter of obstacles |
//! | `betterBaseLevel` | passive | | new tiles start one level higher |

mod attack;
mod crit;
mod kinds;
pub mod manager;
mod merge;
mod passives;
mod tile_actives;
mod upgrade;

pub use attack::{Attack, ATTACK_COOLDOWN};
pub use crit::{Crit, CRIT_BONUS_PERCENT};
pub use kinds::{AbilityKind, PassiveKind};
pub use manager::AbilityManager;
pub use merge::Merge;
pub use passives::{BetterBaseLevel, BonusDamage, CooldownReduction, Resistance};
pub use tile_actives::{Dispose, Scramble, Swap};
pub use upgrade::Upgrade;

use crate::board::{Board, Cell};

/// Returns true if the cell holds a tile that is not locked.
pub(crate) fn is_unlocked_tile(board: &Board, cell: Cell) -> bool {
    board.tile(cell).is_some_and(|tile| !tile.is_locked())
}
