//! Tiles and tile flags.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Board-unique identifier of a tile.
///
/// Ids are assigned by the board in creation order and never reused, so an
/// obstacle can follow "its" tile even after the tile changes cells.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(u64);

impl TileId {
    /// Creates a tile id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileId({})", self.0)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    /// Per-tile status flags.
    ///
    /// - `LOCKED`: the tile cannot be moved, merged or targeted by abilities
    /// - `VISUALLY_LOCKED`: presentation hint only, no gameplay effect
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TileFlags: u8 {
        /// Tile is blocked for gameplay purposes.
        const LOCKED          = 1 << 0;
        /// Tile is drawn as locked.
        const VISUALLY_LOCKED = 1 << 1;
    }
}

/// A numbered tile occupying one board cell.
///
/// Tiles are owned by the board's cell table and only handed out by
/// reference, or by value when removed from the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    id: TileId,
    level: u8,
    flags: TileFlags,
}

impl Tile {
    pub(crate) const fn new(id: TileId, level: u8) -> Self {
        Self {
            id,
            level,
            flags: TileFlags::empty(),
        }
    }

    /// Returns the tile id.
    #[must_use]
    pub const fn id(&self) -> TileId {
        self.id
    }

    /// Returns the tile level.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    pub(crate) fn set_level(&mut self, level: u8) {
        self.level = level;
    }

    /// Returns the tile flags.
    #[must_use]
    pub const fn flags(&self) -> TileFlags {
        self.flags
    }

    /// Returns true if the tile is blocked for gameplay.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.flags.contains(TileFlags::LOCKED)
    }

    /// Returns true if the tile is drawn as locked.
    #[must_use]
    pub const fn is_visually_locked(&self) -> bool {
        self.flags.contains(TileFlags::VISUALLY_LOCKED)
    }

    /// Sets or clears the gameplay lock.
    pub fn set_locked(&mut self, locked: bool) {
        self.flags.set(TileFlags::LOCKED, locked);
    }

    /// Sets or clears the presentation lock.
    pub fn set_visually_locked(&mut self, locked: bool) {
        self.flags.set(TileFlags::VISUALLY_LOCKED, locked);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tile_is_unlocked() {
        let tile = Tile::new(TileId::new(1), 3);
        assert_eq!(tile.level(), 3);
        assert!(!tile.is_locked());
        assert!(!tile.is_visually_locked());
    }

    #[test]
    fn lock_flags_are_independent() {
        let mut tile = Tile::new(TileId::new(1), 1);
        tile.set_locked(true);
        assert!(tile.is_locked());
        assert!(!tile.is_visually_locked());

        tile.set_visually_locked(true);
        tile.set_locked(false);
        assert_eq!(tile.flags(), TileFlags::VISUALLY_LOCKED);
    }
}
