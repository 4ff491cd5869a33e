//! Grid coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable grid coordinate on a [`Board`](super::Board).
///
/// Cells are compared, ordered and hashed by `(row, col)`, so two cells with
/// the same coordinate are the same cell. Ordering is row-major, which the
/// board relies on for deterministic iteration.
///
/// # Example
///
/// ```
/// use tilewright_core::board::Cell;
///
/// let a = Cell::new(0, 1);
/// let b = Cell::new(1, 0);
///
/// assert!(a < b);
/// assert_eq!(a, Cell::new(0, 1));
/// assert_eq!(a.to_string(), "(0, 1)");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    row: u16,
    col: u16,
}

impl Cell {
    /// Creates a cell at `(row, col)`.
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// Returns the row index.
    #[must_use]
    pub const fn row(self) -> u16 {
        self.row
    }

    /// Returns the column index.
    #[must_use]
    pub const fn col(self) -> u16 {
        self.col
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell({}, {})", self.row, self.col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(u16, u16)> for Cell {
    fn from((row, col): (u16, u16)) -> Self {
        Self::new(row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_order_row_major() {
        let mut cells = vec![Cell::new(1, 0), Cell::new(0, 2), Cell::new(0, 0), Cell::new(1, 1)];
        cells.sort();
        assert_eq!(
            cells,
            vec![Cell::new(0, 0), Cell::new(0, 2), Cell::new(1, 0), Cell::new(1, 1)]
        );
    }

    #[test]
    fn cell_from_tuple() {
        assert_eq!(Cell::from((3, 4)), Cell::new(3, 4));
    }
}
