//! Board state with per-category quotas
//!
//! The board is the mapping from cell to placed category. Mutation goes
//! through [`Board::toggle_or_assign`], which enforces the quota of each
//! category and reports the accepted change as a value. The board never
//! talks to the link itself; the caller turns the change into the
//! matching wire message, keeping the dependency direction one-way.

use std::collections::BTreeMap;

use carolink_protocol::{Category, CellId, Command};

/// An accepted board mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardChange {
    /// The cell now holds the category
    Assigned(CellId, Category),
    /// The cell was cleared
    Removed(CellId),
}

impl BoardChange {
    /// The wire message announcing this change to the board server
    pub fn to_command(&self) -> Command {
        match *self {
            BoardChange::Assigned(num, value) => Command::Set { num, value },
            BoardChange::Removed(num) => Command::Remove { num },
        }
    }
}

/// The cell-to-category mapping.
///
/// Unoccupied cells are absent from the mapping. After every mutation,
/// the occupancy of each category is at most its limit.
#[derive(Debug, Clone, Default)]
pub struct Board {
    cells: BTreeMap<CellId, Category>,
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Current assignments
    pub fn assignments(&self) -> &BTreeMap<CellId, Category> {
        &self.cells
    }

    /// Category currently held by a cell, if any
    pub fn get(&self, cell: CellId) -> Option<Category> {
        self.cells.get(&cell).copied()
    }

    /// Number of cells holding a category
    pub fn occupancy(&self, category: Category) -> usize {
        self.cells.values().filter(|&&v| v == category).count()
    }

    /// Quota headroom left for a category
    pub fn remaining(&self, category: Category) -> usize {
        category.limit().saturating_sub(self.occupancy(category))
    }

    /// Toggle a cell off, or assign a category to it.
    ///
    /// A cell already holding `category` is cleared; clearing is never
    /// quota-gated. Otherwise the quota check counts occupancy over the
    /// *other* cells only, so a cell holding a different category may be
    /// overwritten as long as `category` has headroom on the rest of the
    /// board. Returns `None` when the quota is full; the board is then
    /// unchanged.
    pub fn toggle_or_assign(&mut self, cell: CellId, category: Category) -> Option<BoardChange> {
        if self.cells.get(&cell) == Some(&category) {
            self.cells.remove(&cell);
            return Some(BoardChange::Removed(cell));
        }

        let occupied_elsewhere = self
            .cells
            .iter()
            .filter(|&(&c, &v)| c != cell && v == category)
            .count();
        if occupied_elsewhere >= category.limit() {
            return None;
        }

        self.cells.insert(cell, category);
        Some(BoardChange::Assigned(cell, category))
    }

    /// Clear every cell
    pub fn reset_all(&mut self) {
        self.cells.clear();
    }

    /// Whether no cell is occupied
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }
}
