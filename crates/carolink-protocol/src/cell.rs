//! Cell identifier type

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Number of cells on the board
pub const CELL_COUNT: u8 = 12;

/// Display order of the grid, top row first.
///
/// The board is presented as 4 rows of 3. Numbering runs bottom-left to
/// top-right, so the top display row holds the highest numbers. This
/// ordering affects presentation only, never semantics.
pub const GRID_ROWS: [[CellId; 3]; 4] = [
    [CellId(10), CellId(11), CellId(12)],
    [CellId(7), CellId(8), CellId(9)],
    [CellId(4), CellId(5), CellId(6)],
    [CellId(1), CellId(2), CellId(3)],
];

/// Identifier of one board cell, always in 1..=12.
///
/// Serialized as a bare number on the wire (the `num` field of set/remove
/// messages, and the keys of the `squares` map).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CellId(u8);

impl CellId {
    /// Create a cell ID, validating the range
    pub fn new(id: u8) -> Result<Self, ProtocolError> {
        Self::try_from(id)
    }

    /// Get the raw cell number
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for CellId {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=CELL_COUNT).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ProtocolError::InvalidCell(value))
        }
    }
}

impl From<CellId> for u8 {
    fn from(cell: CellId) -> Self {
        cell.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CellId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .parse()
            .map_err(|_| ProtocolError::InvalidCell(0))?;
        Self::try_from(value)
    }
}
