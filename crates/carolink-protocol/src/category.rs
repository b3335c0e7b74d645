//! Marker categories and their board quotas

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Marker category an operator can place on a cell.
///
/// The board holds at most `limit()` cells of each category at once.
/// Wire names are the exact variant names ("R1", "Fake", "Real").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    R1,
    Fake,
    Real,
}

impl Category {
    /// All categories, in the order the console lists them
    pub const ALL: [Category; 3] = [Category::R1, Category::Fake, Category::Real];

    /// Maximum number of cells that may hold this category at once
    pub fn limit(&self) -> usize {
        match self {
            Category::R1 => 3,
            Category::Fake => 1,
            Category::Real => 4,
        }
    }

    /// Wire name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::R1 => "R1",
            Category::Fake => "Fake",
            Category::Real => "Real",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "r1" => Ok(Category::R1),
            "fake" => Ok(Category::Fake),
            "real" => Ok(Category::Real),
            _ => Err(ProtocolError::UnknownCategory(s.to_string())),
        }
    }
}
