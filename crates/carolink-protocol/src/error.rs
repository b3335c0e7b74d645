//! Protocol error types

use thiserror::Error;

/// Errors that can occur while building or encoding wire messages
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Cell number outside the board
    #[error("Invalid cell number: {0} (expected 1..=12)")]
    InvalidCell(u8),

    /// Category name not recognized
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// JSON encoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
