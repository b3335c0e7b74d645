//! carolink-protocol: wire protocol for the carolink board console
//!
//! This crate defines the JSON messages the console sends to the board
//! server over its WebSocket link, and the cell/category domain types
//! those messages carry.

pub mod category;
pub mod cell;
pub mod command;
pub mod error;

pub use category::Category;
pub use cell::{CellId, CELL_COUNT, GRID_ROWS};
pub use command::Command;
pub use error::ProtocolError;
