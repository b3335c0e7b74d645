//! carolink-core: board state and session control for the carolink console
//!
//! This crate owns the logic of the console: the quota-enforcing board
//! mapping, the run/retry session state machine that locks controls while
//! a run is active, and the settings store that remembers the board server
//! address. The connection itself lives behind the [`Link`] trait so the
//! controller never depends on a concrete transport.

pub mod board;
pub mod error;
pub mod link;
pub mod session;
pub mod settings;
pub mod types;

pub use board::{Board, BoardChange};
pub use error::SettingsError;
pub use link::Link;
pub use session::{RunPhase, SessionController};
pub use settings::{FileSettings, MemorySettings, SettingsStore, SERVER_ADDRESS_KEY};
pub use types::LinkStatus;
