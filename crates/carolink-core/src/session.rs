//! Session controller: the run/retry state machine
//!
//! The controller owns the board, the armed category, the address pair,
//! and the run phase, and holds the link it drives. Every operator intent
//! funnels through here and runs to completion before the next one; while
//! a run is active (including while the retry prompt is showing) every
//! mutating intent is absorbed as a silent no-op.

use carolink_protocol::{Category, CellId, Command};

use crate::board::Board;
use crate::link::Link;
use crate::settings::{SettingsStore, SERVER_ADDRESS_KEY};
use crate::types::LinkStatus;

/// Run lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// No run active; the board is editable
    Idle,
    /// A run was started; controls are locked
    Running,
    /// Primary action pressed during a run; awaiting confirmation,
    /// controls still locked
    RetryPending,
}

/// Owns all session state and drives the link.
///
/// Generic over the link and the settings store so tests can substitute
/// recording doubles for both.
pub struct SessionController<L: Link, S: SettingsStore> {
    board: Board,
    phase: RunPhase,
    armed: Option<Category>,
    address: String,
    saved_address: Option<String>,
    link: L,
    store: S,
}

impl<L: Link, S: SettingsStore> SessionController<L, S> {
    /// Create a controller with an empty board, preloading the saved
    /// address from the store. A store failure is logged and leaves both
    /// address values empty.
    pub fn new(link: L, store: S) -> Self {
        let saved = match store.get(SERVER_ADDRESS_KEY) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to load saved address: {}", e);
                None
            }
        };

        Self {
            board: Board::new(),
            phase: RunPhase::Idle,
            armed: None,
            address: saved.clone().unwrap_or_default(),
            saved_address: saved,
            link,
            store,
        }
    }

    /// True while a run is active; every mutating intent is ignored
    pub fn locked(&self) -> bool {
        self.phase != RunPhase::Idle
    }

    /// Current run phase
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Category currently armed for placement
    pub fn armed(&self) -> Option<Category> {
        self.armed
    }

    /// The board
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Quota headroom left for a category
    pub fn remaining(&self, category: Category) -> usize {
        self.board.remaining(category)
    }

    /// Arm a category for placement; never mutates the board
    pub fn arm(&mut self, category: Category) {
        if self.locked() {
            return;
        }
        self.armed = Some(category);
    }

    /// Tap a cell: toggle the armed category off it, or assign it.
    ///
    /// Ignored while locked or while no category is armed. An accepted
    /// change is announced to the board server.
    pub fn tap_cell(&mut self, cell: CellId) {
        if self.locked() {
            return;
        }
        let Some(category) = self.armed else {
            return;
        };

        if let Some(change) = self.board.toggle_or_assign(cell, category) {
            self.link.send(&change.to_command());
        }
    }

    /// Clear the whole board and announce the reset
    pub fn reset_board(&mut self) {
        if self.locked() {
            return;
        }
        self.board.reset_all();
        self.link.send(&Command::Reset);
    }

    /// The primary action button.
    ///
    /// Idle: commit the current layout and start a run, locking the
    /// controls. Running: raise the retry confirmation prompt. While the
    /// prompt is already showing, pressing again changes nothing.
    pub fn press_primary(&mut self) {
        match self.phase {
            RunPhase::Idle => {
                let snapshot = self.board.assignments().clone();
                self.link.send(&Command::Start { squares: snapshot });
                self.phase = RunPhase::Running;
                tracing::info!("Run started with {} occupied cells", self.board.len());
            }
            RunPhase::Running => {
                self.phase = RunPhase::RetryPending;
            }
            RunPhase::RetryPending => {}
        }
    }

    /// True when the retry confirmation prompt should be showing
    pub fn retry_prompt(&self) -> bool {
        self.phase == RunPhase::RetryPending
    }

    /// Answer the retry confirmation.
    ///
    /// Yes tells the server to run again, unlocks the controls, and keeps
    /// the board as committed: the layout is presumed still valid for the
    /// retried run. No dismisses the prompt only; the run stays locked.
    /// Ignored unless the prompt is showing.
    pub fn confirm_retry(&mut self, retry: bool) {
        if self.phase != RunPhase::RetryPending {
            return;
        }
        if retry {
            self.link.send(&Command::Retry);
            self.phase = RunPhase::Idle;
            tracing::info!("Retry confirmed, controls unlocked");
        } else {
            self.phase = RunPhase::Running;
        }
    }

    /// Current address draft (the edit field)
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Last successfully saved address
    pub fn saved_address(&self) -> Option<&str> {
        self.saved_address.as_deref()
    }

    /// Update the address draft
    pub fn edit_address(&mut self, address: &str) {
        if self.locked() {
            return;
        }
        self.address = address.to_string();
    }

    /// Persist the address draft.
    ///
    /// The saved value only advances when the store accepts the write; a
    /// store failure is logged and the previous saved value stands.
    pub fn save_address(&mut self) {
        if self.locked() {
            return;
        }
        match self.store.set(SERVER_ADDRESS_KEY, &self.address) {
            Ok(()) => {
                self.saved_address = Some(self.address.clone());
                tracing::info!("Saved address: {}", self.address);
            }
            Err(e) => {
                tracing::warn!("Failed to persist address: {}", e);
            }
        }
    }

    /// Open the link to the draft address, falling back to the saved one
    /// when the draft is empty
    pub fn connect(&mut self) {
        if self.locked() {
            return;
        }
        let target = if self.address.is_empty() {
            self.saved_address.clone().unwrap_or_default()
        } else {
            self.address.clone()
        };
        self.link.configure(&target);
        self.link.connect();
    }

    /// Current link status
    pub fn link_status(&self) -> LinkStatus {
        self.link.status()
    }

    /// Close the link and detach its event delivery
    pub fn shutdown(&self) {
        self.link.teardown();
    }
}
