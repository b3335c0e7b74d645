//! Outbound messages to the board server
//!
//! The console is the only side that speaks: every accepted board mutation
//! and every lifecycle transition produces exactly one message. The server
//! answers with free-form progress frames that the console logs but never
//! parses.
//!
//! Messages are JSON text frames tagged by `action`:
//!
//! ```json
//! {"action":"set","num":5,"value":"Fake"}
//! {"action":"remove","num":5}
//! {"action":"reset"}
//! {"action":"start","squares":{"1":"Real","5":"Fake"}}
//! {"action":"retry"}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::Category;
use crate::cell::CellId;
use crate::error::ProtocolError;

/// Messages the console sends to the board server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Command {
    /// Place a marker on a cell
    Set { num: CellId, value: Category },

    /// Clear a single cell
    Remove { num: CellId },

    /// Clear the whole board
    Reset,

    /// Commit the current layout and begin a run
    Start { squares: BTreeMap<CellId, Category> },

    /// Ask the server to run the committed layout again
    Retry,
}

impl Command {
    /// Encode to the JSON text frame sent on the wire
    pub fn to_wire(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
