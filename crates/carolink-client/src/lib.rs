//! carolink-client: board link management and the operator console
//!
//! Home of the connection manager that owns the WebSocket link to the
//! board server, and of the `carolink` console binary that drives the
//! session controller from operator input.

pub mod link;

pub use link::{LinkEvent, LinkHandle, LinkManager, Transport, TransportError, WsTransport};
