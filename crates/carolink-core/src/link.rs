//! Link seam between the session controller and the connection manager

use carolink_protocol::Command;

use crate::types::LinkStatus;

/// Abstraction over the connection to the board server.
///
/// Implementations own the [`LinkStatus`]; callers only read it. Sends
/// are best-effort and at-most-once: a message submitted while the link
/// is not open is dropped, never buffered or retried.
pub trait Link {
    /// Store the target address for the next connect. Any string,
    /// including empty, is accepted without side effects.
    fn configure(&self, address: &str);

    /// Current link status
    fn status(&self) -> LinkStatus;

    /// Submit a message for delivery; dropped unless the link is open
    fn send(&self, command: &Command);

    /// Open a fresh link to the configured address, discarding any
    /// previous one first. No-op when already connected.
    fn connect(&self);

    /// Detach event delivery and close any open link
    fn teardown(&self);
}
