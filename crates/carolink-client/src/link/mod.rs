//! Connection manager for the board link
//!
//! Owns at most one link to the board server at a time. Each connect
//! starts a new link generation; events tagged with a superseded
//! generation are discarded before they can touch status, so a stale
//! link can never leak state into the current one. Messages are
//! best-effort: anything submitted while the link is not open is
//! dropped, never buffered.

mod transport;

pub use transport::{LinkEvent, LinkHandle, Transport, TransportError, WsTransport};

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use carolink_core::{Link, LinkStatus};
use carolink_protocol::Command;

/// Manages the lifetime of the outbound link to the board server
pub struct LinkManager {
    transport: Arc<dyn Transport>,
    inner: Arc<Mutex<Shared>>,
}

/// State shared with the event pump task
struct Shared {
    address: String,
    status: LinkStatus,
    generation: u64,
    outbound: Option<mpsc::UnboundedSender<String>>,
    pump: Option<JoinHandle<()>>,
}

impl LinkManager {
    /// Manager speaking WebSocket
    pub fn new() -> Self {
        Self::with_transport(Arc::new(WsTransport))
    }

    /// Manager over a specific transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            inner: Arc::new(Mutex::new(Shared {
                address: String::new(),
                status: LinkStatus::Disconnected,
                generation: 0,
                outbound: None,
                pump: None,
            })),
        }
    }

    /// Detach the current link: invalidate its generation so in-flight
    /// events land nowhere, stop the pump, and drop the sender (which
    /// closes the socket). Runs before a new generation starts and on
    /// teardown.
    fn detach_current(shared: &mut Shared) {
        shared.generation += 1;
        if let Some(pump) = shared.pump.take() {
            pump.abort();
        }
        shared.outbound = None;
        shared.status = LinkStatus::Disconnected;
    }

    /// Apply one link event, unless its generation was superseded
    fn apply(inner: &Mutex<Shared>, generation: u64, event: LinkEvent) {
        let mut shared = inner.lock().expect("link state poisoned");
        if shared.generation != generation {
            tracing::debug!("Dropping event from superseded link");
            return;
        }
        match event {
            LinkEvent::Message(text) => {
                tracing::info!("Received from server: {}", text);
            }
            LinkEvent::Error(reason) => {
                tracing::warn!("Link error: {}", reason);
                shared.status = LinkStatus::Errored;
            }
            LinkEvent::Closed => {
                tracing::info!("Link closed");
                shared.status = LinkStatus::Disconnected;
                shared.outbound = None;
            }
        }
    }
}

impl Default for LinkManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Link for LinkManager {
    fn configure(&self, address: &str) {
        let mut shared = self.inner.lock().expect("link state poisoned");
        shared.address = address.to_string();
    }

    fn status(&self) -> LinkStatus {
        self.inner.lock().expect("link state poisoned").status
    }

    fn send(&self, command: &Command) {
        let shared = self.inner.lock().expect("link state poisoned");
        if shared.status != LinkStatus::Connected {
            tracing::debug!("Dropping message, link not open");
            return;
        }
        let Some(outbound) = &shared.outbound else {
            return;
        };
        match command.to_wire() {
            Ok(frame) => {
                if outbound.send(frame).is_err() {
                    tracing::debug!("Dropping message, link going down");
                }
            }
            Err(e) => tracing::error!("Failed to encode message: {}", e),
        }
    }

    fn connect(&self) {
        let (generation, address) = {
            let mut shared = self.inner.lock().expect("link state poisoned");
            if shared.status == LinkStatus::Connected {
                tracing::debug!("Already connected");
                return;
            }
            Self::detach_current(&mut shared);
            (shared.generation, shared.address.clone())
        };

        tracing::info!("Connecting to {}", address);

        let transport = Arc::clone(&self.transport);
        let inner = Arc::clone(&self.inner);
        let pump = tokio::spawn(async move {
            let mut handle = match transport.open(&address).await {
                Ok(handle) => handle,
                Err(e) => {
                    Self::apply(&inner, generation, LinkEvent::Error(e.to_string()));
                    return;
                }
            };

            // The handshake completing is the opened event
            {
                let mut shared = inner.lock().expect("link state poisoned");
                if shared.generation != generation {
                    return;
                }
                shared.status = LinkStatus::Connected;
                shared.outbound = Some(handle.outbound.clone());
                tracing::info!("Connected to server");
            }

            while let Some(event) = handle.events.recv().await {
                Self::apply(&inner, generation, event);
            }
        });

        let mut shared = self.inner.lock().expect("link state poisoned");
        if shared.generation == generation {
            shared.pump = Some(pump);
        } else {
            // A newer connect or teardown won the race
            pump.abort();
        }
    }

    fn teardown(&self) {
        let mut shared = self.inner.lock().expect("link state poisoned");
        Self::detach_current(&mut shared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use carolink_protocol::{Category, CellId};
    use std::sync::Mutex as StdMutex;

    /// Hands out channel-backed links and keeps the test-side ends
    struct FakeTransport {
        ends: StdMutex<Vec<FakeEnd>>,
        fail: bool,
    }

    struct FakeEnd {
        address: String,
        events: mpsc::UnboundedSender<LinkEvent>,
        outbound: mpsc::UnboundedReceiver<String>,
    }

    impl FakeTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                ends: StdMutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                ends: StdMutex::new(Vec::new()),
                fail: true,
            })
        }

        fn opened(&self) -> usize {
            self.ends.lock().unwrap().len()
        }

        fn end(&self, index: usize) -> (String, mpsc::UnboundedSender<LinkEvent>) {
            let ends = self.ends.lock().unwrap();
            (ends[index].address.clone(), ends[index].events.clone())
        }

        fn take_frame(&self, index: usize) -> Option<String> {
            self.ends.lock().unwrap()[index].outbound.try_recv().ok()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn open(&self, address: &str) -> Result<LinkHandle, TransportError> {
            if self.fail {
                return Err(TransportError::Connect("refused".to_string()));
            }
            let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
            let (event_tx, event_rx) = mpsc::unbounded_channel();
            self.ends.lock().unwrap().push(FakeEnd {
                address: address.to_string(),
                events: event_tx,
                outbound: outbound_rx,
            });
            Ok(LinkHandle {
                outbound: outbound_tx,
                events: event_rx,
            })
        }
    }

    /// Let spawned tasks run on the current-thread test runtime
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn set_command() -> Command {
        Command::Set {
            num: CellId::new(5).unwrap(),
            value: Category::Fake,
        }
    }

    #[tokio::test]
    async fn test_connect_reaches_connected() {
        let transport = FakeTransport::new();
        let manager = LinkManager::with_transport(transport.clone());

        manager.configure("board:8765");
        manager.connect();
        settle().await;

        assert_eq!(manager.status(), LinkStatus::Connected);
        assert_eq!(transport.end(0).0, "board:8765");
    }

    #[tokio::test]
    async fn test_connect_failure_sets_errored() {
        let manager = LinkManager::with_transport(FakeTransport::failing());
        manager.configure("board:8765");
        manager.connect();
        settle().await;

        assert_eq!(manager.status(), LinkStatus::Errored);
    }

    #[tokio::test]
    async fn test_connect_when_connected_is_noop() {
        let transport = FakeTransport::new();
        let manager = LinkManager::with_transport(transport.clone());

        manager.configure("board:8765");
        manager.connect();
        settle().await;
        manager.connect();
        settle().await;

        assert_eq!(transport.opened(), 1);
    }

    #[tokio::test]
    async fn test_send_delivers_when_connected() {
        let transport = FakeTransport::new();
        let manager = LinkManager::with_transport(transport.clone());

        manager.configure("board:8765");
        manager.connect();
        settle().await;

        manager.send(&set_command());
        assert_eq!(
            transport.take_frame(0).as_deref(),
            Some(r#"{"action":"set","num":5,"value":"Fake"}"#)
        );
    }

    #[tokio::test]
    async fn test_send_dropped_when_disconnected() {
        let transport = FakeTransport::new();
        let manager = LinkManager::with_transport(transport.clone());

        manager.send(&set_command());
        assert_eq!(transport.opened(), 0);
        assert_eq!(manager.status(), LinkStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_send_dropped_after_close() {
        let transport = FakeTransport::new();
        let manager = LinkManager::with_transport(transport.clone());

        manager.configure("board:8765");
        manager.connect();
        settle().await;

        let (_, events) = transport.end(0);
        events.send(LinkEvent::Closed).unwrap();
        settle().await;

        assert_eq!(manager.status(), LinkStatus::Disconnected);
        manager.send(&set_command());
        assert!(transport.take_frame(0).is_none());
    }

    #[tokio::test]
    async fn test_error_event_sets_errored() {
        let transport = FakeTransport::new();
        let manager = LinkManager::with_transport(transport.clone());

        manager.configure("board:8765");
        manager.connect();
        settle().await;

        let (_, events) = transport.end(0);
        events.send(LinkEvent::Error("broken pipe".to_string())).unwrap();
        settle().await;

        assert_eq!(manager.status(), LinkStatus::Errored);
    }

    #[tokio::test]
    async fn test_stale_link_events_are_isolated() {
        let transport = FakeTransport::new();
        let manager = LinkManager::with_transport(transport.clone());

        manager.configure("board:8765");
        manager.connect();
        settle().await;

        // First link dies; operator reconnects
        let (_, old_events) = transport.end(0);
        old_events.send(LinkEvent::Error("broken pipe".to_string())).unwrap();
        settle().await;
        assert_eq!(manager.status(), LinkStatus::Errored);

        manager.connect();
        settle().await;
        assert_eq!(manager.status(), LinkStatus::Connected);
        assert_eq!(transport.opened(), 2);

        // A late event from the discarded link changes nothing
        let _ = old_events.send(LinkEvent::Closed);
        settle().await;
        assert_eq!(manager.status(), LinkStatus::Connected);
    }

    #[tokio::test]
    async fn test_teardown_disconnects_and_blocks_late_events() {
        let transport = FakeTransport::new();
        let manager = LinkManager::with_transport(transport.clone());

        manager.configure("board:8765");
        manager.connect();
        settle().await;

        let (_, events) = transport.end(0);
        manager.teardown();
        assert_eq!(manager.status(), LinkStatus::Disconnected);

        let _ = events.send(LinkEvent::Error("late".to_string()));
        settle().await;
        assert_eq!(manager.status(), LinkStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_reconnect_after_error_uses_new_address() {
        let transport = FakeTransport::new();
        let manager = LinkManager::with_transport(transport.clone());

        manager.configure("first:8765");
        manager.connect();
        settle().await;

        let (_, events) = transport.end(0);
        events.send(LinkEvent::Closed).unwrap();
        settle().await;

        manager.configure("second:8765");
        manager.connect();
        settle().await;

        assert_eq!(manager.status(), LinkStatus::Connected);
        assert_eq!(transport.end(1).0, "second:8765");
    }
}
