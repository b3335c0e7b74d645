//! Duplex text-message transport to the board server
//!
//! A transport opens one link at a time; the returned handle carries an
//! outbound frame sender and an inbound event receiver. The open
//! handshake completing is itself the "opened" signal, so [`LinkEvent`]
//! only covers what a live link can deliver afterwards.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Transport-level failure while opening a link
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to open the link
    #[error("Connect failed: {0}")]
    Connect(String),
}

/// Events a live link delivers
#[derive(Debug, Clone)]
pub enum LinkEvent {
    /// Text frame from the peer
    Message(String),
    /// Transport-level failure; the link is dead
    Error(String),
    /// Peer or transport closed the link
    Closed,
}

/// Handle to one open link.
///
/// Dropping the outbound sender closes the link; dropping the event
/// receiver detaches inbound delivery.
pub struct LinkHandle {
    /// Outbound text frames
    pub outbound: mpsc::UnboundedSender<String>,
    /// Inbound events
    pub events: mpsc::UnboundedReceiver<LinkEvent>,
}

/// Opens duplex text-message links
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a link to `address`, completing the handshake
    async fn open(&self, address: &str) -> Result<LinkHandle, TransportError>;
}

/// WebSocket transport
pub struct WsTransport;

/// Prefix the WebSocket scheme when the address carries none
fn ws_url(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("ws://{address}")
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn open(&self, address: &str) -> Result<LinkHandle, TransportError> {
        let url = ws_url(address);
        tracing::debug!("Opening {}", url);

        let (stream, _) = connect_async(&url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        let (mut sink, mut source) = stream.split();

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        // Drive both directions until either side lets go
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = outbound_rx.recv() => match frame {
                        Some(text) => {
                            if let Err(e) = sink.send(Message::Text(text)).await {
                                let _ = event_tx.send(LinkEvent::Error(e.to_string()));
                                break;
                            }
                        }
                        // Sender dropped: the owner tore the link down
                        None => {
                            let _ = sink.close().await;
                            break;
                        }
                    },
                    frame = source.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            if event_tx.send(LinkEvent::Message(text)).is_err() {
                                // Receiver dropped: delivery is detached
                                let _ = sink.close().await;
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            let _ = event_tx.send(LinkEvent::Closed);
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            let _ = event_tx.send(LinkEvent::Error(e.to_string()));
                            break;
                        }
                    },
                }
            }
        });

        Ok(LinkHandle {
            outbound: outbound_tx,
            events: event_rx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url_prefixes_bare_address() {
        assert_eq!(ws_url("192.168.1.20:8765"), "ws://192.168.1.20:8765");
        assert_eq!(ws_url("board.local:8765"), "ws://board.local:8765");
    }

    #[test]
    fn test_ws_url_keeps_explicit_scheme() {
        assert_eq!(ws_url("ws://host:8765"), "ws://host:8765");
        assert_eq!(ws_url("wss://host:8765"), "wss://host:8765");
    }
}
