//! Byte-frame transport for the bingo server.
//!
//! The gateway speaks to clients through [`Connection`] and never sees a
//! socket type. A connection carries whole frames: one client command in,
//! one server event out. Framing, text vs binary, and close handshakes
//! are the transport's business.
//!
//! # Feature Flags
//!
//! - `websocket` (default): [`WebSocketTransport`] via `tokio-tungstenite`

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{PendingWebSocket, WebSocketConnection, WebSocketTransport};

/// Process-unique connection number, used in logs and as the room
/// subscriber id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A listener handing out client connections.
///
/// Accepting is split in two. [`accept`](Self::accept) only takes the
/// socket off the listener and returns at once; the protocol handshake
/// happens in [`Pending::upgrade`], which the caller runs on its own
/// task. A peer that connects and then says nothing never holds up the
/// next accept.
pub trait Transport: Send + 'static {
    type Pending: Pending;

    /// Address the listener is bound to. Useful after binding port 0.
    fn local_addr(&self) -> Result<SocketAddr, TransportError>;

    /// Waits for the next peer to connect.
    fn accept(&mut self) -> impl Future<Output = Result<Self::Pending, TransportError>> + Send;
}

/// A peer that has connected but not yet completed the handshake.
pub trait Pending: Send + 'static {
    type Connection: Connection;

    fn peer_addr(&self) -> SocketAddr;

    /// Completes the handshake, giving up after `timeout`.
    ///
    /// Any failure, including the timeout, is a
    /// [`TransportError::Handshake`] and concerns this peer only.
    fn upgrade(
        self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;
}

/// One client connection.
///
/// `send` and `recv` may run at the same time: a room broadcast can go
/// out while the gateway is parked waiting for the client's next command.
pub trait Connection: Send + Sync + 'static {
    fn id(&self) -> ConnectionId;

    fn peer_addr(&self) -> SocketAddr;

    /// Sends one frame.
    fn send(&self, frame: &[u8]) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next frame. `Ok(None)` means the client closed.
    fn recv(&self) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
    }

    #[test]
    fn test_handshake_error_names_peer() {
        let err = TransportError::Handshake("127.0.0.1:9: timed out".into());
        assert_eq!(err.to_string(), "handshake failed: 127.0.0.1:9: timed out");
    }
}
