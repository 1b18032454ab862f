//! Transport layer for Hubforge.
//!
//! The router never touches sockets directly. It sees the transport as a
//! collaborator with two faces:
//!
//! - **Inbound**: a stream of [`TransportEvent`]s (connected, disconnected,
//!   message received, periodic tick).
//! - **Outbound**: an [`Outbox`] that writes text to one or many sockets.
//!
//! The [`Transport`] and [`Connection`] traits abstract over the physical
//! protocol that produces those events.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;

/// Opaque identifier for a connected socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SocketId(u64);

impl SocketId {
    /// Creates a new `SocketId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sock-{}", self.0)
    }
}

/// Something the transport tells the router about.
///
/// Events are handled strictly one at a time, in the order the transport
/// delivers them, interleaved with a synthetic [`Tick`](Self::Tick).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A new socket is open. It is not bound to any game yet.
    Connected(SocketId),
    /// The socket closed (cleanly or not).
    Disconnected(SocketId),
    /// A text frame arrived on the socket.
    MessageReceived(SocketId, String),
    /// Periodic clock pulse that drives the death watch.
    Tick(Instant),
}

/// The outbound half of the transport collaborator.
///
/// The router calls these after it has decided who gets a response.
/// Implementations must not block: a slow or dead socket should fail fast
/// (or queue) rather than stall the event loop.
pub trait Outbox {
    /// Writes `text` to a single socket.
    fn send_to_one(&mut self, socket: SocketId, text: &str) -> Result<(), TransportError>;

    /// Writes `text` to every socket in `sockets`.
    ///
    /// The default calls [`send_to_one`](Self::send_to_one) per socket and
    /// reports the first failure after attempting all of them.
    fn send_to_many(&mut self, sockets: &[SocketId], text: &str) -> Result<(), TransportError> {
        let mut first_err = None;
        for socket in sockets {
            if let Err(e) = self.send_to_one(*socket, text) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// The address the transport is listening on.
    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;

    /// Gracefully shuts down the transport, stopping new connections.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// A single connection that exchanges text frames.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends a text frame to the remote peer.
    async fn send(&self, text: &str) -> Result<(), Self::Error>;

    /// Receives the next text frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<String>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> SocketId;
}
