//! Channel-backed [`Outbox`] for the server's event loop.
//!
//! Each connected socket has a writer task draining an unbounded channel.
//! The event loop only pushes into those channels, so a slow peer can never
//! stall routing for everyone else.

use std::collections::HashMap;

use hubforge_transport::{Outbox, SocketId, TransportError};
use tokio::sync::mpsc::UnboundedSender;

/// Maps sockets to their writer channels.
#[derive(Debug, Default)]
pub struct ChannelOutbox {
    writers: HashMap<SocketId, UnboundedSender<String>>,
}

impl ChannelOutbox {
    /// An outbox with no sockets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a socket's writer channel.
    pub fn register(&mut self, socket: SocketId, writer: UnboundedSender<String>) {
        self.writers.insert(socket, writer);
    }

    /// Drops a socket's writer channel, which ends its writer task.
    pub fn unregister(&mut self, socket: SocketId) -> bool {
        self.writers.remove(&socket).is_some()
    }

    /// Number of registered sockets.
    pub fn len(&self) -> usize {
        self.writers.len()
    }

    /// `true` when no socket is registered.
    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }
}

impl Outbox for ChannelOutbox {
    fn send_to_one(&mut self, socket: SocketId, text: &str) -> Result<(), TransportError> {
        let writer = self
            .writers
            .get(&socket)
            .ok_or(TransportError::UnknownSocket(socket))?;
        writer
            .send(text.to_owned())
            .map_err(|_| TransportError::ConnectionClosed(socket.to_string()))
    }
}
