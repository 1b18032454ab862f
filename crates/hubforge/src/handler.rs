//! Per-connection tasks.
//!
//! Each accepted connection gets two Tokio tasks:
//!
//!   1. a reader that forwards text frames to the event loop and reports the
//!      disconnect when the socket closes;
//!   2. a writer that drains the socket's outbound channel.
//!
//! Neither task touches the registry. All state changes happen on the event
//! loop, one event at a time.

use std::sync::Arc;

use hubforge_transport::{Connection, SocketId, TransportEvent, WebSocketConnection};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// What connection tasks tell the event loop.
#[derive(Debug)]
pub(crate) enum LoopEvent {
    /// A socket opened; here is where to write to it.
    Opened(SocketId, UnboundedSender<String>),
    /// Anything else the router needs to see.
    Transport(TransportEvent),
}

/// Starts the reader and writer tasks for `conn`.
pub(crate) fn spawn_connection(conn: WebSocketConnection, events: UnboundedSender<LoopEvent>) {
    let conn = Arc::new(conn);
    let socket = conn.id();
    let (writer_tx, writer_rx) = mpsc::unbounded_channel();

    // Registered before the reader starts, so the loop sees Connected
    // before any message from this socket.
    if events.send(LoopEvent::Opened(socket, writer_tx)).is_err() {
        tracing::debug!(%socket, "event loop gone, dropping connection");
        return;
    }

    tokio::spawn(write_loop(Arc::clone(&conn), writer_rx));
    tokio::spawn(read_loop(conn, events));
}

async fn read_loop(conn: Arc<WebSocketConnection>, events: UnboundedSender<LoopEvent>) {
    let socket = conn.id();
    loop {
        match conn.recv().await {
            Ok(Some(text)) => {
                let event = LoopEvent::Transport(TransportEvent::MessageReceived(socket, text));
                if events.send(event).is_err() {
                    break;
                }
            }
            Ok(None) => {
                tracing::debug!(%socket, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%socket, error = %e, "recv error");
                break;
            }
        }
    }
    let _ = events.send(LoopEvent::Transport(TransportEvent::Disconnected(socket)));
}

async fn write_loop(conn: Arc<WebSocketConnection>, mut outbound: UnboundedReceiver<String>) {
    let socket = conn.id();
    while let Some(text) = outbound.recv().await {
        if let Err(e) = conn.send(&text).await {
            tracing::debug!(%socket, error = %e, "send failed, stopping writer");
            return;
        }
    }
    // Channel closed: the loop has forgotten this socket.
    if let Err(e) = conn.close().await {
        tracing::trace!(%socket, error = %e, "close after disconnect");
    }
}
