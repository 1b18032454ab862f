//! Error types for the router layer.

use hubforge_protocol::ProtocolError;
use hubforge_transport::TransportError;

/// Errors from a [`ServerLink`](crate::ServerLink).
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// A message could not be encoded, decoded, or validated.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The underlying connection failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server side is gone.
    #[error("link closed")]
    Closed,
}
