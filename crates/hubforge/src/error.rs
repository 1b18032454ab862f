//! Unified error type for Hubforge.

use hubforge_protocol::ProtocolError;
use hubforge_router::LinkError;
use hubforge_session::SessionError;
use hubforge_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `hubforge` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum HubforgeError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (malformed envelope, unknown message, round trip).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (unknown game or player, id exhaustion).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A client link error.
    #[error(transparent)]
    Link(#[from] LinkError),
}
