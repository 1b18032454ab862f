//! Round-trip validation around [`GameApp::process`].
//!
//! Before the application sees a request, the request is serialized and
//! parsed back; after it answers, the response gets the same treatment. A
//! codec that cannot reproduce its own output is caught at the first message
//! that exercises it, not at the client.
//!
//! If the response fails, the registry is put back exactly as it was before
//! the request, so a broken response never leaves half-applied state behind.

use hubforge_protocol::{MessageCodec, ProtocolError};

use crate::{AppRegistry, GameApp};

/// Request and response codecs for one application.
pub struct AppCodecs<A: GameApp> {
    /// Decodes inbound requests.
    pub requests: MessageCodec<A::Request>,
    /// Encodes outbound responses.
    pub responses: MessageCodec<A::Response>,
}

impl<A: GameApp> AppCodecs<A> {
    /// Builds both tables.
    pub fn new() -> Self {
        Self {
            requests: MessageCodec::new(),
            responses: MessageCodec::new(),
        }
    }
}

impl<A: GameApp> Default for AppCodecs<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: GameApp> std::fmt::Debug for AppCodecs<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCodecs")
            .field("requests", &self.requests)
            .field("responses", &self.responses)
            .finish()
    }
}

/// Runs `A::process` with both directions round-tripped.
///
/// # Errors
/// Any [`ProtocolError`] from the request or response round trip. On a
/// response failure the registry is restored to its state before the call.
pub fn process_validated<A: GameApp>(
    registry: &mut AppRegistry<A>,
    codecs: &AppCodecs<A>,
    request: A::Request,
) -> Result<Option<A::Response>, ProtocolError> {
    let request = codecs.requests.round_trip(&request)?;

    let snapshot = registry.clone();
    let Some(response) = A::process(registry, request) else {
        return Ok(None);
    };

    match codecs.responses.round_trip(&response) {
        Ok(response) => Ok(Some(response)),
        Err(e) => {
            tracing::warn!(error = %e, "response failed round trip, restoring registry");
            *registry = snapshot;
            Err(e)
        }
    }
}
