//! In-process server access.
//!
//! [`ProxyServer`] runs the same validated processing path as the networked
//! router, but without sockets: a request goes straight into the registry
//! and any response is queued on a channel. Client code written against
//! [`ServerLink`] works unchanged over either.

use hubforge_session::RegistryConfig;
use tokio::sync::mpsc;

use crate::validated::{AppCodecs, process_validated};
use crate::{AppRegistry, GameApp, LinkError};

/// A request/response connection to a game server.
///
/// Implemented by [`ProxyServer`] for in-process use and by the networked
/// client in the `hubforge` crate.
pub trait ServerLink {
    /// Messages sent to the server.
    type Request;
    /// Messages received from the server.
    type Response;

    /// Sends one request.
    async fn send(&mut self, request: Self::Request) -> Result<(), LinkError>;

    /// Waits for the next response. `None` once the server side is gone.
    ///
    /// A request answered silently queues nothing, so a `recv` after it
    /// waits for a later response. An in-process server never goes away,
    /// so on [`ProxyServer`] this pends until something is queued.
    async fn recv(&mut self) -> Option<Self::Response>;
}

/// A server that lives in the caller's process.
///
/// Owns its registry outright. Responses are delivered through an unbounded
/// channel, so they arrive on the receiver's next poll rather than inside
/// `send`, just as they would over a network. [`try_recv`](Self::try_recv)
/// polls without waiting.
pub struct ProxyServer<A: GameApp> {
    registry: AppRegistry<A>,
    codecs: AppCodecs<A>,
    tx: mpsc::UnboundedSender<A::Response>,
    rx: mpsc::UnboundedReceiver<A::Response>,
}

impl<A: GameApp> ProxyServer<A> {
    /// A proxy with an empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            registry: AppRegistry::<A>::new(config),
            codecs: AppCodecs::new(),
            tx,
            rx,
        }
    }

    /// Processes one request and queues its response, if any.
    ///
    /// A request or response that fails its round trip is answered the
    /// way the router answers it: with [`GameApp::error_response`], or not
    /// at all. The registry is left unchanged in that case. The change log
    /// is drained after every request.
    ///
    /// # Errors
    /// [`LinkError::Closed`] if the response queue is gone.
    pub fn submit(&mut self, request: A::Request) -> Result<(), LinkError> {
        let response = match process_validated::<A>(&mut self.registry, &self.codecs, request) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "request rejected by validation");
                A::error_response(&e)
            }
        };
        self.registry.take_changes();

        if let Some(response) = response {
            self.tx.send(response).map_err(|_| LinkError::Closed)?;
        }
        Ok(())
    }

    /// Takes a queued response without waiting.
    pub fn try_recv(&mut self) -> Option<A::Response> {
        self.rx.try_recv().ok()
    }

    /// The registry.
    pub fn registry(&self) -> &AppRegistry<A> {
        &self.registry
    }

    /// Mutable access to the registry.
    pub fn registry_mut(&mut self) -> &mut AppRegistry<A> {
        &mut self.registry
    }
}

impl<A: GameApp> Default for ProxyServer<A> {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl<A: GameApp> ServerLink for ProxyServer<A> {
    type Request = A::Request;
    type Response = A::Response;

    async fn send(&mut self, request: A::Request) -> Result<(), LinkError> {
        self.submit(request)
    }

    async fn recv(&mut self) -> Option<A::Response> {
        // Never `None`: the proxy holds its own sender.
        self.rx.recv().await
    }
}

impl<A: GameApp> std::fmt::Debug for ProxyServer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyServer")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
