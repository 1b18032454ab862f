//! `HubServer` builder and server loop.
//!
//! This is the entry point for running a Hubforge game server. It ties the
//! layers together: transport → router (→ protocol, session) → reaper.
//!
//! ```text
//!  accept loop ──spawn──► reader task ─┐
//!                         writer task ◄┼─ ChannelOutbox ◄─┐
//!                                      ▼                  │
//!                              event loop task: Router::handle
//!                                      ▲
//!                               Ticker (TransportEvent::Tick)
//! ```
//!
//! The router lives in exactly one task, so it needs no locking.

use std::future::Future;
use std::net::SocketAddr;

use hubforge_reaper::{TickConfig, Ticker};
use hubforge_router::{GameApp, Router, RouterConfig};
use hubforge_transport::{Transport, TransportEvent, WebSocketTransport};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time;

use crate::HubforgeError;
use crate::handler::{LoopEvent, spawn_connection};
use crate::outbox::ChannelOutbox;

/// Builder for configuring and starting a Hubforge server.
///
/// # Example
///
/// ```rust,ignore
/// use hubforge::prelude::*;
///
/// let server = HubServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build::<MyApp>()
///     .await?;
/// server.run().await
/// ```
pub struct HubServerBuilder {
    bind_addr: String,
    router_config: RouterConfig,
    tick_config: TickConfig,
}

impl HubServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            router_config: RouterConfig::default(),
            tick_config: TickConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the router configuration (grace period, registry, validation).
    pub fn router_config(mut self, config: RouterConfig) -> Self {
        self.router_config = config;
        self
    }

    /// Sets the housekeeping tick configuration.
    pub fn tick_config(mut self, config: TickConfig) -> Self {
        self.tick_config = config;
        self
    }

    /// Binds the listener and builds the router for `A`.
    pub async fn build<A: GameApp>(self) -> Result<HubServer<A>, HubforgeError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        Ok(HubServer {
            transport,
            router: Router::new(self.router_config),
            tick_config: self.tick_config,
        })
    }
}

impl Default for HubServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Hubforge server, ready to run.
pub struct HubServer<A: GameApp> {
    transport: WebSocketTransport,
    router: Router<A>,
    tick_config: TickConfig,
}

impl<A: GameApp> HubServer<A> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, HubforgeError> {
        Ok(self.transport.local_addr()?)
    }

    /// The router, for seeding the registry before the server starts.
    pub fn router_mut(&mut self) -> &mut Router<A> {
        &mut self.router
    }

    /// Runs the server until the process is terminated.
    pub async fn run(self) -> Result<(), HubforgeError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the server until `shutdown` completes.
    ///
    /// Accepts connections and spawns their tasks; the router runs in its own
    /// task. On shutdown the listener and the event loop are stopped.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), HubforgeError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Hubforge server running");

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let event_loop = tokio::spawn(event_loop(self.router, self.tick_config, events_rx));

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => spawn_connection(conn, events_tx.clone()),
                    Err(e) => tracing::error!(error = %e, "accept failed"),
                },
            }
        }

        tracing::info!("Hubforge server shutting down");
        event_loop.abort();
        self.transport.shutdown().await?;
        Ok(())
    }
}

/// The single task that owns the router.
async fn event_loop<A: GameApp>(
    mut router: Router<A>,
    tick_config: TickConfig,
    mut events: UnboundedReceiver<LoopEvent>,
) {
    let mut ticker = Ticker::new(tick_config);
    let mut outbox = ChannelOutbox::new();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    router.advance(time::Instant::now().into_std());
                    apply(&mut router, &mut outbox, event);
                }
                None => break,
            },
            now = ticker.tick() => router.handle(TransportEvent::Tick(now), &mut outbox),
        }
    }
    tracing::debug!("event loop stopped");
}

/// Feeds one connection event to the router, keeping the outbox in step.
fn apply<A: GameApp>(router: &mut Router<A>, outbox: &mut ChannelOutbox, event: LoopEvent) {
    match event {
        LoopEvent::Opened(socket, writer) => {
            outbox.register(socket, writer);
            router.handle(TransportEvent::Connected(socket), outbox);
        }
        LoopEvent::Transport(event) => {
            let closed = match &event {
                TransportEvent::Disconnected(socket) => Some(*socket),
                _ => None,
            };
            router.handle(event, outbox);
            if let Some(socket) = closed {
                outbox.unregister(socket);
            }
        }
    }
}
