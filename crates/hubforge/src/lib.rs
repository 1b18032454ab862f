//! # Hubforge
//!
//! Framework for servers where many real-time clients share games.
//!
//! An application implements [`GameApp`](router::GameApp) (its message
//! vocabulary plus one processing function over the
//! [`SessionRegistry`](session::SessionRegistry)); Hubforge handles the
//! WebSocket transport, wire-format validation, binding sockets to games,
//! and reaping games that every client has abandoned.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hubforge::prelude::*;
//!
//! // Implement GameApp for your app, then:
//! // let server = HubServerBuilder::new()
//! //     .bind("0.0.0.0:8080")
//! //     .build::<MyApp>()
//! //     .await?;
//! // server.run().await
//! ```

mod client;
mod error;
mod handler;
mod outbox;
mod server;
mod telemetry;

pub use client::WebSocketLink;
pub use error::HubforgeError;
pub use outbox::ChannelOutbox;
pub use server::{HubServer, HubServerBuilder};
pub use telemetry::init_tracing;

pub use hubforge_protocol as protocol;
pub use hubforge_reaper as reaper;
pub use hubforge_router as router;
pub use hubforge_session as session;
pub use hubforge_transport as transport;

/// Everything an application usually needs.
pub mod prelude {
    pub use hubforge_protocol::{
        Direction, Fields, GameId, MessageCodec, MessageTable, Payload, PlayerId, ProtocolError,
        WireEnvelope, WireMessage,
    };
    pub use hubforge_reaper::{TickConfig, TickPolicy};
    pub use hubforge_router::{
        AppRegistry, GameApp, LinkError, ProxyServer, Recipient, RouterConfig, ServerLink,
    };
    pub use hubforge_session::{
        IdConfig, PlayerInfo, PublicGame, RegistryConfig, SessionError, SessionRegistry,
        Statistics, ValidationError,
    };

    pub use crate::{HubServer, HubServerBuilder, HubforgeError, WebSocketLink, init_tracing};
}
