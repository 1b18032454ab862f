//! Wire protocol for Hubforge.
//!
//! This crate defines the language clients and servers speak:
//!
//! - **Types** ([`GameId`], [`PlayerId`], [`Direction`]) — identities that
//!   travel inside messages.
//! - **Envelope** ([`WireEnvelope`], [`Payload`]) — the
//!   `["req"|"rsp", name, {..}]` frame and its key/value body.
//! - **Codec** ([`WireMessage`], [`MessageTable`], [`MessageCodec`]) — how an
//!   application's message enums map onto envelopes, including the
//!   round-trip check.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about sockets or games. It only turns
//! text into messages and back.
//!
//! ```text
//! Transport (text) → Protocol (WireEnvelope → message) → Router
//! ```

mod codec;
mod envelope;
mod error;
mod types;

pub use codec::{MessageCodec, MessageTable, Parser, WireMessage};
pub use envelope::{Fields, Payload, WireEnvelope};
pub use error::ProtocolError;
pub use types::{Direction, GameId, PlayerId};

/// Re-exported so applications can build payload values without a direct
/// `serde_json` dependency.
pub use serde_json::Value;
