//! Message codec: application enums ⇄ [`WireEnvelope`]s.
//!
//! Decoding is table-driven. Each direction has a [`MessageTable`] that maps
//! a message name to a parser function, so adding a message is one
//! `register` call and never a new branch in framework code.
//!
//! The application's request and response enums implement [`WireMessage`];
//! a [`MessageCodec`] builds the table once and reuses it for every frame.

use std::collections::HashMap;
use std::fmt;

use crate::{Direction, Fields, Payload, ProtocolError, WireEnvelope};

/// Parses a payload into one variant of `M`.
///
/// Plain function pointers keep tables `Send + Sync` and cheap to build.
/// Non-capturing closures coerce to this type.
pub type Parser<M> = fn(&Fields<'_>) -> Result<M, ProtocolError>;

// ---------------------------------------------------------------------------
// MessageTable
// ---------------------------------------------------------------------------

/// Name → parser registration table for one direction.
pub struct MessageTable<M> {
    direction: Direction,
    parsers: HashMap<&'static str, Parser<M>>,
}

impl<M> MessageTable<M> {
    /// An empty table for `direction`.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            parsers: HashMap::new(),
        }
    }

    /// Registers `parser` under `name`. A later registration with the same
    /// name replaces the earlier one.
    pub fn register(mut self, name: &'static str, parser: Parser<M>) -> Self {
        self.parsers.insert(name, parser);
        self
    }

    /// The direction this table decodes.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether a parser exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.parsers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.parsers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Looks up the parser for `env.name` and runs it.
    ///
    /// # Errors
    /// - [`ProtocolError::WrongDirection`] if the envelope's tag disagrees
    ///   with the table.
    /// - [`ProtocolError::UnknownMessage`] if nothing is registered under
    ///   the name.
    /// - Whatever the parser returns for a bad payload.
    pub fn parse(&self, env: &WireEnvelope) -> Result<M, ProtocolError> {
        if env.direction != self.direction {
            return Err(ProtocolError::WrongDirection {
                expected: self.direction,
                found: env.direction,
            });
        }
        let parser = self
            .parsers
            .get(env.name.as_str())
            .ok_or_else(|| ProtocolError::UnknownMessage {
                direction: self.direction,
                name: env.name.clone(),
            })?;
        parser(&Fields::new(&env.name, &env.payload))
    }
}

impl<M> fmt::Debug for MessageTable<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageTable")
            .field("direction", &self.direction)
            .field("names", &self.names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// WireMessage
// ---------------------------------------------------------------------------

/// An application message vocabulary for one direction.
///
/// Implement this for your request enum (with `DIRECTION = Request`) and your
/// response enum (with `DIRECTION = Response`). `name` and `payload` are the
/// encoder; `table` is the decoder. The two must agree: for every variant
/// `m`, decoding `encode(m)` must give back `m`.
/// [`MessageCodec::round_trip`] checks exactly that.
pub trait WireMessage: Clone + PartialEq + fmt::Debug + Sized + 'static {
    /// Which direction this vocabulary travels.
    const DIRECTION: Direction;

    /// The wire name of this variant.
    fn name(&self) -> &'static str;

    /// The key/value body of this variant.
    fn payload(&self) -> Result<Payload, ProtocolError>;

    /// Builds the decoder table. Called once per [`MessageCodec`].
    fn table() -> MessageTable<Self>;
}

// ---------------------------------------------------------------------------
// MessageCodec
// ---------------------------------------------------------------------------

/// Encoder/decoder for one [`WireMessage`] vocabulary.
pub struct MessageCodec<M: WireMessage> {
    table: MessageTable<M>,
}

impl<M: WireMessage> MessageCodec<M> {
    /// Builds the decoder table for `M`.
    pub fn new() -> Self {
        Self { table: M::table() }
    }

    /// The underlying registration table.
    pub fn table(&self) -> &MessageTable<M> {
        &self.table
    }

    /// Message → envelope.
    pub fn encode(&self, msg: &M) -> Result<WireEnvelope, ProtocolError> {
        Ok(WireEnvelope {
            direction: M::DIRECTION,
            name: msg.name().to_owned(),
            payload: msg.payload()?,
        })
    }

    /// Envelope → message.
    pub fn decode(&self, env: &WireEnvelope) -> Result<M, ProtocolError> {
        self.table.parse(env)
    }

    /// Message → wire text.
    pub fn encode_text(&self, msg: &M) -> Result<String, ProtocolError> {
        self.encode(msg)?.to_text()
    }

    /// Wire text → message.
    pub fn decode_text(&self, text: &str) -> Result<M, ProtocolError> {
        self.decode(&WireEnvelope::from_text(text)?)
    }

    /// Pushes `msg` through one full serialize/parse cycle.
    ///
    /// Returns the re-parsed message. Fails if any step fails, or if the
    /// re-parsed value differs from the original.
    pub fn round_trip(&self, msg: &M) -> Result<M, ProtocolError> {
        let text = self.encode_text(msg)?;
        let parsed = self.decode_text(&text)?;
        if &parsed != msg {
            return Err(ProtocolError::RoundTripMismatch {
                direction: M::DIRECTION,
                name: msg.name().to_owned(),
            });
        }
        Ok(parsed)
    }
}

impl<M: WireMessage> Default for MessageCodec<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: WireMessage> fmt::Debug for MessageCodec<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageCodec")
            .field("table", &self.table)
            .finish()
    }
}
