//! The wire envelope: `["req"|"rsp", name, {key: value, ...}]`.
//!
//! Every frame on the wire is exactly one envelope. The direction tag and the
//! message name are framework-level; the key/value payload belongs entirely
//! to the application.
//!
//! ```text
//! ["req", "join", {"gameid": "qzkxwhvnbfdlamjr", "name": "ada"}]
//!   │       │       └── payload: ordered key/value object
//!   │       └── message name: selects the parser
//!   └── direction: request or response
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Direction, ProtocolError};

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// The key/value body of an envelope.
///
/// Keys keep their insertion order (serde_json's `preserve_order`), so the
/// text an encoder produces is stable and diffable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// An empty payload (`{}` on the wire).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert for values with a direct JSON form
    /// (strings, numbers, bools, `Option`s and `Vec`s of those).
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style insert for anything `Serialize`.
    pub fn with_serialized<T: Serialize>(
        mut self,
        key: &str,
        value: &T,
    ) -> Result<Self, ProtocolError> {
        let value = serde_json::to_value(value).map_err(ProtocolError::Encode)?;
        self.0.insert(key.to_owned(), value);
        Ok(self)
    }

    /// Inserts or replaces a key.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_owned(), value.into());
    }

    /// Raw access to a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Iterates keys in wire order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` for `{}`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Fields — typed reads with message-aware errors
// ---------------------------------------------------------------------------

/// A payload being parsed as a particular message.
///
/// Parsers receive this instead of a bare [`Payload`] so that a missing or
/// mistyped key reports which message it belonged to.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    name: &'a str,
    payload: &'a Payload,
}

impl<'a> Fields<'a> {
    /// Wraps `payload` for parsing as message `name`.
    pub fn new(name: &'a str, payload: &'a Payload) -> Self {
        Self { name, payload }
    }

    /// The message name being parsed.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Reads a required key.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ProtocolError> {
        let value = self
            .payload
            .get(key)
            .ok_or_else(|| ProtocolError::MissingField {
                message: self.name.to_owned(),
                field: key.to_owned(),
            })?;
        self.convert(key, value)
    }

    /// Reads an optional key. Absent and `null` both give `None`.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ProtocolError> {
        match self.payload.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => self.convert(key, value).map(Some),
        }
    }

    fn convert<T: DeserializeOwned>(&self, key: &str, value: &Value) -> Result<T, ProtocolError> {
        T::deserialize(value).map_err(|source| ProtocolError::InvalidField {
            message: self.name.to_owned(),
            field: key.to_owned(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// WireEnvelope
// ---------------------------------------------------------------------------

/// One frame of the wire protocol.
///
/// Serialized as a 3-element JSON array rather than an object; the
/// `from`/`into` attributes route serde through the tuple form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "(Direction, String, Payload)",
    into = "(Direction, String, Payload)"
)]
pub struct WireEnvelope {
    /// Request or response.
    pub direction: Direction,
    /// Message name, the key into a [`MessageTable`](crate::MessageTable).
    pub name: String,
    /// Application-defined body.
    pub payload: Payload,
}

impl WireEnvelope {
    /// Builds a request envelope.
    pub fn request(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            direction: Direction::Request,
            name: name.into(),
            payload,
        }
    }

    /// Builds a response envelope.
    pub fn response(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            direction: Direction::Response,
            name: name.into(),
            payload,
        }
    }

    /// Serializes to wire text.
    pub fn to_text(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Parses wire text. Fails on anything that is not a
    /// `[direction, name, object]` triple.
    pub fn from_text(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Malformed)
    }
}

impl From<(Direction, String, Payload)> for WireEnvelope {
    fn from((direction, name, payload): (Direction, String, Payload)) -> Self {
        Self {
            direction,
            name,
            payload,
        }
    }
}

impl From<WireEnvelope> for (Direction, String, Payload) {
    fn from(env: WireEnvelope) -> Self {
        (env.direction, env.name, env.payload)
    }
}
