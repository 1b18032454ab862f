//! Identity types shared by every layer.
//!
//! Game and player ids are opaque strings. They are generated by the session
//! registry, but they travel inside application messages, so they live here
//! at the bottom of the stack.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for a game.
///
/// `#[serde(transparent)]` puts the bare string on the wire, so
/// `GameId("abc")` is `"abc"` in JSON, not `{"0":"abc"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl GameId {
    /// Borrows the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Lets maps keyed by `GameId` be queried with a plain `&str`.
impl Borrow<str> for GameId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A unique identifier for a player.
///
/// Generated player ids start with `P`, which keeps them visually distinct
/// from game ids in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Borrows the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Which way a message travels.
///
/// Serialized as the short wire tags `"req"` and `"rsp"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Client → server.
    #[serde(rename = "req")]
    Request,
    /// Server → client.
    #[serde(rename = "rsp")]
    Response,
}

impl Direction {
    /// The wire tag for this direction.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Request => "req",
            Self::Response => "rsp",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Request => "request",
            Self::Response => "response",
        })
    }
}
