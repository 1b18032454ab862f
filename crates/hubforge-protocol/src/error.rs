//! Error types for the protocol layer.
//!
//! Every variant is a *decode-side* or *validation-side* failure scoped to a
//! single message. None of them should ever take the server down.

use crate::Direction;

/// Errors that can occur while encoding, decoding, or validating messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The text is not JSON, or not a `[direction, name, {..}]` triple.
    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Serializing an envelope or a field value failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// A request arrived where a response was expected, or vice versa.
    #[error("expected a {expected} envelope, got a {found}")]
    WrongDirection {
        /// The direction the decoder was built for.
        expected: Direction,
        /// The direction tag on the envelope.
        found: Direction,
    },

    /// No parser is registered under this name for this direction.
    #[error("unknown {direction} message: {name}")]
    UnknownMessage {
        /// The direction whose table was consulted.
        direction: Direction,
        /// The unrecognized message name.
        name: String,
    },

    /// A required payload key is absent.
    #[error("message {message}: missing field `{field}`")]
    MissingField {
        /// Message name.
        message: String,
        /// Payload key.
        field: String,
    },

    /// A payload key is present but has the wrong shape.
    #[error("message {message}: invalid field `{field}`: {source}")]
    InvalidField {
        /// Message name.
        message: String,
        /// Payload key.
        field: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Encoding then decoding a message did not give the same message back.
    #[error("round trip changed {direction} message {name}")]
    RoundTripMismatch {
        /// Direction of the message.
        direction: Direction,
        /// Message name.
        name: String,
    },
}
