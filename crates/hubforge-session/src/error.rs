//! Error types for the session layer.

use std::fmt;

use hubforge_protocol::{GameId, PlayerId};

/// Errors from registry lookups and id generation.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No game with this id.
    #[error("unknown game id: {0}")]
    UnknownGame(GameId),

    /// No player with this id.
    #[error("unknown player id: {0}")]
    UnknownPlayer(PlayerId),

    /// Every candidate id drawn collided with a live one.
    ///
    /// With the default 16-letter ids this means the generator is
    /// misconfigured (e.g. `length` set to 1), not that the server is busy.
    #[error("id space exhausted after {attempts} attempts")]
    IdSpaceExhausted {
        /// How many candidates were tried.
        attempts: u32,
    },
}

impl SessionError {
    /// Attaches the offending request, turning a lookup failure into a
    /// [`ValidationError`] the application can send back.
    pub fn reject<R: fmt::Debug>(self, request: R) -> ValidationError<R> {
        ValidationError {
            request,
            text: self.to_string(),
        }
    }
}

/// A request that failed validation.
///
/// This is an ordinary result value, not a fault. Applications typically map
/// it into an error response carrying `text` back to the sender.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{text}")]
pub struct ValidationError<R: fmt::Debug> {
    /// The request that was rejected.
    pub request: R,
    /// Why it was rejected.
    pub text: String,
}

impl<R: fmt::Debug> ValidationError<R> {
    /// Builds a rejection with a custom reason.
    pub fn new(request: R, text: impl Into<String>) -> Self {
        Self {
            request,
            text: text.into(),
        }
    }
}
