//! Session registry for Hubforge.
//!
//! This crate is the bookkeeping core of a game server:
//!
//! 1. **Registry** ([`SessionRegistry`]): which games exist, which players
//!    are in them, and the state the application keeps for each
//! 2. **Ids** ([`IdGenerator`]): fresh, collision-checked game and player ids
//! 3. **Side tables**: a [`ChangeLog`] of added/removed ids, optional
//!    [`Statistics`] counters, and advertised [`PublicGame`]s
//!
//! # How it fits in the stack
//!
//! ```text
//! Router (above)      ← feeds requests to the app, which mutates the registry
//!     ↕
//! Session (this crate) ← games, players, and their associations
//!     ↕
//! Protocol (below)     ← provides GameId, PlayerId
//! ```
//!
//! Nothing here knows about sockets. Mapping connections onto games is the
//! router's job.

mod changes;
mod error;
mod ids;
mod registry;

pub use changes::{ChangeLog, PublicGame, Statistics};
pub use error::{SessionError, ValidationError};
pub use ids::{IdConfig, IdGenerator};
pub use registry::{PlayerInfo, RegistryConfig, SessionRegistry};
