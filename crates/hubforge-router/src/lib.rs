//! Connection routing for Hubforge.
//!
//! Binds transport sockets to games, feeds decoded requests to the
//! application, and routes responses back out.
//!
//! # Key types
//!
//! - [`GameApp`]: the trait applications implement
//! - [`Router`]: sans-IO event handler owning the registry and socket maps
//! - [`Recipient`]: who a response goes to
//! - [`ProxyServer`] / [`ServerLink`]: the same processing path in-process
//! - [`RouterConfig`]: grace period, registry settings, validation switch

#![allow(async_fn_in_trait)]

mod config;
mod error;
mod logic;
mod proxy;
mod router;
mod validated;

pub use config::RouterConfig;
pub use error::LinkError;
pub use logic::{AppRegistry, GameApp, Recipient};
pub use proxy::{ProxyServer, ServerLink};
pub use router::{Router, STAT_DECODE_ERRORS, STAT_GAMES_REAPED, STAT_MESSAGES_RECEIVED};
pub use validated::{AppCodecs, process_validated};
