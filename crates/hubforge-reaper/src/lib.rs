//! Reclaiming abandoned games for Hubforge.
//!
//! Two pieces:
//!
//! - [`DeathWatch`]: games with no connected sockets, queued by expiry.
//!   Sans-IO; the caller supplies the clock.
//! - [`Ticker`]: the periodic timer whose firings drive the sweeps.
//!
//! # Integration
//!
//! The server's event loop owns one ticker and forwards each firing to the
//! router, which sweeps its death watch:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(event) = events.recv() => router.handle(event, &mut outbox),
//!         now = ticker.tick() => router.handle(TransportEvent::Tick(now), &mut outbox),
//!     }
//! }
//! ```

mod death_watch;
mod ticker;

pub use death_watch::DeathWatch;
pub use ticker::{TickConfig, TickPolicy, Ticker};
