//! Periodic housekeeping tick.
//!
//! The server `select!`s on [`Ticker::tick`] next to its event channel and
//! turns each firing into a `TransportEvent::Tick`, which is when the router
//! sweeps the death watch. The ticker only keeps time; it knows nothing about
//! games.

use std::time::{Duration, Instant};

use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when the loop falls behind and ticks are missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Drop the missed ticks and realign to the original schedule.
    #[default]
    Skip,
    /// Fire every missed tick back to back until caught up.
    Burst,
    /// Restart the schedule from the late tick.
    Delay,
}

impl TickPolicy {
    fn missed_tick_behavior(self) -> MissedTickBehavior {
        match self {
            Self::Skip => MissedTickBehavior::Skip,
            Self::Burst => MissedTickBehavior::Burst,
            Self::Delay => MissedTickBehavior::Delay,
        }
    }
}

/// Ticker configuration.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between ticks. Bounds how late a game can be reaped.
    pub interval: Duration,
    /// Missed-tick handling.
    pub policy: TickPolicy,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            policy: TickPolicy::default(),
        }
    }
}

impl TickConfig {
    /// Shortest interval accepted; anything below is clamped up.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

    /// A config with the given interval and the default policy.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values. A zero interval would make tokio panic.
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_us = self.interval.as_micros() as u64,
                "tick interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// A periodic timer that counts its firings.
///
/// Must be created inside a tokio runtime.
pub struct Ticker {
    interval: Interval,
    period: Duration,
    tick_count: u64,
}

impl Ticker {
    /// Starts a ticker. The first tick fires one full interval from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let start = time::Instant::now() + config.interval;
        let mut interval = time::interval_at(start, config.interval);
        interval.set_missed_tick_behavior(config.policy.missed_tick_behavior());

        debug!(
            interval_ms = config.interval.as_millis() as u64,
            policy = ?config.policy,
            "ticker started"
        );

        Self {
            interval,
            period: config.interval,
            tick_count: 0,
        }
    }

    /// Waits for the next tick and returns when it was scheduled.
    ///
    /// Cancel-safe, so it can sit in a `tokio::select!` branch.
    pub async fn tick(&mut self) -> Instant {
        let at = self.interval.tick().await;
        self.tick_count += 1;
        trace!(tick = self.tick_count, "tick fired");
        at.into_std()
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configured interval.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl std::fmt::Debug for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticker")
            .field("period", &self.period)
            .field("tick_count", &self.tick_count)
            .finish()
    }
}
