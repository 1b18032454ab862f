//! The death watch: games waiting to be reaped.
//!
//! A game goes on watch when its last socket leaves. If no socket binds to
//! it again within the grace period, the next sweep hands it back for
//! deletion. Any renewed activity reprieves it.
//!
//! Entries are appended with non-decreasing expiry (the caller's clock only
//! moves forward), so the queue is sorted and a sweep only ever looks at the
//! front.

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use hubforge_protocol::GameId;
use tracing::debug;

/// Time-ordered queue of games awaiting deletion.
#[derive(Debug, Clone)]
pub struct DeathWatch {
    grace: Duration,
    queue: VecDeque<(Instant, GameId)>,
    pending: HashSet<GameId>,
}

impl DeathWatch {
    /// An empty watch with the given grace period.
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            queue: VecDeque::new(),
            pending: HashSet::new(),
        }
    }

    /// The grace period.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Puts `game` on watch, expiring at `now + grace`.
    ///
    /// Returns `false` (and keeps the original expiry) if it was already
    /// pending.
    pub fn watch(&mut self, game: GameId, now: Instant) -> bool {
        if self.pending.contains(&game) {
            return false;
        }
        let expiry = now + self.grace;
        debug!(game_id = %game, grace_ms = self.grace.as_millis() as u64, "game on death watch");
        self.pending.insert(game.clone());
        self.queue.push_back((expiry, game));
        true
    }

    /// Takes `game` off the watch. Returns `true` if it was pending.
    pub fn reprieve(&mut self, game: &GameId) -> bool {
        if !self.pending.remove(game) {
            return false;
        }
        self.queue.retain(|(_, g)| g != game);
        debug!(game_id = %game, "game reprieved");
        true
    }

    /// Removes and returns every game whose expiry is at or before `now`,
    /// oldest first.
    pub fn sweep(&mut self, now: Instant) -> Vec<GameId> {
        let mut expired = Vec::new();
        while let Some((expiry, _)) = self.queue.front() {
            if *expiry > now {
                break;
            }
            if let Some((_, game)) = self.queue.pop_front() {
                self.pending.remove(&game);
                expired.push(game);
            }
        }
        expired
    }

    /// Whether `game` is pending.
    pub fn is_watched(&self, game: &GameId) -> bool {
        self.pending.contains(game)
    }

    /// When the oldest entry expires.
    pub fn next_expiry(&self) -> Option<Instant> {
        self.queue.front().map(|(expiry, _)| *expiry)
    }

    /// Number of pending games.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// `true` when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
