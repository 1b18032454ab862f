//! Bookkeeping side tables: change log, statistics, public games.

use std::collections::BTreeMap;

use hubforge_protocol::{GameId, PlayerId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ChangeLog
// ---------------------------------------------------------------------------

/// Ids added and removed since the log was last drained.
///
/// Lets code outside the registry (the router's socket maps, an external
/// index) catch up incrementally instead of diffing the whole registry.
/// A game created and removed within one window appears in both lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeLog {
    /// Games inserted, in order.
    pub added_games: Vec<GameId>,
    /// Games removed, in order.
    pub removed_games: Vec<GameId>,
    /// Players inserted, in order.
    pub added_players: Vec<PlayerId>,
    /// Players removed, in order. Includes cascade removals.
    pub removed_players: Vec<PlayerId>,
}

impl ChangeLog {
    /// `true` when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added_games.is_empty()
            && self.removed_games.is_empty()
            && self.added_players.is_empty()
            && self.removed_players.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Named integer counters.
///
/// Absent counters read as zero. Serializable so an application can ship a
/// snapshot to an admin client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Statistics(BTreeMap<String, i64>);

impl Statistics {
    /// An empty set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `name` (zero when never set).
    pub fn get(&self, name: &str) -> i64 {
        self.0.get(name).copied().unwrap_or(0)
    }

    /// Overwrites `name`.
    pub fn set(&mut self, name: &str, value: i64) {
        self.0.insert(name.to_owned(), value);
    }

    /// Adds `delta` to `name` and returns the new value.
    pub fn add(&mut self, name: &str, delta: i64) -> i64 {
        let slot = self.0.entry(name.to_owned()).or_insert(0);
        *slot += delta;
        *slot
    }

    /// Shorthand for `add(name, 1)`.
    pub fn increment(&mut self, name: &str) -> i64 {
        self.add(name, 1)
    }

    /// Keeps the larger of the current value and `value`.
    /// Handy for high-water marks like peak concurrent games.
    pub fn raise_to(&mut self, name: &str, value: i64) {
        let slot = self.0.entry(name.to_owned()).or_insert(value);
        if value > *slot {
            *slot = value;
        }
    }

    /// All counters, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

// ---------------------------------------------------------------------------
// PublicGame
// ---------------------------------------------------------------------------

/// A game advertised to clients looking for someone to play with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicGame {
    /// The advertised game.
    pub game_id: GameId,
    /// Display name of whoever opened it.
    pub player_name: String,
}
