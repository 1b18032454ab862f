//! The session registry: the authoritative record of games and players.
//!
//! Three maps are kept in lockstep:
//!
//! ```text
//! games:        GameId   → G                 (game state, application-owned)
//! players:      PlayerId → PlayerInfo<P>     (which game + player payload)
//! game_players: GameId   → [PlayerId]        (reverse index)
//! ```
//!
//! The maps are private. Every mutation goes through a method here so the
//! invariants hold at every observable point:
//!
//! - every id in `game_players` is present in `players`, and vice versa;
//! - every player's game is present in `games`;
//! - removing a game removes its players and its public listing.
//!
//! # Concurrency note
//!
//! Like the rest of the core, the registry is plain data with no interior
//! locking. It is owned by the single event loop that drives the router.

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use hubforge_protocol::{GameId, PlayerId};

use crate::{
    ChangeLog, IdConfig, IdGenerator, PublicGame, SessionError, Statistics, ValidationError,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Construction-time options for a [`SessionRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Id shape and retry cap.
    pub ids: IdConfig,
    /// Record added/removed ids in a [`ChangeLog`].
    pub track_changes: bool,
    /// Start with an empty [`Statistics`] table.
    pub track_statistics: bool,
    /// Fixed RNG seed. `None` seeds from the wall clock.
    pub seed: Option<u64>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            ids: IdConfig::default(),
            track_changes: true,
            track_statistics: false,
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerInfo
// ---------------------------------------------------------------------------

/// What the registry knows about one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInfo<P> {
    /// The game this player belongs to.
    pub game_id: GameId,
    /// Application-owned player data (name, seat, score, ...).
    pub player: P,
}

impl<P> PlayerInfo<P> {
    /// Pairs a payload with its game.
    pub fn new(game_id: GameId, player: P) -> Self {
        Self { game_id, player }
    }
}

// ---------------------------------------------------------------------------
// SessionRegistry
// ---------------------------------------------------------------------------

/// Games, players, and their associations.
///
/// `G` is the application's game state, `P` its per-player payload.
#[derive(Clone)]
pub struct SessionRegistry<G, P> {
    games: HashMap<GameId, G>,
    players: HashMap<PlayerId, PlayerInfo<P>>,
    game_players: HashMap<GameId, Vec<PlayerId>>,
    public_games: Vec<PublicGame>,
    changes: Option<ChangeLog>,
    statistics: Option<Statistics>,
    ids: IdGenerator,
    current_time: Option<Instant>,
}

impl<G, P> SessionRegistry<G, P> {
    /// An empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        let ids = match config.seed {
            Some(seed) => IdGenerator::with_seed(config.ids, seed),
            None => IdGenerator::from_clock(config.ids),
        };
        Self {
            games: HashMap::new(),
            players: HashMap::new(),
            game_players: HashMap::new(),
            public_games: Vec::new(),
            changes: config.track_changes.then(ChangeLog::default),
            statistics: config.track_statistics.then(Statistics::new),
            ids,
            current_time: None,
        }
    }

    // -- Games ------------------------------------------------------------

    /// Inserts a game, or replaces the state of an existing one.
    ///
    /// Returns the previous state if the id was already present. Only a
    /// brand-new id is recorded as added.
    pub fn add_game(&mut self, game_id: GameId, state: G) -> Option<G> {
        let previous = self.games.insert(game_id.clone(), state);
        if previous.is_none() {
            tracing::info!(%game_id, "game added");
            self.game_players.entry(game_id.clone()).or_default();
            if let Some(log) = &mut self.changes {
                log.added_games.push(game_id);
            }
        }
        previous
    }

    /// Replaces the state of an existing game.
    ///
    /// # Errors
    /// [`SessionError::UnknownGame`] if `game_id` is not registered.
    pub fn update_game(&mut self, game_id: &GameId, state: G) -> Result<G, SessionError> {
        let slot = self
            .games
            .get_mut(game_id)
            .ok_or_else(|| SessionError::UnknownGame(game_id.clone()))?;
        Ok(std::mem::replace(slot, state))
    }

    /// Removes a game together with its players and public listing.
    ///
    /// Returns the removed state, or `None` if the game did not exist (in
    /// which case nothing changes).
    pub fn remove_game(&mut self, game_id: &GameId) -> Option<G> {
        let state = self.games.remove(game_id)?;
        let player_ids = self.game_players.remove(game_id).unwrap_or_default();
        for player_id in &player_ids {
            self.players.remove(player_id);
        }
        self.public_games.retain(|g| &g.game_id != game_id);

        tracing::info!(%game_id, players = player_ids.len(), "game removed");
        if let Some(log) = &mut self.changes {
            log.removed_games.push(game_id.clone());
            log.removed_players.extend(player_ids);
        }
        Some(state)
    }

    /// Looks up a game's state.
    pub fn get_game(&self, game_id: &GameId) -> Option<&G> {
        self.games.get(game_id)
    }

    /// Like [`get_game`](Self::get_game), but as a `Result` for `?` chains.
    pub fn check_game_exists(&self, game_id: &GameId) -> Result<&G, SessionError> {
        self.games
            .get(game_id)
            .ok_or_else(|| SessionError::UnknownGame(game_id.clone()))
    }

    /// Existence check plus an application predicate over the game state.
    ///
    /// `mode` returns `Err(reason)` to reject the request (wrong phase,
    /// not your turn, ...). Both an unknown id and a rejection come back as
    /// a [`ValidationError`] carrying a clone of `request`.
    pub fn check_game_mode<R, F>(
        &self,
        game_id: &GameId,
        request: &R,
        mode: F,
    ) -> Result<&G, ValidationError<R>>
    where
        R: Clone + fmt::Debug,
        F: FnOnce(&G, &R) -> Result<(), String>,
    {
        let state = self
            .check_game_exists(game_id)
            .map_err(|e| e.reject(request.clone()))?;
        mode(state, request).map_err(|text| ValidationError::new(request.clone(), text))?;
        Ok(state)
    }

    /// All game ids, in no particular order.
    pub fn game_ids(&self) -> impl Iterator<Item = &GameId> {
        self.games.keys()
    }

    /// Number of live games.
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    // -- Players ----------------------------------------------------------

    /// Registers a player in an existing game.
    ///
    /// Re-adding an id that is already registered replaces its payload and
    /// moves it to `info.game_id` if that differs.
    ///
    /// # Errors
    /// [`SessionError::UnknownGame`] if the player's game does not exist.
    pub fn add_player(
        &mut self,
        player_id: PlayerId,
        info: PlayerInfo<P>,
    ) -> Result<(), SessionError> {
        if !self.games.contains_key(&info.game_id) {
            return Err(SessionError::UnknownGame(info.game_id));
        }

        let game_id = info.game_id.clone();
        match self.players.insert(player_id.clone(), info) {
            Some(old) if old.game_id == game_id => return Ok(()),
            Some(old) => self.unlink(&old.game_id, &player_id),
            None => {
                tracing::debug!(%player_id, %game_id, "player added");
                if let Some(log) = &mut self.changes {
                    log.added_players.push(player_id.clone());
                }
            }
        }
        self.game_players.entry(game_id).or_default().push(player_id);
        Ok(())
    }

    /// Replaces an existing player's payload, keeping its game.
    ///
    /// # Errors
    /// [`SessionError::UnknownPlayer`] if `player_id` is not registered.
    pub fn update_player(&mut self, player_id: &PlayerId, player: P) -> Result<P, SessionError> {
        let info = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| SessionError::UnknownPlayer(player_id.clone()))?;
        Ok(std::mem::replace(&mut info.player, player))
    }

    /// Removes one player. The game stays, even if it is now empty.
    pub fn remove_player(&mut self, player_id: &PlayerId) -> Option<PlayerInfo<P>> {
        let info = self.players.remove(player_id)?;
        self.unlink(&info.game_id, player_id);
        tracing::debug!(%player_id, game_id = %info.game_id, "player removed");
        if let Some(log) = &mut self.changes {
            log.removed_players.push(player_id.clone());
        }
        Some(info)
    }

    /// Looks up a player.
    pub fn get_player(&self, player_id: &PlayerId) -> Option<&PlayerInfo<P>> {
        self.players.get(player_id)
    }

    /// Like [`get_player`](Self::get_player), but as a `Result`.
    pub fn check_player_exists(
        &self,
        player_id: &PlayerId,
    ) -> Result<&PlayerInfo<P>, SessionError> {
        self.players
            .get(player_id)
            .ok_or_else(|| SessionError::UnknownPlayer(player_id.clone()))
    }

    /// A player together with the state of its game.
    pub fn player_and_game(
        &self,
        player_id: &PlayerId,
    ) -> Result<(&PlayerInfo<P>, &G), SessionError> {
        let info = self.check_player_exists(player_id)?;
        let game = self.check_game_exists(&info.game_id)?;
        Ok((info, game))
    }

    /// The players of a game, in join order. Empty for unknown games.
    pub fn players_of(&self, game_id: &GameId) -> &[PlayerId] {
        self.game_players.get(game_id).map_or(&[], Vec::as_slice)
    }

    /// Number of live players across all games.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    fn unlink(&mut self, game_id: &GameId, player_id: &PlayerId) {
        if let Some(list) = self.game_players.get_mut(game_id) {
            list.retain(|p| p != player_id);
        }
    }

    // -- Id generation ----------------------------------------------------

    /// A game id not currently in use.
    ///
    /// The id is not reserved: callers normally `add_game` it right away.
    pub fn new_game_id(&mut self) -> Result<GameId, SessionError> {
        let games = &self.games;
        self.ids
            .fresh("", |candidate| games.contains_key(candidate))
            .map(GameId)
    }

    /// A player id (`"P"` + token) not currently in use.
    pub fn new_player_id(&mut self) -> Result<PlayerId, SessionError> {
        let players = &self.players;
        self.ids
            .fresh("P", |candidate| players.contains_key(candidate))
            .map(PlayerId)
    }

    // -- Public games -----------------------------------------------------

    /// Advertises a game. Replaces an existing listing for the same game.
    ///
    /// # Errors
    /// [`SessionError::UnknownGame`] if the game does not exist.
    pub fn add_public_game(&mut self, entry: PublicGame) -> Result<(), SessionError> {
        if !self.games.contains_key(&entry.game_id) {
            return Err(SessionError::UnknownGame(entry.game_id));
        }
        self.public_games.retain(|g| g.game_id != entry.game_id);
        self.public_games.push(entry);
        Ok(())
    }

    /// Withdraws a listing. Returns `true` if one was removed.
    pub fn remove_public_game(&mut self, game_id: &GameId) -> bool {
        let before = self.public_games.len();
        self.public_games.retain(|g| &g.game_id != game_id);
        self.public_games.len() != before
    }

    /// Advertised games, oldest first.
    pub fn public_games(&self) -> &[PublicGame] {
        &self.public_games
    }

    /// Whether a game is advertised.
    pub fn is_public(&self, game_id: &GameId) -> bool {
        self.public_games.iter().any(|g| &g.game_id == game_id)
    }

    // -- Change log -------------------------------------------------------

    /// The pending change log, if tracking is enabled.
    pub fn changes(&self) -> Option<&ChangeLog> {
        self.changes.as_ref()
    }

    /// Drains the change log. Returns an empty log when tracking is off.
    pub fn take_changes(&mut self) -> ChangeLog {
        self.changes.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Turns change tracking on or off. Turning it off discards pending
    /// entries.
    pub fn set_change_tracking(&mut self, enabled: bool) {
        match (enabled, self.changes.is_some()) {
            (true, false) => self.changes = Some(ChangeLog::default()),
            (false, true) => self.changes = None,
            _ => {}
        }
    }

    // -- Statistics -------------------------------------------------------

    /// Current counters, if statistics are enabled.
    pub fn statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref()
    }

    /// Replaces (or disables, with `None`) the statistics table.
    pub fn set_statistics(&mut self, statistics: Option<Statistics>) {
        self.statistics = statistics;
    }

    /// Applies `f` to the counters. Does nothing when statistics are off.
    pub fn update_statistics(&mut self, f: impl FnOnce(&mut Statistics)) {
        if let Some(stats) = &mut self.statistics {
            f(stats);
        }
    }

    // -- Clock ------------------------------------------------------------

    /// The time of the most recent tick, if any has arrived.
    pub fn current_time(&self) -> Option<Instant> {
        self.current_time
    }

    /// Records the time of a tick.
    pub fn set_current_time(&mut self, now: Instant) {
        self.current_time = Some(now);
    }
}

impl<G, P> Default for SessionRegistry<G, P> {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl<G, P> fmt::Debug for SessionRegistry<G, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("games", &self.games.len())
            .field("players", &self.players.len())
            .field("public_games", &self.public_games.len())
            .field("tracking_changes", &self.changes.is_some())
            .finish_non_exhaustive()
    }
}

/// Equal when every recorded map, listing, log, counter and the clock
/// match. The id generator's position is not compared.
impl<G: PartialEq, P: PartialEq> PartialEq for SessionRegistry<G, P> {
    fn eq(&self, other: &Self) -> bool {
        self.games == other.games
            && self.players == other.players
            && self.game_players == other.game_players
            && self.public_games == other.public_games
            && self.changes == other.changes
            && self.statistics == other.statistics
            && self.current_time == other.current_time
    }
}
