//! The connection router.
//!
//! Sans-IO: the router consumes [`TransportEvent`]s and writes outgoing text
//! through an [`Outbox`]. It never touches a socket or a clock itself, which
//! keeps it synchronous and deterministic under test.
//!
//! # Socket lifecycle
//!
//! ```text
//! Connected ──► Unbound ──(response names a game)──► Bound(game)
//!                  ▲                                     │
//!                  └────────── leave / disconnect ───────┘
//! ```
//!
//! When a game's last socket goes away, the game is put on the death watch,
//! stamped with the router clock. A socket binding to it again before the
//! grace period runs out reprieves it; otherwise the first tick past expiry
//! removes it from the registry. The clock moves on ticks and on
//! [`Router::advance`], which the server calls before every event.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use hubforge_protocol::{GameId, ProtocolError};
use hubforge_reaper::DeathWatch;
use hubforge_session::{SessionRegistry, Statistics};
use hubforge_transport::{Outbox, SocketId, TransportEvent};
use tracing::{debug, info, warn};

use crate::validated::{AppCodecs, process_validated};
use crate::{AppRegistry, GameApp, Recipient, RouterConfig};

/// Router counter: requests received (decodable or not).
pub const STAT_MESSAGES_RECEIVED: &str = "messages_received";
/// Router counter: requests that failed to decode.
pub const STAT_DECODE_ERRORS: &str = "decode_errors";
/// Router counter: games removed by the death watch.
pub const STAT_GAMES_REAPED: &str = "games_reaped";

/// Binds sockets to games and routes messages between them and the
/// application.
pub struct Router<A: GameApp> {
    config: RouterConfig,
    registry: AppRegistry<A>,
    codecs: AppCodecs<A>,
    connected: HashSet<SocketId>,
    socket_game: HashMap<SocketId, GameId>,
    game_sockets: HashMap<GameId, Vec<SocketId>>,
    death_watch: DeathWatch,
    stats: Statistics,
    /// Router clock. Starts at construction, moves on ticks and `advance`.
    now: Instant,
}

impl<A: GameApp> Router<A> {
    /// A router with an empty registry.
    pub fn new(config: RouterConfig) -> Self {
        let mut registry = SessionRegistry::new(config.registry.clone());
        registry.set_change_tracking(true);
        Self {
            death_watch: DeathWatch::new(config.death_watch_grace),
            config,
            registry,
            codecs: AppCodecs::new(),
            connected: HashSet::new(),
            socket_game: HashMap::new(),
            game_sockets: HashMap::new(),
            stats: Statistics::new(),
            now: Instant::now(),
        }
    }

    /// Processes one event to completion.
    pub fn handle(&mut self, event: TransportEvent, out: &mut impl Outbox) {
        match event {
            TransportEvent::Connected(socket) => self.connect(socket),
            TransportEvent::Disconnected(socket) => self.disconnect(socket),
            TransportEvent::MessageReceived(socket, text) => self.receive(socket, &text, out),
            TransportEvent::Tick(now) => self.tick(now),
        }
    }

    /// Registers a new socket. It starts out unbound.
    pub fn connect(&mut self, socket: SocketId) {
        if !self.connected.insert(socket) {
            warn!(%socket, "socket connected twice");
            return;
        }
        debug!(%socket, "socket connected");
    }

    /// Forgets a socket, unbinding it from its game.
    pub fn disconnect(&mut self, socket: SocketId) {
        if !self.connected.remove(&socket) {
            warn!(%socket, "disconnect for unknown socket");
            return;
        }
        self.unbind(socket);
        debug!(%socket, "socket disconnected");
    }

    /// Unbinds a socket from its game but keeps it connected.
    ///
    /// Returns the game it was bound to.
    pub fn leave(&mut self, socket: SocketId) -> Option<GameId> {
        self.unbind(socket)
    }

    /// Decodes and processes one request from `socket`.
    pub fn receive(&mut self, socket: SocketId, text: &str, out: &mut impl Outbox) {
        if !self.connected.contains(&socket) {
            warn!(%socket, "message from unknown socket dropped");
            return;
        }
        self.stats.increment(STAT_MESSAGES_RECEIVED);

        let request = match self.codecs.requests.decode_text(text) {
            Ok(request) => request,
            Err(e) => {
                debug!(%socket, error = %e, "request decode failed");
                self.stats.increment(STAT_DECODE_ERRORS);
                self.reply_error(socket, &e, out);
                return;
            }
        };

        let result = if self.config.validate_round_trip {
            process_validated::<A>(&mut self.registry, &self.codecs, request)
        } else {
            Ok(A::process(&mut self.registry, request))
        };

        match result {
            Ok(Some(response)) => self.dispatch(socket, &response, out),
            Ok(None) => {}
            Err(e) => {
                warn!(%socket, error = %e, "request rejected by validation");
                self.reply_error(socket, &e, out);
            }
        }

        self.sync_changes();
    }

    /// Moves the router clock forward to `now`. Earlier instants are
    /// ignored. The registry clock only follows on the next tick.
    ///
    /// Games orphaned after this call go on the death watch from `now`.
    /// Without it the clock only moves on ticks, and a game orphaned
    /// between two ticks is enqueued at the earlier one.
    pub fn advance(&mut self, now: Instant) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Advances the clock and reaps every game whose grace has run out.
    pub fn tick(&mut self, now: Instant) {
        self.advance(now);
        self.registry.set_current_time(self.now);

        for game_id in self.death_watch.sweep(self.now) {
            if self.game_sockets.contains_key(&game_id) {
                continue;
            }
            if self.registry.remove_game(&game_id).is_some() {
                info!(%game_id, "game reaped");
                self.stats.increment(STAT_GAMES_REAPED);
            }
        }

        self.sync_changes();
    }

    // -- Accessors --------------------------------------------------------

    /// The registry.
    pub fn registry(&self) -> &AppRegistry<A> {
        &self.registry
    }

    /// Mutable access to the registry, for seeding or administration.
    /// Changes made here are reconciled with the socket maps at the next
    /// event.
    pub fn registry_mut(&mut self) -> &mut AppRegistry<A> {
        &mut self.registry
    }

    /// The game a socket is bound to.
    pub fn game_of_socket(&self, socket: SocketId) -> Option<&GameId> {
        self.socket_game.get(&socket)
    }

    /// Sockets bound to a game, in bind order.
    pub fn sockets_of(&self, game_id: &GameId) -> &[SocketId] {
        self.game_sockets.get(game_id).map_or(&[], Vec::as_slice)
    }

    /// Whether a socket is connected.
    pub fn is_connected(&self, socket: SocketId) -> bool {
        self.connected.contains(&socket)
    }

    /// Number of connected sockets.
    pub fn connected_count(&self) -> usize {
        self.connected.len()
    }

    /// The pending reaps.
    pub fn death_watch(&self) -> &DeathWatch {
        &self.death_watch
    }

    /// Router counters: [`STAT_MESSAGES_RECEIVED`], [`STAT_DECODE_ERRORS`],
    /// [`STAT_GAMES_REAPED`]. Kept out of the registry so a request that
    /// never decodes leaves the registry untouched.
    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// The router clock.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// The active configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    // -- Internals --------------------------------------------------------

    fn dispatch(&mut self, origin: SocketId, response: &A::Response, out: &mut impl Outbox) {
        let game_id = A::game_of(response);
        if let Some(game_id) = &game_id {
            if self.registry.get_game(game_id).is_some() {
                self.bind(origin, game_id.clone());
            }
        }

        let text = match self.codecs.responses.encode_text(response) {
            Ok(text) => text,
            Err(e) => {
                warn!(%origin, error = %e, "response encode failed");
                return;
            }
        };

        let targets: Vec<SocketId> = match (A::recipient(response), &game_id) {
            (Recipient::Game, Some(game_id)) => self.sockets_of(game_id).to_vec(),
            (Recipient::GameExceptOrigin, Some(game_id)) => self
                .sockets_of(game_id)
                .iter()
                .copied()
                .filter(|s| *s != origin)
                .collect(),
            (Recipient::Origin, _) | (_, None) => vec![origin],
        };

        if let Err(e) = out.send_to_many(&targets, &text) {
            debug!(%origin, error = %e, "send dropped");
        }
    }

    fn reply_error(&self, socket: SocketId, error: &ProtocolError, out: &mut impl Outbox) {
        let Some(response) = A::error_response(error) else {
            return;
        };
        match self.codecs.responses.encode_text(&response) {
            Ok(text) => {
                if let Err(e) = out.send_to_one(socket, &text) {
                    debug!(%socket, error = %e, "error reply dropped");
                }
            }
            Err(e) => warn!(%socket, error = %e, "error reply encode failed"),
        }
    }

    fn bind(&mut self, socket: SocketId, game_id: GameId) {
        if self.socket_game.get(&socket) == Some(&game_id) {
            self.death_watch.reprieve(&game_id);
            return;
        }
        self.unbind(socket);

        self.socket_game.insert(socket, game_id.clone());
        self.game_sockets.entry(game_id.clone()).or_default().push(socket);
        self.death_watch.reprieve(&game_id);
        info!(%socket, %game_id, "socket bound");
    }

    fn unbind(&mut self, socket: SocketId) -> Option<GameId> {
        let game_id = self.socket_game.remove(&socket)?;
        let now_empty = match self.game_sockets.get_mut(&game_id) {
            Some(list) => {
                list.retain(|s| *s != socket);
                list.is_empty()
            }
            None => true,
        };
        debug!(%socket, %game_id, "socket unbound");

        if now_empty {
            self.game_sockets.remove(&game_id);
            if self.registry.get_game(&game_id).is_some() {
                self.death_watch.watch(game_id.clone(), self.now);
            }
        }
        Some(game_id)
    }

    /// Brings the socket maps in line with registry changes made by the
    /// application (or by a sweep).
    fn sync_changes(&mut self) {
        let changes = self.registry.take_changes();

        for game_id in &changes.removed_games {
            if let Some(sockets) = self.game_sockets.remove(game_id) {
                for socket in sockets {
                    self.socket_game.remove(&socket);
                }
            }
            self.death_watch.reprieve(game_id);
        }

        // A new game nobody is bound to would otherwise live forever.
        for game_id in &changes.added_games {
            if self.registry.get_game(game_id).is_some()
                && !self.game_sockets.contains_key(game_id)
            {
                self.death_watch.watch(game_id.clone(), self.now);
            }
        }
    }
}

impl<A: GameApp> std::fmt::Debug for Router<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("registry", &self.registry)
            .field("connected", &self.connected.len())
            .field("bound", &self.socket_game.len())
            .field("death_watch", &self.death_watch.len())
            .finish_non_exhaustive()
    }
}
