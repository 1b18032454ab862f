//! A small lobby application shared by the router and proxy tests.

#![allow(dead_code)]

use hubforge_protocol::{
    Direction, GameId, MessageCodec, MessageTable, Payload, PlayerId, ProtocolError, WireMessage,
};
use hubforge_router::{AppRegistry, GameApp, Recipient};
use hubforge_session::PlayerInfo;
use hubforge_transport::{Outbox, SocketId, TransportError};

// =========================================================================
// Mock app: a chat lobby with an open/closed phase.
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LobbyState {
    pub phase: Phase,
    pub glitches: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LobbyRequest {
    Create { name: String },
    Join { game_id: GameId, name: String },
    Say { player_id: PlayerId, text: String },
    Close { game_id: GameId },
    End { game_id: GameId },
    Touch { game_id: GameId },
    Corrupt { game_id: GameId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LobbyResponse {
    Created { game_id: GameId, player_id: PlayerId },
    Joined { game_id: GameId, player_id: PlayerId, name: String },
    Said { game_id: GameId, player_id: PlayerId, text: String },
    Ended { game_id: GameId },
    Touched { game_id: GameId },
    /// Encodes `count` but its parser drops it, so it never survives a
    /// round trip.
    Glitch { count: u32 },
    Error { text: String },
}

impl WireMessage for LobbyRequest {
    const DIRECTION: Direction = Direction::Request;

    fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Join { .. } => "join",
            Self::Say { .. } => "say",
            Self::Close { .. } => "close",
            Self::End { .. } => "end",
            Self::Touch { .. } => "touch",
            Self::Corrupt { .. } => "corrupt",
        }
    }

    fn payload(&self) -> Result<Payload, ProtocolError> {
        Ok(match self {
            Self::Create { name } => Payload::new().with("name", name.as_str()),
            Self::Join { game_id, name } => Payload::new()
                .with("game_id", game_id.as_str())
                .with("name", name.as_str()),
            Self::Say { player_id, text } => Payload::new()
                .with("player_id", player_id.as_str())
                .with("text", text.as_str()),
            Self::Close { game_id }
            | Self::End { game_id }
            | Self::Touch { game_id }
            | Self::Corrupt { game_id } => Payload::new().with("game_id", game_id.as_str()),
        })
    }

    fn table() -> MessageTable<Self> {
        MessageTable::new(Direction::Request)
            .register("create", |f| Ok(Self::Create { name: f.get("name")? }))
            .register("join", |f| {
                Ok(Self::Join {
                    game_id: f.get("game_id")?,
                    name: f.get("name")?,
                })
            })
            .register("say", |f| {
                Ok(Self::Say {
                    player_id: f.get("player_id")?,
                    text: f.get("text")?,
                })
            })
            .register("close", |f| Ok(Self::Close { game_id: f.get("game_id")? }))
            .register("end", |f| Ok(Self::End { game_id: f.get("game_id")? }))
            .register("touch", |f| Ok(Self::Touch { game_id: f.get("game_id")? }))
            .register("corrupt", |f| Ok(Self::Corrupt { game_id: f.get("game_id")? }))
    }
}

impl WireMessage for LobbyResponse {
    const DIRECTION: Direction = Direction::Response;

    fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Joined { .. } => "joined",
            Self::Said { .. } => "said",
            Self::Ended { .. } => "ended",
            Self::Touched { .. } => "touched",
            Self::Glitch { .. } => "glitch",
            Self::Error { .. } => "error",
        }
    }

    fn payload(&self) -> Result<Payload, ProtocolError> {
        Ok(match self {
            Self::Created { game_id, player_id } => Payload::new()
                .with("game_id", game_id.as_str())
                .with("player_id", player_id.as_str()),
            Self::Joined { game_id, player_id, name } => Payload::new()
                .with("game_id", game_id.as_str())
                .with("player_id", player_id.as_str())
                .with("name", name.as_str()),
            Self::Said { game_id, player_id, text } => Payload::new()
                .with("game_id", game_id.as_str())
                .with("player_id", player_id.as_str())
                .with("text", text.as_str()),
            Self::Ended { game_id } | Self::Touched { game_id } => {
                Payload::new().with("game_id", game_id.as_str())
            }
            Self::Glitch { count } => Payload::new().with("count", *count),
            Self::Error { text } => Payload::new().with("text", text.as_str()),
        })
    }

    fn table() -> MessageTable<Self> {
        MessageTable::new(Direction::Response)
            .register("created", |f| {
                Ok(Self::Created {
                    game_id: f.get("game_id")?,
                    player_id: f.get("player_id")?,
                })
            })
            .register("joined", |f| {
                Ok(Self::Joined {
                    game_id: f.get("game_id")?,
                    player_id: f.get("player_id")?,
                    name: f.get("name")?,
                })
            })
            .register("said", |f| {
                Ok(Self::Said {
                    game_id: f.get("game_id")?,
                    player_id: f.get("player_id")?,
                    text: f.get("text")?,
                })
            })
            .register("ended", |f| Ok(Self::Ended { game_id: f.get("game_id")? }))
            .register("touched", |f| Ok(Self::Touched { game_id: f.get("game_id")? }))
            .register("glitch", |_| Ok(Self::Glitch { count: 0 }))
            .register("error", |f| Ok(Self::Error { text: f.get("text")? }))
    }
}

pub struct Lobby;

impl GameApp for Lobby {
    type State = LobbyState;
    type Player = String;
    type Request = LobbyRequest;
    type Response = LobbyResponse;

    fn process(registry: &mut AppRegistry<Self>, request: LobbyRequest) -> Option<LobbyResponse> {
        Some(match handle(registry, request) {
            Ok(Some(response)) => response,
            Ok(None) => return None,
            Err(text) => LobbyResponse::Error { text },
        })
    }

    fn game_of(response: &LobbyResponse) -> Option<GameId> {
        match response {
            LobbyResponse::Created { game_id, .. }
            | LobbyResponse::Joined { game_id, .. }
            | LobbyResponse::Said { game_id, .. }
            | LobbyResponse::Ended { game_id }
            | LobbyResponse::Touched { game_id } => Some(game_id.clone()),
            LobbyResponse::Glitch { .. } | LobbyResponse::Error { .. } => None,
        }
    }

    fn recipient(response: &LobbyResponse) -> Recipient {
        match response {
            LobbyResponse::Joined { .. } | LobbyResponse::Ended { .. } => Recipient::Game,
            LobbyResponse::Said { .. } => Recipient::GameExceptOrigin,
            _ => Recipient::Origin,
        }
    }

    fn error_response(error: &ProtocolError) -> Option<LobbyResponse> {
        Some(LobbyResponse::Error { text: error.to_string() })
    }
}

fn handle(
    registry: &mut AppRegistry<Lobby>,
    request: LobbyRequest,
) -> Result<Option<LobbyResponse>, String> {
    match &request {
        LobbyRequest::Create { name } => {
            let game_id = registry.new_game_id().map_err(|e| e.to_string())?;
            registry.add_game(game_id.clone(), LobbyState { phase: Phase::Open, glitches: 0 });
            let player_id = registry.new_player_id().map_err(|e| e.to_string())?;
            registry
                .add_player(player_id.clone(), PlayerInfo::new(game_id.clone(), name.clone()))
                .map_err(|e| e.to_string())?;
            Ok(Some(LobbyResponse::Created { game_id, player_id }))
        }
        LobbyRequest::Join { game_id, name } => {
            registry
                .check_game_mode(game_id, &request, |state, _| match state.phase {
                    Phase::Open => Ok(()),
                    Phase::Closed => Err("game is closed".into()),
                })
                .map_err(|e| e.text)?;
            let player_id = registry.new_player_id().map_err(|e| e.to_string())?;
            registry
                .add_player(player_id.clone(), PlayerInfo::new(game_id.clone(), name.clone()))
                .map_err(|e| e.to_string())?;
            Ok(Some(LobbyResponse::Joined {
                game_id: game_id.clone(),
                player_id,
                name: name.clone(),
            }))
        }
        LobbyRequest::Say { player_id, text } => {
            let (info, _) = registry.player_and_game(player_id).map_err(|e| e.to_string())?;
            Ok(Some(LobbyResponse::Said {
                game_id: info.game_id.clone(),
                player_id: player_id.clone(),
                text: text.clone(),
            }))
        }
        LobbyRequest::Close { game_id } => {
            let mut state = registry.check_game_exists(game_id).map_err(|e| e.to_string())?.clone();
            state.phase = Phase::Closed;
            registry.update_game(game_id, state).map_err(|e| e.to_string())?;
            Ok(None)
        }
        LobbyRequest::End { game_id } => {
            registry.remove_game(game_id).ok_or("unknown game id")?;
            Ok(Some(LobbyResponse::Ended { game_id: game_id.clone() }))
        }
        LobbyRequest::Touch { game_id } => {
            registry.check_game_exists(game_id).map_err(|e| e.to_string())?;
            Ok(Some(LobbyResponse::Touched { game_id: game_id.clone() }))
        }
        LobbyRequest::Corrupt { game_id } => {
            let mut state = registry.check_game_exists(game_id).map_err(|e| e.to_string())?.clone();
            state.glitches += 1;
            let count = state.glitches;
            registry.update_game(game_id, state).map_err(|e| e.to_string())?;
            Ok(Some(LobbyResponse::Glitch { count }))
        }
    }
}

/// Same vocabulary and rules, but drops protocol errors silently.
pub struct QuietLobby;

impl GameApp for QuietLobby {
    type State = LobbyState;
    type Player = String;
    type Request = LobbyRequest;
    type Response = LobbyResponse;

    fn process(registry: &mut AppRegistry<Self>, request: LobbyRequest) -> Option<LobbyResponse> {
        Lobby::process(registry, request)
    }

    fn game_of(response: &LobbyResponse) -> Option<GameId> {
        Lobby::game_of(response)
    }

    fn recipient(response: &LobbyResponse) -> Recipient {
        Lobby::recipient(response)
    }
}

// =========================================================================
// Recording outbox
// =========================================================================

/// Captures every send. Sockets listed in `dead` fail like closed peers.
#[derive(Default)]
pub struct RecordingOutbox {
    pub sent: Vec<(SocketId, String)>,
    pub dead: Vec<SocketId>,
}

impl Outbox for RecordingOutbox {
    fn send_to_one(&mut self, socket: SocketId, text: &str) -> Result<(), TransportError> {
        if self.dead.contains(&socket) {
            return Err(TransportError::UnknownSocket(socket));
        }
        self.sent.push((socket, text.to_owned()));
        Ok(())
    }
}

impl RecordingOutbox {
    /// Decoded responses delivered to `socket`, in order.
    pub fn received_by(&self, socket: SocketId) -> Vec<LobbyResponse> {
        let codec = MessageCodec::<LobbyResponse>::new();
        self.sent
            .iter()
            .filter(|(s, _)| *s == socket)
            .map(|(_, text)| codec.decode_text(text).unwrap())
            .collect()
    }

    /// Sockets that received anything, in send order.
    pub fn recipients(&self) -> Vec<SocketId> {
        self.sent.iter().map(|(s, _)| *s).collect()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

/// Wire text for a request.
pub fn wire(request: &LobbyRequest) -> String {
    MessageCodec::<LobbyRequest>::new().encode_text(request).unwrap()
}

pub fn sock(n: u64) -> SocketId {
    SocketId::new(n)
}
