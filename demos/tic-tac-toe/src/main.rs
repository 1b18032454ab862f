use hubforge::prelude::*;

// ---------------------------------------------------------------------------
// Game types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    fn mark(self) -> char {
        match self {
            Cell::X => 'X',
            Cell::O => 'O',
            Cell::Empty => '.',
        }
    }
}

#[derive(Debug, Clone)]
pub struct State {
    board: [[Cell; 3]; 3],
    players: Vec<PlayerId>, // index 0 = X, 1 = O
    turn: usize,
    outcome: Option<String>,
}

impl State {
    fn new(creator: PlayerId) -> Self {
        Self {
            board: [[Cell::Empty; 3]; 3],
            players: vec![creator],
            turn: 0,
            outcome: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    NewGame { name: String, public: bool },
    ListGames,
    JoinGame { game_id: GameId, name: String },
    Move {
        player_id: PlayerId,
        row: usize,
        col: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    GameCreated {
        game_id: GameId,
        player_id: PlayerId,
    },
    GameList { games: Vec<PublicGame> },
    PlayerJoined {
        game_id: GameId,
        player_id: PlayerId,
        name: String,
    },
    MoveMade {
        game_id: GameId,
        mark: char,
        row: usize,
        col: usize,
        outcome: Option<String>,
    },
    Rejected { text: String },
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

impl WireMessage for Request {
    const DIRECTION: Direction = Direction::Request;

    fn name(&self) -> &'static str {
        match self {
            Request::NewGame { .. } => "new_game",
            Request::ListGames => "list_games",
            Request::JoinGame { .. } => "join_game",
            Request::Move { .. } => "move",
        }
    }

    fn payload(&self) -> Result<Payload, ProtocolError> {
        Ok(match self {
            Request::NewGame { name, public } => Payload::new()
                .with("name", name.as_str())
                .with("public", *public),
            Request::ListGames => Payload::new(),
            Request::JoinGame { game_id, name } => Payload::new()
                .with("game_id", game_id.as_str())
                .with("name", name.as_str()),
            Request::Move {
                player_id,
                row,
                col,
            } => Payload::new()
                .with("player_id", player_id.as_str())
                .with("row", *row as u64)
                .with("col", *col as u64),
        })
    }

    fn table() -> MessageTable<Self> {
        MessageTable::new(Direction::Request)
            .register("new_game", |f| {
                Ok(Request::NewGame {
                    name: f.get("name")?,
                    public: f.get("public")?,
                })
            })
            .register("list_games", |_| Ok(Request::ListGames))
            .register("join_game", |f| {
                Ok(Request::JoinGame {
                    game_id: f.get("game_id")?,
                    name: f.get("name")?,
                })
            })
            .register("move", |f| {
                Ok(Request::Move {
                    player_id: f.get("player_id")?,
                    row: f.get("row")?,
                    col: f.get("col")?,
                })
            })
    }
}

impl WireMessage for Response {
    const DIRECTION: Direction = Direction::Response;

    fn name(&self) -> &'static str {
        match self {
            Response::GameCreated { .. } => "game_created",
            Response::GameList { .. } => "game_list",
            Response::PlayerJoined { .. } => "player_joined",
            Response::MoveMade { .. } => "move_made",
            Response::Rejected { .. } => "rejected",
        }
    }

    fn payload(&self) -> Result<Payload, ProtocolError> {
        match self {
            Response::GameCreated { game_id, player_id } => Ok(Payload::new()
                .with("game_id", game_id.as_str())
                .with("player_id", player_id.as_str())),
            Response::GameList { games } => Payload::new().with_serialized("games", games),
            Response::PlayerJoined {
                game_id,
                player_id,
                name,
            } => Ok(Payload::new()
                .with("game_id", game_id.as_str())
                .with("player_id", player_id.as_str())
                .with("name", name.as_str())),
            Response::MoveMade {
                game_id,
                mark,
                row,
                col,
                outcome,
            } => Ok(Payload::new()
                .with("game_id", game_id.as_str())
                .with("mark", mark.to_string())
                .with("row", *row as u64)
                .with("col", *col as u64)
                .with("outcome", outcome.clone())),
            Response::Rejected { text } => Ok(Payload::new().with("text", text.as_str())),
        }
    }

    fn table() -> MessageTable<Self> {
        MessageTable::new(Direction::Response)
            .register("game_created", |f| {
                Ok(Response::GameCreated {
                    game_id: f.get("game_id")?,
                    player_id: f.get("player_id")?,
                })
            })
            .register("game_list", |f| {
                Ok(Response::GameList {
                    games: f.get("games")?,
                })
            })
            .register("player_joined", |f| {
                Ok(Response::PlayerJoined {
                    game_id: f.get("game_id")?,
                    player_id: f.get("player_id")?,
                    name: f.get("name")?,
                })
            })
            .register("move_made", |f| {
                Ok(Response::MoveMade {
                    game_id: f.get("game_id")?,
                    mark: f.get("mark")?,
                    row: f.get("row")?,
                    col: f.get("col")?,
                    outcome: f.get_opt("outcome")?,
                })
            })
            .register("rejected", |f| {
                Ok(Response::Rejected {
                    text: f.get("text")?,
                })
            })
    }
}

// ---------------------------------------------------------------------------
// Game logic
// ---------------------------------------------------------------------------

struct TicTacToe;

impl GameApp for TicTacToe {
    type State = State;
    type Player = String;
    type Request = Request;
    type Response = Response;

    fn process(registry: &mut AppRegistry<Self>, request: Request) -> Option<Response> {
        let result = match &request {
            Request::NewGame { name, public } => new_game(registry, name, *public),
            Request::ListGames => Ok(Response::GameList {
                games: registry.public_games().to_vec(),
            }),
            Request::JoinGame { game_id, name } => join_game(registry, &request, game_id, name),
            Request::Move {
                player_id,
                row,
                col,
            } => make_move(registry, &request, player_id, *row, *col),
        };
        Some(result.unwrap_or_else(|text| Response::Rejected { text }))
    }

    fn game_of(response: &Response) -> Option<GameId> {
        match response {
            Response::GameCreated { game_id, .. }
            | Response::PlayerJoined { game_id, .. }
            | Response::MoveMade { game_id, .. } => Some(game_id.clone()),
            Response::GameList { .. } | Response::Rejected { .. } => None,
        }
    }

    fn recipient(response: &Response) -> Recipient {
        match response {
            Response::PlayerJoined { .. } | Response::MoveMade { .. } => Recipient::Game,
            _ => Recipient::Origin,
        }
    }

    fn error_response(error: &ProtocolError) -> Option<Response> {
        Some(Response::Rejected {
            text: error.to_string(),
        })
    }
}

fn text(error: SessionError) -> String {
    error.to_string()
}

fn new_game(
    registry: &mut AppRegistry<TicTacToe>,
    name: &str,
    public: bool,
) -> Result<Response, String> {
    let game_id = registry.new_game_id().map_err(text)?;
    let player_id = registry.new_player_id().map_err(text)?;
    registry.add_game(game_id.clone(), State::new(player_id.clone()));
    let info = PlayerInfo::new(game_id.clone(), name.to_owned());
    registry.add_player(player_id.clone(), info).map_err(text)?;
    if public {
        let listing = PublicGame {
            game_id: game_id.clone(),
            player_name: name.to_owned(),
        };
        registry.add_public_game(listing).map_err(text)?;
    }
    Ok(Response::GameCreated { game_id, player_id })
}

fn join_game(
    registry: &mut AppRegistry<TicTacToe>,
    request: &Request,
    game_id: &GameId,
    name: &str,
) -> Result<Response, String> {
    let mut state = registry
        .check_game_mode(game_id, request, |state, _| {
            if state.players.len() < 2 {
                Ok(())
            } else {
                Err("game is full".into())
            }
        })
        .map_err(|e| e.text)?
        .clone();

    let player_id = registry.new_player_id().map_err(text)?;
    state.players.push(player_id.clone());
    registry.update_game(game_id, state).map_err(text)?;
    let info = PlayerInfo::new(game_id.clone(), name.to_owned());
    registry.add_player(player_id.clone(), info).map_err(text)?;
    registry.remove_public_game(game_id);

    Ok(Response::PlayerJoined {
        game_id: game_id.clone(),
        player_id,
        name: name.to_owned(),
    })
}

fn make_move(
    registry: &mut AppRegistry<TicTacToe>,
    request: &Request,
    player_id: &PlayerId,
    row: usize,
    col: usize,
) -> Result<Response, String> {
    let game_id = registry
        .check_player_exists(player_id)
        .map_err(text)?
        .game_id
        .clone();
    let mut state = registry
        .check_game_mode(&game_id, request, |state, _| {
            validate_move(state, player_id, row, col)
        })
        .map_err(|e| e.text)?
        .clone();

    let mark = if state.turn == 0 { Cell::X } else { Cell::O };
    state.board[row][col] = mark;
    if check_winner(&state.board, mark) {
        state.outcome = Some(format!("{} wins", mark.mark()));
    } else if board_full(&state.board) {
        state.outcome = Some("draw".into());
    } else {
        state.turn = 1 - state.turn;
    }

    let outcome = state.outcome.clone();
    registry.update_game(&game_id, state).map_err(text)?;
    if outcome.is_some() {
        registry.update_statistics(|s| {
            s.increment("games_finished");
        });
    }
    Ok(Response::MoveMade {
        game_id,
        mark: mark.mark(),
        row,
        col,
        outcome,
    })
}

fn validate_move(state: &State, sender: &PlayerId, row: usize, col: usize) -> Result<(), String> {
    if state.outcome.is_some() {
        return Err("game is over".into());
    }
    if state.players.len() < 2 {
        return Err("waiting for an opponent".into());
    }
    if &state.players[state.turn] != sender {
        return Err("not your turn".into());
    }
    if row >= 3 || col >= 3 {
        return Err("row and col must be 0-2".into());
    }
    if state.board[row][col] != Cell::Empty {
        return Err("cell is occupied".into());
    }
    Ok(())
}

fn check_winner(b: &[[Cell; 3]; 3], m: Cell) -> bool {
    let rows = (0..3).any(|i| (0..3).all(|j| b[i][j] == m));
    let cols = (0..3).any(|j| (0..3).all(|i| b[i][j] == m));
    let diagonal = (0..3).all(|i| b[i][i] == m);
    let anti_diagonal = (0..3).all(|i| b[i][2 - i] == m);
    rows || cols || diagonal || anti_diagonal
}

fn board_full(b: &[[Cell; 3]; 3]) -> bool {
    b.iter().all(|row| row.iter().all(|c| *c != Cell::Empty))
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("info");
    let bind = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "0.0.0.0:8080".to_string());
    tracing::info!(%bind, "starting tic-tac-toe server");

    let registry = RegistryConfig {
        track_statistics: true,
        ..RegistryConfig::default()
    };
    let server = HubServerBuilder::new()
        .bind(&bind)
        .router_config(RouterConfig::default().with_registry(registry))
        .build::<TicTacToe>()
        .await?;

    server.run().await?;
    Ok(())
}
