//! The `GameApp` trait: the extension point for applications.
//!
//! An application supplies its message vocabulary and one processing
//! function. The router decodes requests, hands them to
//! [`GameApp::process`] together with the registry, and routes whatever
//! comes back.

use hubforge_protocol::{GameId, ProtocolError, WireMessage};
use hubforge_session::SessionRegistry;

/// The registry type an application works with.
pub type AppRegistry<A> = SessionRegistry<<A as GameApp>::State, <A as GameApp>::Player>;

/// Who receives a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Only the socket that sent the request.
    Origin,
    /// Every socket bound to the response's game, the sender included.
    Game,
    /// Every socket bound to the response's game except the sender.
    GameExceptOrigin,
}

/// The trait applications implement.
///
/// Associated types:
/// - `State`: per-game data kept in the registry (board, phase, scores...)
/// - `Player`: per-player data (display name, seat...)
/// - `Request` / `Response`: the two message vocabularies
///
/// All methods are associated functions. The application holds no state of
/// its own; everything lives in the registry, which is what lets the router
/// snapshot and restore it.
pub trait GameApp: Send + Sync + 'static {
    /// Per-game state. `Clone` so the registry can be snapshotted.
    type State: Clone + Send + 'static;

    /// Per-player payload.
    type Player: Clone + Send + 'static;

    /// Client → server messages.
    type Request: WireMessage + Send;

    /// Server → client messages.
    type Response: WireMessage + Send;

    /// Applies one request to the registry.
    ///
    /// Returning `None` means a silent update: nothing is sent back.
    /// Rejections are ordinary responses (usually built from a
    /// `ValidationError`), not errors.
    fn process(
        registry: &mut AppRegistry<Self>,
        request: Self::Request,
    ) -> Option<Self::Response>;

    /// The game a response belongs to.
    ///
    /// When this names a live game, the origin socket is bound to it before
    /// the response is delivered. Default: no game.
    fn game_of(_response: &Self::Response) -> Option<GameId> {
        None
    }

    /// Who should receive a response. Default: the origin only.
    ///
    /// `Game` and `GameExceptOrigin` fall back to the origin when
    /// [`game_of`](Self::game_of) names no game.
    fn recipient(_response: &Self::Response) -> Recipient {
        Recipient::Origin
    }

    /// Wraps a protocol failure for the client.
    ///
    /// Called when a request cannot be decoded or fails round-trip
    /// validation. Return `None` (the default) to drop such requests
    /// silently.
    fn error_response(_error: &ProtocolError) -> Option<Self::Response> {
        None
    }
}
