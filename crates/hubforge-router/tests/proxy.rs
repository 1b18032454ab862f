//! Integration tests for the in-process proxy.

mod common;

use std::time::Duration;

use common::{Lobby, LobbyRequest, LobbyResponse, Phase, QuietLobby, RecordingOutbox, sock, wire};
use hubforge_router::{ProxyServer, Router, RouterConfig, ServerLink};
use hubforge_session::{ChangeLog, RegistryConfig};
use hubforge_transport::TransportEvent;

fn proxy() -> ProxyServer<Lobby> {
    ProxyServer::new(RegistryConfig {
        seed: Some(5),
        ..RegistryConfig::default()
    })
}

/// Client code that only knows about `ServerLink`.
async fn create_via<L>(link: &mut L) -> Option<L::Response>
where
    L: ServerLink<Request = LobbyRequest>,
{
    link.send(LobbyRequest::Create { name: "ada".into() }).await.ok()?;
    link.recv().await
}

#[tokio::test]
async fn test_send_then_recv_delivers_response() {
    let mut p = proxy();

    let response = create_via(&mut p).await;

    let Some(LobbyResponse::Created { game_id, player_id }) = response.clone() else {
        panic!("expected Created, got {response:?}");
    };
    assert!(p.registry().get_game(&game_id).is_some());
    assert_eq!(p.registry().players_of(&game_id), &[player_id]);
}

#[tokio::test]
async fn test_response_not_delivered_inside_send() {
    let mut p = proxy();

    p.submit(LobbyRequest::Create { name: "ada".into() }).unwrap();

    // Queued, and readable exactly once.
    assert!(matches!(p.try_recv(), Some(LobbyResponse::Created { .. })));
    assert!(p.try_recv().is_none());
}

#[tokio::test]
async fn test_silent_update_queues_nothing() {
    let mut p = proxy();
    p.submit(LobbyRequest::Create { name: "ada".into() }).unwrap();
    let Some(LobbyResponse::Created { game_id, .. }) = p.try_recv() else {
        panic!("expected Created");
    };

    p.send(LobbyRequest::Close {
        game_id: game_id.clone(),
    })
    .await
    .unwrap();

    assert!(p.try_recv().is_none());
    assert_eq!(p.registry().get_game(&game_id).unwrap().phase, Phase::Closed);
}

#[tokio::test]
async fn test_round_trip_failure_replies_error_and_restores_registry() {
    let mut p = proxy();
    p.submit(LobbyRequest::Create { name: "ada".into() }).unwrap();
    let Some(LobbyResponse::Created { game_id, .. }) = p.try_recv() else {
        panic!("expected Created");
    };

    p.send(LobbyRequest::Corrupt {
        game_id: game_id.clone(),
    })
    .await
    .unwrap();

    assert_eq!(
        p.try_recv(),
        Some(LobbyResponse::Error {
            text: "round trip changed response message glitch".into(),
        })
    );
    assert_eq!(p.registry().get_game(&game_id).unwrap().glitches, 0);
}

#[tokio::test]
async fn test_round_trip_failure_matches_router_reply() {
    let mut p = proxy();
    p.submit(LobbyRequest::Create { name: "ada".into() }).unwrap();
    let Some(LobbyResponse::Created { game_id, .. }) = p.try_recv() else {
        panic!("expected Created");
    };
    let mut r: Router<Lobby> = Router::new(RouterConfig::default());
    let mut out = RecordingOutbox::default();
    r.handle(TransportEvent::Connected(sock(1)), &mut out);
    let create = LobbyRequest::Create { name: "ada".into() };
    r.handle(TransportEvent::MessageReceived(sock(1), wire(&create)), &mut out);
    let Some(LobbyResponse::Created { game_id: routed_id, .. }) = out.received_by(sock(1)).pop()
    else {
        panic!("expected Created");
    };
    out.clear();

    p.submit(LobbyRequest::Corrupt { game_id }).unwrap();
    let corrupt = LobbyRequest::Corrupt { game_id: routed_id };
    r.handle(TransportEvent::MessageReceived(sock(1), wire(&corrupt)), &mut out);

    let via_proxy: Vec<_> = p.try_recv().into_iter().collect();
    assert_eq!(via_proxy, out.received_by(sock(1)));
    assert_eq!(via_proxy.len(), 1);
}

#[tokio::test]
async fn test_quiet_app_round_trip_failure_queues_nothing() {
    let mut p: ProxyServer<QuietLobby> = ProxyServer::new(RegistryConfig::default());
    p.submit(LobbyRequest::Create { name: "ada".into() }).unwrap();
    let Some(LobbyResponse::Created { game_id, .. }) = p.try_recv() else {
        panic!("expected Created");
    };

    let result = p.submit(LobbyRequest::Corrupt { game_id });

    assert!(result.is_ok());
    assert!(p.try_recv().is_none());
}

#[tokio::test]
async fn test_change_log_drained_after_each_request() {
    let mut p = proxy();

    for name in ["a", "b", "c"] {
        p.submit(LobbyRequest::Create { name: name.into() }).unwrap();
    }

    assert_eq!(p.registry().game_count(), 3);
    assert!(p.registry().changes().is_none_or(ChangeLog::is_empty));
}

#[tokio::test]
async fn test_recv_after_silent_update_waits() {
    let mut p = proxy();
    p.submit(LobbyRequest::Create { name: "ada".into() }).unwrap();
    let Some(LobbyResponse::Created { game_id, .. }) = p.recv().await else {
        panic!("expected Created");
    };

    p.send(LobbyRequest::Close { game_id }).await.unwrap();

    let waited = tokio::time::timeout(Duration::from_millis(20), p.recv()).await;
    assert!(waited.is_err());
}

#[tokio::test]
async fn test_responses_arrive_in_order() {
    let mut p = proxy();
    p.submit(LobbyRequest::Create { name: "a".into() }).unwrap();
    p.submit(LobbyRequest::Create { name: "b".into() }).unwrap();

    let first = p.recv().await;
    let second = p.recv().await;

    assert!(matches!(first, Some(LobbyResponse::Created { .. })));
    assert!(matches!(second, Some(LobbyResponse::Created { .. })));
    assert_ne!(first, second);
    assert_eq!(p.registry().game_count(), 2);
}
