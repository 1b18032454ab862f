//! Networked [`ServerLink`]: a WebSocket client speaking the wire format.
//!
//! Client code written against `ServerLink` runs unchanged against a
//! [`ProxyServer`](hubforge_router::ProxyServer) in tests and against a real
//! server through this link.

use std::io;

use futures_util::{SinkExt, StreamExt};
use hubforge_protocol::MessageCodec;
use hubforge_router::{GameApp, LinkError, ServerLink};
use hubforge_transport::TransportError;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type ClientWs = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A client connection to a Hubforge server for application `A`.
pub struct WebSocketLink<A: GameApp> {
    ws: ClientWs,
    requests: MessageCodec<A::Request>,
    responses: MessageCodec<A::Response>,
}

impl<A: GameApp> WebSocketLink<A> {
    /// Connects to `url` (e.g. `ws://127.0.0.1:8080`).
    pub async fn connect(url: &str) -> Result<Self, LinkError> {
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| TransportError::ConnectionClosed(e.to_string()))?;
        tracing::debug!(url, "link connected");
        Ok(Self {
            ws,
            requests: MessageCodec::new(),
            responses: MessageCodec::new(),
        })
    }

    /// Closes the connection.
    pub async fn close(&mut self) -> Result<(), LinkError> {
        self.ws.close(None).await.map_err(send_error)?;
        Ok(())
    }
}

impl<A: GameApp> ServerLink for WebSocketLink<A> {
    type Request = A::Request;
    type Response = A::Response;

    async fn send(&mut self, request: A::Request) -> Result<(), LinkError> {
        let text = self.requests.encode_text(&request)?;
        self.ws
            .send(Message::Text(text.into()))
            .await
            .map_err(send_error)?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<A::Response> {
        loop {
            let text = match self.ws.next().await? {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => {
                    tracing::debug!(error = %e, "link recv error");
                    return None;
                }
            };
            match self.responses.decode_text(text.as_str()) {
                Ok(response) => return Some(response),
                Err(e) => tracing::warn!(error = %e, "undecodable response dropped"),
            }
        }
    }
}

fn send_error(e: tokio_tungstenite::tungstenite::Error) -> TransportError {
    TransportError::SendFailed(io::Error::new(io::ErrorKind::BrokenPipe, e))
}

impl<A: GameApp> std::fmt::Debug for WebSocketLink<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketLink").finish_non_exhaustive()
    }
}
