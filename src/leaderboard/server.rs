//! WebSocket host for the shared leaderboard.
//!
//! Every connection may submit runs and fetch the ranking; every connection
//! also receives a `Changed` message whenever an entry is recorded.

use std::io;
use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::protocol::{ClientMessage, MAX_FETCH_LIMIT, ServerMessage};

use super::gateway::LeaderboardGateway;
use super::memory::MemoryLeaderboard;

/// Accept leaderboard clients on `listener` until the task is cancelled.
pub async fn serve(listener: TcpListener, store: MemoryLeaderboard) -> io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "leaderboard host listening");

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tokio::spawn(handle_connection(stream, peer, store.clone()));
            }
            Err(err) => {
                warn!(error = %err, "failed to accept connection");
            }
        }
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(stream: TcpStream, peer: SocketAddr, store: MemoryLeaderboard) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(err) => {
            warn!(%peer, error = %err, "websocket handshake failed");
            return;
        }
    };
    info!(%peer, "leaderboard client connected");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to encode server message");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut subscription = store.subscribe();
    let notice_tx = tx.clone();
    let notify_task = tokio::spawn(async move {
        while subscription.recv().await.is_some() {
            if notice_tx.send(ServerMessage::Changed).is_err() {
                break;
            }
        }
    });

    let _ = tx.send(ServerMessage::ConnectionAck);

    while let Some(msg) = ws_receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) => break,
            Err(err) => {
                debug!(%peer, error = %err, "websocket receive failed");
                break;
            }
            _ => continue,
        };

        let client_msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(err) => {
                debug!(%peer, error = %err, "ignoring malformed client message");
                continue;
            }
        };

        let reply = handle_client_message(client_msg, &store).await;
        if tx.send(reply).is_err() {
            break;
        }
    }

    notify_task.abort();
    send_task.abort();
    info!(%peer, "leaderboard client disconnected");
}

async fn handle_client_message(msg: ClientMessage, store: &MemoryLeaderboard) -> ServerMessage {
    match msg {
        ClientMessage::Submit {
            request_id,
            submission,
        } => match store.submit(submission).await {
            Ok(entry) => ServerMessage::Submitted { request_id, entry },
            Err(err) => {
                warn!(error = %err, "rejected leaderboard submission");
                ServerMessage::SubmitRejected {
                    request_id,
                    reason: err.to_string(),
                }
            }
        },
        ClientMessage::FetchTop { request_id, limit } => ServerMessage::Top {
            request_id,
            entries: store.top(limit.min(MAX_FETCH_LIMIT)).await,
        },
    }
}
