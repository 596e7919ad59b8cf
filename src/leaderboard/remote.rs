//! WebSocket client for the hosted leaderboard.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::LeaderboardEntry;
use crate::protocol::{ClientMessage, ServerMessage};

use super::gateway::{ChangeNotice, GatewayError, GatewayResult, LeaderboardGateway, Subscription};
use super::submission::ScoreSubmission;

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Requests waiting for their reply, keyed by request id.
type Pending = Arc<Mutex<HashMap<Uuid, oneshot::Sender<ServerMessage>>>>;

/// Leaderboard reached over WebSocket.
///
/// The connection is opened on first use and reopened after it drops, so a
/// host that is briefly down only fails the requests made meanwhile.
#[derive(Clone)]
pub struct RemoteLeaderboard {
    inner: Arc<Inner>,
}

struct Inner {
    url: String,
    request_timeout: Duration,
    connection: Mutex<Option<Connection>>,
    pending: Pending,
    changes: broadcast::Sender<ChangeNotice>,
}

struct Connection {
    outgoing: mpsc::UnboundedSender<ClientMessage>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl Connection {
    fn is_alive(&self) -> bool {
        !self.reader.is_finished() && !self.writer.is_finished()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

impl RemoteLeaderboard {
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Self {
        let (changes, _receiver) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                url: url.into(),
                request_timeout,
                connection: Mutex::new(None),
                pending: Arc::new(Mutex::new(HashMap::new())),
                changes,
            }),
        }
    }

    /// Open the connection now instead of on the first request.
    pub async fn connect(&self) -> GatewayResult<()> {
        self.inner.outgoing().await.map(|_| ())
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }
}

impl Inner {
    async fn outgoing(&self) -> GatewayResult<mpsc::UnboundedSender<ClientMessage>> {
        let mut connection = self.connection.lock().await;
        if let Some(existing) = connection.as_ref() {
            if existing.is_alive() {
                return Ok(existing.outgoing.clone());
            }
            debug!(url = %self.url, "leaderboard connection lost; reconnecting");
        }

        let fresh = self.open().await?;
        let outgoing = fresh.outgoing.clone();
        *connection = Some(fresh);
        Ok(outgoing)
    }

    async fn open(&self) -> GatewayResult<Connection> {
        let (ws_stream, _) = timeout(self.request_timeout, connect_async(self.url.as_str()))
            .await
            .map_err(|_| GatewayError::Timeout)?
            .map_err(|err| GatewayError::Unavailable(err.to_string()))?;
        info!(url = %self.url, "connected to leaderboard");

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<ClientMessage>();

        let writer = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(err) => {
                        warn!(error = %err, "failed to encode leaderboard request");
                        continue;
                    }
                };
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        });

        let pending = Arc::clone(&self.pending);
        let changes = self.changes.clone();
        let reader = tokio::spawn(async move {
            while let Some(msg) = ws_receiver.next().await {
                let text = match msg {
                    Ok(Message::Text(text)) => text.to_string(),
                    Ok(Message::Close(_)) => break,
                    Err(err) => {
                        warn!(error = %err, "leaderboard connection error");
                        break;
                    }
                    _ => continue,
                };

                match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(server_msg) => dispatch(server_msg, &pending, &changes).await,
                    Err(err) => debug!(error = %err, "ignoring malformed leaderboard message"),
                }
            }

            // Fail every request still waiting on this connection.
            pending.lock().await.clear();
            info!("leaderboard connection closed");
            // Changes pushed while disconnected are lost; subscribers
            // re-fetch, which also reopens the connection.
            if changes.receiver_count() > 0 {
                let _ = changes.send(ChangeNotice);
            }
        });

        Ok(Connection {
            outgoing: tx,
            reader,
            writer,
        })
    }

    async fn request(
        &self,
        build: impl FnOnce(Uuid) -> ClientMessage,
    ) -> GatewayResult<ServerMessage> {
        let outgoing = self.outgoing().await?;
        let request_id = Uuid::new_v4();
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.lock().await.insert(request_id, reply_tx);

        if outgoing.send(build(request_id)).is_err() {
            self.pending.lock().await.remove(&request_id);
            return Err(GatewayError::Disconnected);
        }

        match timeout(self.request_timeout, reply_rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(GatewayError::Disconnected),
            Err(_) => {
                self.pending.lock().await.remove(&request_id);
                Err(GatewayError::Timeout)
            }
        }
    }
}

async fn dispatch(msg: ServerMessage, pending: &Pending, changes: &broadcast::Sender<ChangeNotice>) {
    match msg.request_id() {
        Some(request_id) => {
            let waiter = pending.lock().await.remove(&request_id);
            match waiter {
                Some(waiter) => {
                    let _ = waiter.send(msg);
                }
                None => debug!(%request_id, "dropping reply for unknown request"),
            }
        }
        None => {
            if matches!(msg, ServerMessage::Changed) {
                let _ = changes.send(ChangeNotice);
            }
        }
    }
}

impl LeaderboardGateway for RemoteLeaderboard {
    fn submit(&self, submission: ScoreSubmission) -> BoxFuture<'static, GatewayResult<LeaderboardEntry>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let reply = inner
                .request(|request_id| ClientMessage::Submit {
                    request_id,
                    submission,
                })
                .await?;
            match reply {
                ServerMessage::Submitted { entry, .. } => Ok(entry),
                ServerMessage::SubmitRejected { reason, .. } => Err(GatewayError::Rejected(reason)),
                _ => Err(GatewayError::UnexpectedResponse),
            }
        })
    }

    fn fetch_top(&self, limit: usize) -> BoxFuture<'static, GatewayResult<Vec<LeaderboardEntry>>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let reply = inner
                .request(|request_id| ClientMessage::FetchTop { request_id, limit })
                .await?;
            match reply {
                ServerMessage::Top { entries, .. } => Ok(entries),
                _ => Err(GatewayError::UnexpectedResponse),
            }
        })
    }

    fn subscribe(&self) -> Subscription {
        Subscription::new(self.inner.changes.subscribe())
    }
}
