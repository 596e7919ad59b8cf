use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::models::LeaderboardEntry;

use super::submission::{ScoreSubmission, SubmissionError};

/// Result alias for leaderboard operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error raised by a leaderboard backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("leaderboard unavailable: {0}")]
    Unavailable(String),
    #[error("leaderboard request timed out")]
    Timeout,
    #[error("leaderboard connection closed")]
    Disconnected,
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("unexpected leaderboard response")]
    UnexpectedResponse,
}

impl From<SubmissionError> for GatewayError {
    fn from(err: SubmissionError) -> Self {
        GatewayError::Rejected(err.to_string())
    }
}

/// Signal that the stored leaderboard changed and should be re-fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeNotice;

/// Ranked score storage shared by every player.
pub trait LeaderboardGateway: Send + Sync {
    /// Append a finished run. The stored entry carries its id and timestamp.
    fn submit(&self, submission: ScoreSubmission) -> BoxFuture<'static, GatewayResult<LeaderboardEntry>>;
    /// Best `limit` entries: score descending, earlier completion first on ties.
    fn fetch_top(&self, limit: usize) -> BoxFuture<'static, GatewayResult<Vec<LeaderboardEntry>>>;
    /// Register for change notices until the returned handle is dropped.
    fn subscribe(&self) -> Subscription;
}

/// Live registration for leaderboard change notices.
pub struct Subscription {
    receiver: broadcast::Receiver<ChangeNotice>,
}

impl Subscription {
    pub fn new(receiver: broadcast::Receiver<ChangeNotice>) -> Self {
        Self { receiver }
    }

    /// Wait for the next change. `None` once the backend is gone.
    pub async fn recv(&mut self) -> Option<ChangeNotice> {
        match self.receiver.recv().await {
            Ok(notice) => Some(notice),
            // Missed notices still mean the list changed.
            Err(RecvError::Lagged(_)) => Some(ChangeNotice),
            Err(RecvError::Closed) => None,
        }
    }

    pub fn unsubscribe(self) {}
}
