use std::sync::Arc;

use futures_util::future::BoxFuture;
use time::OffsetDateTime;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info};

use crate::models::{LeaderboardEntry, rank_entries};

use super::gateway::{ChangeNotice, GatewayResult, LeaderboardGateway, Subscription};
use super::submission::ScoreSubmission;

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Leaderboard kept in process memory.
///
/// Backs offline play and the hosted leaderboard service. Cloning shares the
/// same entries and change channel.
#[derive(Clone)]
pub struct MemoryLeaderboard {
    entries: Arc<Mutex<Vec<LeaderboardEntry>>>,
    changes: broadcast::Sender<ChangeNotice>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::with_entries(Vec::new())
    }

    pub fn with_entries(entries: Vec<LeaderboardEntry>) -> Self {
        let (changes, _receiver) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            entries: Arc::new(Mutex::new(entries)),
            changes,
        }
    }

    pub async fn insert(&self, submission: &ScoreSubmission) -> LeaderboardEntry {
        let entry = LeaderboardEntry::record(submission, OffsetDateTime::now_utc());
        let total = {
            let mut entries = self.entries.lock().await;
            entries.push(entry.clone());
            entries.len()
        };
        info!(
            player = %entry.player_name,
            score = entry.score,
            total,
            "leaderboard entry recorded"
        );
        // Nobody listening is fine.
        let _ = self.changes.send(ChangeNotice);
        entry
    }

    pub async fn top(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let entries = self.entries.lock().await.clone();
        rank_entries(entries, limit)
    }

    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }
}

impl Default for MemoryLeaderboard {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardGateway for MemoryLeaderboard {
    fn submit(&self, submission: ScoreSubmission) -> BoxFuture<'static, GatewayResult<LeaderboardEntry>> {
        let store = self.clone();
        Box::pin(async move {
            let submission = submission.normalized()?;
            Ok(store.insert(&submission).await)
        })
    }

    fn fetch_top(&self, limit: usize) -> BoxFuture<'static, GatewayResult<Vec<LeaderboardEntry>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.top(limit).await) })
    }

    fn subscribe(&self) -> Subscription {
        debug!(subscribers = self.changes.receiver_count() + 1, "leaderboard subscriber added");
        Subscription::new(self.changes.subscribe())
    }
}
