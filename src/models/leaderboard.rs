use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::leaderboard::ScoreSubmission;

/// A completed run as stored by the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub player_name: String,
    pub score: u32,
    pub total_levels: u32,
    pub completion_percentage: u8,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
}

impl LeaderboardEntry {
    /// Stamp a submission with a fresh id and its completion time.
    pub fn record(submission: &ScoreSubmission, completed_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_name: submission.player_name().to_string(),
            score: submission.score(),
            total_levels: submission.total_levels(),
            completion_percentage: submission.completion_percentage(),
            completed_at,
        }
    }
}

/// Leaderboard order: higher score first, earlier completion breaks ties.
pub fn compare_entries(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.completed_at.cmp(&b.completed_at))
}

/// Sort in leaderboard order and keep the first `limit` entries.
pub fn rank_entries(mut entries: Vec<LeaderboardEntry>, limit: usize) -> Vec<LeaderboardEntry> {
    entries.sort_by(compare_entries);
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn entry(name: &str, score: u32, offset_secs: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            id: Uuid::new_v4(),
            player_name: name.to_string(),
            score,
            total_levels: 5,
            completion_percentage: 0,
            completed_at: OffsetDateTime::UNIX_EPOCH + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn test_rank_orders_by_score_then_completion_time() {
        let ranked = rank_entries(
            vec![
                entry("late-forty", 40, 30),
                entry("ten", 10, 0),
                entry("early-forty", 40, 10),
                entry("fifty", 50, 99),
            ],
            10,
        );
        let names: Vec<_> = ranked.iter().map(|e| e.player_name.as_str()).collect();
        assert_eq!(names, ["fifty", "early-forty", "late-forty", "ten"]);
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let entries = (0..15).map(|i| entry("p", i, i as i64)).collect();
        let ranked = rank_entries(entries, 10);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].score, 14);
        assert_eq!(ranked[9].score, 5);
    }

    #[test]
    fn test_entry_serializes_timestamp_as_rfc3339() {
        let json = serde_json::to_string(&entry("ada", 20, 0)).unwrap();
        assert!(json.contains("\"completed_at\":\"1970-01-01T00:00:00Z\""));
        let back: LeaderboardEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.completed_at, OffsetDateTime::UNIX_EPOCH);
    }
}
