//! Protocol messages between a player and the hosted leaderboard.
//!
//! All messages are serialized as JSON over WebSocket.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::leaderboard::ScoreSubmission;
use crate::models::LeaderboardEntry;

/// Messages sent from a player to the leaderboard host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Append a finished run.
    Submit {
        request_id: Uuid,
        submission: ScoreSubmission,
    },

    /// Ask for the best `limit` entries.
    FetchTop { request_id: Uuid, limit: usize },
}

/// Messages sent from the leaderboard host to players.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Connection accepted.
    ConnectionAck,

    /// Submission stored.
    Submitted {
        request_id: Uuid,
        entry: LeaderboardEntry,
    },

    /// Submission refused (invalid name, out-of-range values).
    SubmitRejected { request_id: Uuid, reason: String },

    /// Ranked entries for a `FetchTop` request.
    Top {
        request_id: Uuid,
        entries: Vec<LeaderboardEntry>,
    },

    /// The stored leaderboard changed; clients should re-fetch.
    Changed,
}

impl ServerMessage {
    /// Id of the request this message answers, if it answers one.
    pub fn request_id(&self) -> Option<Uuid> {
        match self {
            ServerMessage::Submitted { request_id, .. }
            | ServerMessage::SubmitRejected { request_id, .. }
            | ServerMessage::Top { request_id, .. } => Some(*request_id),
            ServerMessage::ConnectionAck | ServerMessage::Changed => None,
        }
    }
}

/// Default leaderboard host port.
pub const DEFAULT_PORT: u16 = 8713;

/// Largest page the host will return for a single `FetchTop`.
pub const MAX_FETCH_LIMIT: usize = 50;
