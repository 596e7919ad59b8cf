//! Global leaderboard: gateway contract, score submission and backends.

mod gateway;
mod memory;
mod remote;
pub mod server;
mod submission;

pub use gateway::{ChangeNotice, GatewayError, GatewayResult, LeaderboardGateway, Subscription};
pub use memory::MemoryLeaderboard;
pub use remote::RemoteLeaderboard;
pub use submission::{PLAYER_NAME_MAX_LENGTH, ScoreSubmission, SubmissionError};

/// Number of entries shown on the leaderboard.
pub const DEFAULT_TOP_N: usize = 10;
