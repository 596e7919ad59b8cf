mod leaderboard;
mod puzzle;

pub use leaderboard::{LeaderboardEntry, compare_entries, rank_entries};
pub use puzzle::{Catalog, CatalogError, Puzzle};
