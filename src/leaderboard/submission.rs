use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::engine::ScoreSummary;

/// Longest display name accepted, counted in characters after trimming.
pub const PLAYER_NAME_MAX_LENGTH: usize = 50;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("invalid submission: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// A finished run ready to be appended to the leaderboard.
///
/// Built through [`ScoreSubmission::new`], which trims and checks the name;
/// submissions decoded from the wire are re-checked with [`check`](Self::check).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ScoreSubmission {
    #[validate(length(min = 1, max = 50))]
    player_name: String,
    score: u32,
    #[validate(range(min = 1))]
    total_levels: u32,
    #[validate(range(max = 100))]
    completion_percentage: u8,
}

impl ScoreSubmission {
    pub fn new(player_name: &str, summary: &ScoreSummary) -> Result<Self, SubmissionError> {
        let submission = Self {
            player_name: player_name.trim().to_string(),
            score: summary.score,
            total_levels: summary.total_levels,
            completion_percentage: summary.accuracy_percentage,
        };
        submission.check()?;
        Ok(submission)
    }

    pub fn check(&self) -> Result<(), SubmissionError> {
        let trimmed = self.player_name.trim();
        if trimmed.is_empty() {
            return Err(SubmissionError::EmptyName);
        }
        if trimmed.chars().count() > PLAYER_NAME_MAX_LENGTH {
            return Err(SubmissionError::NameTooLong {
                max: PLAYER_NAME_MAX_LENGTH,
            });
        }
        self.validate()?;
        Ok(())
    }

    /// Trim the name and re-run every check. Used for submissions decoded
    /// from the wire before they are stored.
    pub fn normalized(mut self) -> Result<Self, SubmissionError> {
        self.player_name = self.player_name.trim().to_string();
        self.check()?;
        Ok(self)
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_levels(&self) -> u32 {
        self.total_levels
    }

    pub fn completion_percentage(&self) -> u8 {
        self.completion_percentage
    }
}
