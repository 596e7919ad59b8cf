//! Game core: countdown, answer evaluation, session transitions and scoring.

pub mod countdown;
pub mod evaluator;
pub mod score;
pub mod session;

pub use countdown::{Countdown, Tick};
pub use evaluator::{QuestionAttempt, Verdict, evaluate};
pub use score::{Grade, ScoreSummary};
pub use session::{Action, Effect, InvalidTransition, Phase, Session};

use thiserror::Error;

/// Seconds each question starts with.
pub const DEFAULT_QUESTION_SECONDS: u32 = 30;
/// Points awarded for each correct answer.
pub const DEFAULT_POINTS_PER_CORRECT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("question_seconds must be greater than zero")]
    ZeroSeconds,
    #[error("points_per_correct must be greater than zero")]
    ZeroPoints,
    #[error("{levels} levels at {points} points each overflows the score")]
    ScoreOverflow { levels: usize, points: u32 },
}

/// Tunables for a play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub question_seconds: u32,
    pub points_per_correct: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            question_seconds: DEFAULT_QUESTION_SECONDS,
            points_per_correct: DEFAULT_POINTS_PER_CORRECT,
        }
    }
}

impl Rules {
    /// Reject rules a catalog of `levels` puzzles cannot be played with.
    pub fn validate(&self, levels: usize) -> Result<(), RulesError> {
        if self.question_seconds == 0 {
            return Err(RulesError::ZeroSeconds);
        }
        if self.points_per_correct == 0 {
            return Err(RulesError::ZeroPoints);
        }
        let overflow = RulesError::ScoreOverflow {
            levels,
            points: self.points_per_correct,
        };
        let levels = u32::try_from(levels).map_err(|_| overflow.clone())?;
        levels
            .checked_mul(self.points_per_correct)
            .map(|_| ())
            .ok_or(overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        assert_eq!(Rules::default().validate(8), Ok(()));
    }

    #[test]
    fn test_rules_rejected() {
        let zero_seconds = Rules {
            question_seconds: 0,
            ..Rules::default()
        };
        assert_eq!(zero_seconds.validate(2), Err(RulesError::ZeroSeconds));

        let zero_points = Rules {
            points_per_correct: 0,
            ..Rules::default()
        };
        assert_eq!(zero_points.validate(2), Err(RulesError::ZeroPoints));

        let huge = Rules {
            points_per_correct: u32::MAX,
            ..Rules::default()
        };
        assert_eq!(huge.validate(1), Ok(()));
        assert_eq!(
            huge.validate(2),
            Err(RulesError::ScoreOverflow {
                levels: 2,
                points: u32::MAX
            })
        );
    }
}
