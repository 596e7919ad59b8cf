//! Session state machine: Welcome -> Playing -> Victory, reset via play-again.
//!
//! Every transition mutates the session in place and reports what happened
//! as a list of [`Effect`]s for the caller to act on (restart the ticker,
//! show a notice, offer score submission).

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Catalog, Puzzle};

use super::Rules;
use super::evaluator::{QuestionAttempt, Verdict};
use super::score::ScoreSummary;

/// Which screen the session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Welcome,
    Playing,
    Victory,
}

/// Player-initiated actions, used to describe rejected transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    SelectAnswer(usize),
    Advance,
}

/// Something observable that a transition produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// A new question is live; its countdown starts now.
    QuestionStarted { level: usize },
    /// The current question was resolved; `points` were added to the score.
    AnswerResolved { verdict: Verdict, points: u32 },
    /// The last level was cleared.
    Victory(ScoreSummary),
    /// All session fields went back to their defaults.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {action:?} cannot be applied while in {phase:?}")]
pub struct InvalidTransition {
    pub phase: Phase,
    pub action: Action,
}

pub type TransitionResult = Result<Vec<Effect>, InvalidTransition>;

pub struct Session {
    catalog: Arc<Catalog>,
    rules: Rules,
    phase: Phase,
    level: usize,
    score: u32,
    awaiting_advance: bool,
    attempt: QuestionAttempt,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>, rules: Rules) -> Self {
        Self {
            catalog,
            rules,
            phase: Phase::Welcome,
            level: 0,
            score: 0,
            awaiting_advance: false,
            attempt: QuestionAttempt::default(),
        }
    }

    pub fn start(&mut self) -> TransitionResult {
        if self.phase != Phase::Welcome {
            return Err(self.reject(Action::Start));
        }

        self.phase = Phase::Playing;
        self.level = 0;
        self.score = 0;
        self.awaiting_advance = false;
        info!(levels = self.catalog.len(), "session started");
        Ok(vec![self.begin_question()])
    }

    pub fn select_answer(&mut self, index: usize) -> TransitionResult {
        if self.phase != Phase::Playing {
            return Err(self.reject(Action::SelectAnswer(index)));
        }

        let Some(puzzle) = self.catalog.get(self.level) else {
            return Ok(Vec::new());
        };
        let verdict = self.attempt.select(puzzle, index);
        Ok(verdict.map(|v| self.on_answer(v)).into_iter().collect())
    }

    /// One elapsed second. Only a live question in `Playing` reacts.
    pub fn tick(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Playing {
            return Vec::new();
        }

        let Some(puzzle) = self.catalog.get(self.level) else {
            return Vec::new();
        };
        let verdict = self.attempt.tick(puzzle);
        verdict.map(|v| self.on_answer(v)).into_iter().collect()
    }

    pub fn advance(&mut self) -> TransitionResult {
        if self.phase != Phase::Playing || !self.awaiting_advance {
            return Err(self.reject(Action::Advance));
        }

        self.awaiting_advance = false;
        if self.level + 1 < self.catalog.len() {
            self.level += 1;
            debug!(level = self.level, "advanced to next level");
            return Ok(vec![self.begin_question()]);
        }

        self.phase = Phase::Victory;
        let summary = self.summary();
        info!(
            score = summary.score,
            accuracy = summary.accuracy_percentage,
            "session completed"
        );
        Ok(vec![Effect::Victory(summary)])
    }

    /// Hard reset back to the welcome screen, valid from any phase.
    pub fn play_again(&mut self) -> Vec<Effect> {
        self.phase = Phase::Welcome;
        self.level = 0;
        self.score = 0;
        self.awaiting_advance = false;
        self.attempt = QuestionAttempt::default();
        debug!("session reset");
        vec![Effect::Reset]
    }

    fn on_answer(&mut self, verdict: Verdict) -> Effect {
        let points = if verdict.is_correct {
            self.score = self.score.saturating_add(self.rules.points_per_correct);
            self.awaiting_advance = true;
            self.rules.points_per_correct
        } else {
            0
        };
        debug!(
            level = self.level,
            correct = verdict.is_correct,
            timed_out = verdict.timed_out,
            score = self.score,
            "question resolved"
        );
        Effect::AnswerResolved { verdict, points }
    }

    fn begin_question(&mut self) -> Effect {
        self.attempt = QuestionAttempt::begin(self.rules.question_seconds);
        Effect::QuestionStarted { level: self.level }
    }

    fn reject(&self, action: Action) -> InvalidTransition {
        debug!(phase = ?self.phase, ?action, "rejected transition");
        InvalidTransition {
            phase: self.phase,
            action,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_level(&self) -> usize {
        self.level
    }

    pub fn total_levels(&self) -> usize {
        self.catalog.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn awaiting_advance(&self) -> bool {
        self.awaiting_advance
    }

    pub fn attempt(&self) -> &QuestionAttempt {
        &self.attempt
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn current_puzzle(&self) -> Option<&Puzzle> {
        match self.phase {
            Phase::Playing => self.catalog.get(self.level),
            Phase::Welcome | Phase::Victory => None,
        }
    }

    pub fn summary(&self) -> ScoreSummary {
        let total_levels = u32::try_from(self.catalog.len()).unwrap_or(u32::MAX);
        ScoreSummary::new(self.score, total_levels, self.rules.points_per_correct)
    }
}
