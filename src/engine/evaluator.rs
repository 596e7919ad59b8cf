use tracing::debug;

use crate::models::Puzzle;

use super::countdown::{Countdown, Tick};

/// Result of resolving a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub is_correct: bool,
    /// The question was resolved by the countdown rather than a selection.
    pub timed_out: bool,
}

/// Judge a selection. `None` means the countdown ran out and is never correct.
pub fn evaluate(puzzle: &Puzzle, selected: Option<usize>) -> Verdict {
    Verdict {
        is_correct: selected == Some(puzzle.correct_answer),
        timed_out: selected.is_none(),
    }
}

/// Attempt state for the question currently on screen.
///
/// Whichever of [`select`](Self::select) and [`tick`](Self::tick) resolves
/// the question first wins; after that the attempt is frozen until it is
/// replaced for the next question.
#[derive(Debug, Clone, Default)]
pub struct QuestionAttempt {
    selected: Option<usize>,
    answered: bool,
    explanation_visible: bool,
    countdown: Countdown,
}

impl QuestionAttempt {
    /// Fresh attempt with its countdown already running.
    pub fn begin(seconds: u32) -> Self {
        let mut countdown = Countdown::default();
        countdown.start(seconds);
        Self {
            countdown,
            ..Self::default()
        }
    }

    pub fn select(&mut self, puzzle: &Puzzle, index: usize) -> Option<Verdict> {
        if self.answered {
            return None;
        }
        if index >= puzzle.options.len() {
            debug!(index, options = puzzle.options.len(), "ignoring out-of-range selection");
            return None;
        }

        let verdict = evaluate(puzzle, Some(index));
        self.selected = Some(index);
        self.freeze();
        self.explanation_visible = verdict.is_correct || puzzle.has_explanation();
        Some(verdict)
    }

    /// Advance the countdown by one second, resolving the question on expiry.
    pub fn tick(&mut self, puzzle: &Puzzle) -> Option<Verdict> {
        if self.answered {
            return None;
        }

        match self.countdown.tick() {
            Tick::Expired => {
                self.freeze();
                Some(evaluate(puzzle, None))
            }
            Tick::Running(_) | Tick::Idle => None,
        }
    }

    fn freeze(&mut self) {
        self.answered = true;
        self.countdown.stop();
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn is_timed_out(&self) -> bool {
        self.answered && self.selected.is_none()
    }

    pub fn time_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn explanation_visible(&self) -> bool {
        self.explanation_visible
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn puzzle(explanation: Option<&str>) -> Puzzle {
        Puzzle::new(
            "Pick B",
            vec!["a".into(), "b".into(), "c".into()],
            1,
            explanation.map(str::to_string),
        )
    }

    #[test]
    fn test_evaluate() {
        let puzzle = puzzle(None);
        assert!(evaluate(&puzzle, Some(1)).is_correct);
        assert!(!evaluate(&puzzle, Some(0)).is_correct);
        assert!(!evaluate(&puzzle, Some(2)).is_correct);

        let timeout = evaluate(&puzzle, None);
        assert!(!timeout.is_correct);
        assert!(timeout.timed_out);
    }

    #[test]
    fn test_selection_freezes_attempt() {
        let puzzle = puzzle(None);
        let mut attempt = QuestionAttempt::begin(30);

        let verdict = attempt.select(&puzzle, 0).unwrap();
        assert!(!verdict.is_correct);
        assert!(attempt.is_answered());
        assert!(!attempt.countdown().is_running());

        assert_eq!(attempt.select(&puzzle, 1), None);
        assert_eq!(attempt.selected(), Some(0));
        assert_eq!(attempt.tick(&puzzle), None);
        assert_eq!(attempt.time_remaining(), 30);
    }

    #[test]
    fn test_timeout_wins_over_late_selection() {
        let puzzle = puzzle(Some("because"));
        let mut attempt = QuestionAttempt::begin(2);

        assert_eq!(attempt.tick(&puzzle), None);
        let verdict = attempt.tick(&puzzle).unwrap();
        assert!(verdict.timed_out);
        assert!(!verdict.is_correct);
        assert!(attempt.is_timed_out());
        assert_eq!(attempt.time_remaining(), 0);

        assert_eq!(attempt.select(&puzzle, 1), None);
        assert!(!attempt.explanation_visible());
    }

    #[test]
    fn test_explanation_visibility() {
        let mut correct = QuestionAttempt::begin(30);
        correct.select(&puzzle(None), 1);
        assert!(correct.explanation_visible());

        let mut wrong_without_text = QuestionAttempt::begin(30);
        wrong_without_text.select(&puzzle(None), 2);
        assert!(!wrong_without_text.explanation_visible());

        let mut wrong_with_text = QuestionAttempt::begin(30);
        wrong_with_text.select(&puzzle(Some("because")), 2);
        assert!(wrong_with_text.explanation_visible());
    }

    #[test]
    fn test_out_of_range_selection_keeps_question_open() {
        let puzzle = puzzle(None);
        let mut attempt = QuestionAttempt::begin(30);
        assert_eq!(attempt.select(&puzzle, 7), None);
        assert!(!attempt.is_answered());
        assert!(attempt.countdown().is_running());
    }
}
