use serde::Deserialize;
use thiserror::Error;

/// A single multiple-choice brain teaser.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Puzzle {
    pub question: String,
    pub options: Vec<String>,
    #[serde(alias = "correctAnswer")]
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Puzzle {
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
        explanation: Option<String>,
    ) -> Self {
        Self {
            question: question.into(),
            options,
            correct_answer,
            explanation,
        }
    }

    /// Letter shown next to the option at `index` (`A`, `B`, `C`, ...).
    pub fn option_label(index: usize) -> char {
        u8::try_from(index)
            .ok()
            .filter(|i| *i < 26)
            .map(|i| char::from(b'A' + i))
            .unwrap_or('?')
    }

    pub fn has_explanation(&self) -> bool {
        self.explanation
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }
}

/// Reasons a puzzle list cannot be used as a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog must contain at least one puzzle")]
    Empty,
    #[error("puzzle {index} has {count} option(s); at least 2 are required")]
    TooFewOptions { index: usize, count: usize },
    #[error("puzzle {index} marks option {correct_answer} as correct but only has {count} option(s)")]
    AnswerOutOfRange {
        index: usize,
        correct_answer: usize,
        count: usize,
    },
}

/// Ordered, immutable list of puzzles, validated once at load.
#[derive(Debug)]
pub struct Catalog {
    puzzles: Vec<Puzzle>,
}

impl Catalog {
    pub fn new(puzzles: Vec<Puzzle>) -> Result<Self, CatalogError> {
        if puzzles.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (index, puzzle) in puzzles.iter().enumerate() {
            let count = puzzle.options.len();
            if count < 2 {
                return Err(CatalogError::TooFewOptions { index, count });
            }
            if puzzle.correct_answer >= count {
                return Err(CatalogError::AnswerOutOfRange {
                    index,
                    correct_answer: puzzle.correct_answer,
                    count,
                });
            }
        }

        Ok(Self { puzzles })
    }

    pub fn get(&self, index: usize) -> Option<&Puzzle> {
        self.puzzles.get(index)
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Puzzle> {
        self.puzzles.iter()
    }
}
