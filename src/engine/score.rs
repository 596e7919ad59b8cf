/// Final tally computed when a run reaches victory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSummary {
    pub score: u32,
    pub total_levels: u32,
    pub max_score: u32,
    pub accuracy_percentage: u8,
}

impl ScoreSummary {
    pub fn new(score: u32, total_levels: u32, points_per_correct: u32) -> Self {
        let max_score = total_levels.saturating_mul(points_per_correct);
        Self {
            score,
            total_levels,
            max_score,
            accuracy_percentage: accuracy_percentage(score, max_score),
        }
    }

    pub fn grade(&self) -> Grade {
        match self.accuracy_percentage {
            100..=u8::MAX => Grade::Perfect,
            80..=99 => Grade::Excellent,
            60..=79 => Grade::Great,
            40..=59 => Grade::Good,
            _ => Grade::KeepPracticing,
        }
    }
}

/// `score / max_score` as a whole percentage, rounding halves up.
fn accuracy_percentage(score: u32, max_score: u32) -> u8 {
    if max_score == 0 {
        return 0;
    }
    let score = u64::from(score.min(max_score));
    let max_score = u64::from(max_score);
    let percentage = (score * 200 + max_score) / (max_score * 2);
    u8::try_from(percentage).unwrap_or(100)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Perfect,
    Excellent,
    Great,
    Good,
    KeepPracticing,
}

impl Grade {
    pub fn headline(self) -> &'static str {
        match self {
            Grade::Perfect => "Perfect Score!",
            Grade::Excellent => "Excellent Work!",
            Grade::Great => "Great Job!",
            Grade::Good => "Good Effort!",
            Grade::KeepPracticing => "Keep Practicing!",
        }
    }
}
