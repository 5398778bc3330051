/*!
 * Gender balance scoring.
 *
 * The score ("pH") places a noun set on a scale from 1 (all masculine) to
 * 14 (all feminine). Neuter nouns pull the score toward the neutral 7.
 */

use crate::nouns::{GenderMarker, NounRecord};

/// Lowest possible score (only masculine nouns)
pub const MIN_SCORE: f64 = 1.0;

/// Highest possible score (only feminine nouns)
pub const MAX_SCORE: f64 = 14.0;

/// The neutral score
pub const NEUTRAL_SCORE: f64 = 7.0;

/// Granularity of user-selected target scores
pub const TARGET_STEP: f64 = 0.1;

/// Noun counts per gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenderCounts {
    pub masculine: usize,
    pub feminine: usize,
    pub neuter: usize,
}

impl GenderCounts {
    pub fn from_nouns(nouns: &[NounRecord]) -> Self {
        nouns.iter().fold(Self::default(), |mut counts, noun| {
            match noun.gender {
                GenderMarker::Masculine => counts.masculine += 1,
                GenderMarker::Feminine => counts.feminine += 1,
                GenderMarker::Neuter => counts.neuter += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.masculine + self.feminine + self.neuter
    }

    /// Masculine plus feminine
    pub fn gendered(&self) -> usize {
        self.masculine + self.feminine
    }

    /// Score for these counts, `None` when there are no nouns at all
    pub fn score(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }

        let gendered = self.gendered();
        if gendered == 0 {
            return Some(NEUTRAL_SCORE);
        }

        let feminine_ratio = self.feminine as f64 / gendered as f64;
        let raw = MIN_SCORE + (MAX_SCORE - MIN_SCORE) * feminine_ratio;

        let gendered_ratio = gendered as f64 / total as f64;
        Some(NEUTRAL_SCORE + (raw - NEUTRAL_SCORE) * gendered_ratio)
    }
}

/// Score a noun set. Only the per-gender counts matter.
pub fn score(nouns: &[NounRecord]) -> Option<f64> {
    GenderCounts::from_nouns(nouns).score()
}

/// Clamp a requested target into [1, 14] and round it to the 0.1 step.
/// Non-finite input falls back to neutral.
pub fn snap_target(value: f64) -> f64 {
    if !value.is_finite() {
        return NEUTRAL_SCORE;
    }
    let clamped = value.clamp(MIN_SCORE, MAX_SCORE);
    (clamped / TARGET_STEP).round() / (1.0 / TARGET_STEP).round()
}

/// Relative position on the gauge, 0.0 at score 1 and 1.0 at score 14
pub fn gauge_position(score: f64) -> f64 {
    ((score - MIN_SCORE) / (MAX_SCORE - MIN_SCORE)).clamp(0.0, 1.0)
}

/// Which way a score leans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tilt {
    Masculine,
    Balanced,
    Feminine,
}

impl Tilt {
    pub fn of(score: f64) -> Self {
        if score < 6.5 {
            Self::Masculine
        } else if score > 7.5 {
            Self::Feminine
        } else {
            Self::Balanced
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Masculine => "more masculine nouns (acidic)",
            Self::Balanced => "balanced (neutral)",
            Self::Feminine => "more feminine nouns (alkaline)",
        }
    }
}

/// Colour band of the gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    StronglyMasculine,
    Masculine,
    LeaningMasculine,
    Neutral,
    LeaningFeminine,
    Feminine,
    StronglyFeminine,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score < 3.0 {
            Self::StronglyMasculine
        } else if score < 5.0 {
            Self::Masculine
        } else if score < 6.5 {
            Self::LeaningMasculine
        } else if score <= 7.5 {
            Self::Neutral
        } else if score < 9.0 {
            Self::LeaningFeminine
        } else if score < 11.0 {
            Self::Feminine
        } else {
            Self::StronglyFeminine
        }
    }

    /// ANSI colour escape for terminal output
    pub fn ansi_color(&self) -> &'static str {
        match self {
            Self::StronglyMasculine => "\x1B[1;31m",
            Self::Masculine => "\x1B[1;91m",
            Self::LeaningMasculine => "\x1B[1;33m",
            Self::Neutral => "\x1B[1;32m",
            Self::LeaningFeminine => "\x1B[1;36m",
            Self::Feminine => "\x1B[1;34m",
            Self::StronglyFeminine => "\x1B[1;35m",
        }
    }
}

/// "pH: 7.33" or "pH: -"
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(value) => format!("pH: {:.2}", value),
        None => "pH: -".to_string(),
    }
}
