use thiserror::Error;

use crate::model::question::{Difficulty, Sport};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
    #[error("question count must be > 0")]
    InvalidQuestionCount,

    #[error("unknown quiz preset: {0}")]
    UnknownPreset(String),
}

/// Question counts offered on the selection screen.
pub const QUESTION_COUNT_CHOICES: [u32; 3] = [5, 10, 15];

/// Question count used by quick-access presets such as `easy-basketball`.
pub const PRESET_QUESTION_COUNT: u32 = 10;

/// Question count of the daily quiz.
pub const DAILY_QUESTION_COUNT: u32 = 5;

/// How a session was started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionKind {
    /// The user picked difficulty, sport and count.
    #[default]
    Custom,
    /// The fixed once-a-day quiz.
    Daily,
}

/// Parameters the user picked before starting a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    difficulty: Difficulty,
    sport: Sport,
    question_count: u32,
}

impl Selection {
    /// Creates a validated selection.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::InvalidQuestionCount` if `question_count` is zero.
    pub fn new(
        difficulty: Difficulty,
        sport: Sport,
        question_count: u32,
    ) -> Result<Self, SelectionError> {
        if question_count == 0 {
            return Err(SelectionError::InvalidQuestionCount);
        }
        Ok(Self {
            difficulty,
            sport,
            question_count,
        })
    }

    /// The fixed selection behind the daily quiz: five medium questions across all sports.
    #[must_use]
    pub fn daily() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            sport: Sport::All,
            question_count: DAILY_QUESTION_COUNT,
        }
    }

    /// Parses a quick-access preset of the form `<difficulty>-<sport>`.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::UnknownPreset` if either half is not recognised.
    pub fn from_preset(slug: &str) -> Result<Self, SelectionError> {
        let unknown = || SelectionError::UnknownPreset(slug.to_string());
        let (difficulty, sport) = slug.trim().split_once('-').ok_or_else(unknown)?;
        let difficulty = difficulty.parse::<Difficulty>().map_err(|_| unknown())?;
        let sport = sport.parse::<Sport>().map_err(|_| unknown())?;
        Self::new(difficulty, sport, PRESET_QUESTION_COUNT)
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn sport(&self) -> Sport {
        self.sport
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    /// Slug used by quick-access links, e.g. `medium-all`.
    #[must_use]
    pub fn preset_slug(&self) -> String {
        format!("{}-{}", self.difficulty, self.sport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_questions_is_rejected() {
        let err = Selection::new(Difficulty::Easy, Sport::Soccer, 0).unwrap_err();
        assert_eq!(err, SelectionError::InvalidQuestionCount);
    }

    #[test]
    fn preset_parses_difficulty_and_sport() {
        let selection = Selection::from_preset("hard-hockey").unwrap();
        assert_eq!(selection.difficulty(), Difficulty::Hard);
        assert_eq!(selection.sport(), Sport::Hockey);
        assert_eq!(selection.question_count(), PRESET_QUESTION_COUNT);
        assert_eq!(selection.preset_slug(), "hard-hockey");
    }

    #[test]
    fn unknown_presets_are_rejected() {
        for slug in ["", "hard", "hard-cricket", "insane-soccer"] {
            assert!(matches!(
                Selection::from_preset(slug),
                Err(SelectionError::UnknownPreset(_))
            ));
        }
    }

    #[test]
    fn daily_is_five_medium_all_sports() {
        let daily = Selection::daily();
        assert_eq!(daily.difficulty(), Difficulty::Medium);
        assert_eq!(daily.sport(), Sport::All);
        assert_eq!(daily.question_count(), 5);
    }
}
