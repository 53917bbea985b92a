use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("answers cannot be empty")]
    EmptyAnswer,

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("unknown sport: {0}")]
    UnknownSport(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// How hard a question is. Also drives the per-question countdown length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Wire/storage form (`"easy"`, `"medium"`, `"hard"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(QuestionError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── SPORT ─────────────────────────────────────────────────────────────────────
//

/// Topic filter for a quiz. `All` means no filtering.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Basketball,
    Football,
    Baseball,
    Hockey,
    Soccer,
    #[default]
    All,
}

impl Sport {
    pub const ALL: [Sport; 6] = [
        Sport::Basketball,
        Sport::Football,
        Sport::Baseball,
        Sport::Hockey,
        Sport::Soccer,
        Sport::All,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sport::Basketball => "basketball",
            Sport::Football => "football",
            Sport::Baseball => "baseball",
            Sport::Hockey => "hockey",
            Sport::Soccer => "soccer",
            Sport::All => "all",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Sport::Basketball => "Basketball",
            Sport::Football => "Football",
            Sport::Baseball => "Baseball",
            Sport::Hockey => "Hockey",
            Sport::Soccer => "Soccer",
            Sport::All => "All Sports",
        }
    }

    /// Returns true if a question tagged with `other` belongs to this filter.
    #[must_use]
    pub fn matches(self, other: Sport) -> bool {
        self == Sport::All || self == other
    }
}

impl FromStr for Sport {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basketball" => Ok(Self::Basketball),
            "football" => Ok(Self::Football),
            "baseball" => Ok(Self::Baseball),
            "hockey" => Ok(Self::Hockey),
            "soccer" => Ok(Self::Soccer),
            "all" => Ok(Self::All),
            _ => Err(QuestionError::UnknownSport(s.to_string())),
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice trivia question.
///
/// Immutable once built; a session owns its batch for the lifetime of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
    difficulty: Difficulty,
    sport: Sport,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` if the text is blank.
    /// Returns `QuestionError::EmptyAnswer` if the correct answer or any incorrect answer is blank.
    pub fn new(
        text: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: Vec<String>,
        difficulty: Difficulty,
        sport: Sport,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        let correct_answer = correct_answer.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if correct_answer.trim().is_empty()
            || incorrect_answers.iter().any(|a| a.trim().is_empty())
        {
            return Err(QuestionError::EmptyAnswer);
        }

        Ok(Self {
            text,
            correct_answer,
            incorrect_answers,
            difficulty,
            sport,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> &[String] {
        &self.incorrect_answers
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn sport(&self) -> Sport {
        self.sport
    }

    /// Number of choices presented for this question.
    #[must_use]
    pub fn choice_count(&self) -> usize {
        1 + self.incorrect_answers.len()
    }

    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_text_and_answers() {
        let err = Question::new(" ", "A", vec!["B".into()], Difficulty::Easy, Sport::All)
            .unwrap_err();
        assert_eq!(err, QuestionError::EmptyText);

        let err = Question::new("Q", "", vec!["B".into()], Difficulty::Easy, Sport::All)
            .unwrap_err();
        assert_eq!(err, QuestionError::EmptyAnswer);

        let err = Question::new("Q", "A", vec!["  ".into()], Difficulty::Easy, Sport::All)
            .unwrap_err();
        assert_eq!(err, QuestionError::EmptyAnswer);
    }

    #[test]
    fn parses_enums_case_insensitively() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" soccer ".parse::<Sport>().unwrap(), Sport::Soccer);
        assert!("cricket".parse::<Sport>().is_err());
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn all_sport_matches_everything() {
        assert!(Sport::All.matches(Sport::Hockey));
        assert!(Sport::Hockey.matches(Sport::Hockey));
        assert!(!Sport::Hockey.matches(Sport::Soccer));
    }
}
