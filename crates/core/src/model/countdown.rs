use thiserror::Error;

use crate::model::question::Difficulty;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CountdownError {
    #[error("countdown for {difficulty} must be > 0 seconds")]
    ZeroSeconds { difficulty: Difficulty },
}

/// At or below this many seconds the countdown is rendered as running low.
pub const LOW_TIME_THRESHOLD_SECS: u32 = 3;

/// Seconds allowed per question, by difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTable {
    easy: u32,
    medium: u32,
    hard: u32,
}

impl Default for CountdownTable {
    fn default() -> Self {
        Self {
            easy: 15,
            medium: 7,
            hard: 4,
        }
    }
}

impl CountdownTable {
    /// Creates a custom table.
    ///
    /// # Errors
    ///
    /// Returns `CountdownError::ZeroSeconds` if any entry is zero.
    pub fn new(easy: u32, medium: u32, hard: u32) -> Result<Self, CountdownError> {
        for (difficulty, secs) in [
            (Difficulty::Easy, easy),
            (Difficulty::Medium, medium),
            (Difficulty::Hard, hard),
        ] {
            if secs == 0 {
                return Err(CountdownError::ZeroSeconds { difficulty });
            }
        }
        Ok(Self { easy, medium, hard })
    }

    #[must_use]
    pub fn seconds_for(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_difficulty_table() {
        let table = CountdownTable::default();
        assert_eq!(table.seconds_for(Difficulty::Easy), 15);
        assert_eq!(table.seconds_for(Difficulty::Medium), 7);
        assert_eq!(table.seconds_for(Difficulty::Hard), 4);
    }

    #[test]
    fn zero_entries_are_rejected() {
        let err = CountdownTable::new(10, 0, 3).unwrap_err();
        assert_eq!(
            err,
            CountdownError::ZeroSeconds {
                difficulty: Difficulty::Medium
            }
        );
    }
}
