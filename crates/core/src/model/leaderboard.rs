use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

use crate::model::question::Difficulty;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NicknameError {
    #[error("nickname cannot be empty")]
    Empty,

    #[error("nickname is too long: {len} chars (max {max})")]
    TooLong { len: usize, max: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LeaderboardError {
    #[error("entry dated {entry} does not belong to the leaderboard for {board}")]
    DateMismatch { board: NaiveDate, entry: NaiveDate },
}

//
// ─── NICKNAME ──────────────────────────────────────────────────────────────────
//

/// Display name used on the local leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nickname(String);

impl Nickname {
    pub const MAX_LEN: usize = 24;

    /// Trims and validates a nickname.
    ///
    /// # Errors
    ///
    /// Returns `NicknameError::Empty` for blank input and `NicknameError::TooLong`
    /// when the trimmed value exceeds `MAX_LEN` characters.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, NicknameError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(NicknameError::Empty);
        }
        let len = trimmed.chars().count();
        if len > Self::MAX_LEN {
            return Err(NicknameError::TooLong {
                len,
                max: Self::MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The nickname chosen on a given day. Only honoured on that day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NicknameInfo {
    pub nickname: Nickname,
    pub date: NaiveDate,
}

impl NicknameInfo {
    #[must_use]
    pub fn new(nickname: Nickname, date: NaiveDate) -> Self {
        Self { nickname, date }
    }

    #[must_use]
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.date == date
    }
}

//
// ─── ENTRIES ───────────────────────────────────────────────────────────────────
//

/// Best score for one nickname/difficulty/day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub nickname: Nickname,
    pub score: u32,
    pub difficulty: Difficulty,
    pub date: NaiveDate,
}

impl LeaderboardEntry {
    #[must_use]
    pub fn new(nickname: Nickname, score: u32, difficulty: Difficulty, date: NaiveDate) -> Self {
        Self {
            nickname,
            score,
            difficulty,
            date,
        }
    }

    fn same_slot(&self, other: &Self) -> bool {
        self.nickname == other.nickname && self.difficulty == other.difficulty
    }
}

/// What happened when an entry was merged into a leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No entry existed for the slot.
    Inserted,
    /// The new score beat the stored one.
    Improved { previous: u32 },
    /// The stored score was equal or higher and was kept.
    Kept { best: u32 },
}

impl UpsertOutcome {
    #[must_use]
    pub fn changed(self) -> bool {
        !matches!(self, UpsertOutcome::Kept { .. })
    }
}

//
// ─── DAILY LEADERBOARD ─────────────────────────────────────────────────────────
//

/// All leaderboard entries for one calendar day.
///
/// Holds at most one entry per (nickname, difficulty); merging keeps the highest score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyLeaderboard {
    date: NaiveDate,
    entries: Vec<LeaderboardEntry>,
}

impl DailyLeaderboard {
    #[must_use]
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            entries: Vec::new(),
        }
    }

    /// Rebuild a leaderboard from stored entries, merging any duplicate slots.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::DateMismatch` if an entry belongs to another day.
    pub fn from_entries(
        date: NaiveDate,
        entries: impl IntoIterator<Item = LeaderboardEntry>,
    ) -> Result<Self, LeaderboardError> {
        let mut board = Self::empty(date);
        for entry in entries {
            board.upsert(entry)?;
        }
        Ok(board)
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge an entry, replacing the stored one only if the new score is strictly greater.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::DateMismatch` if the entry is dated another day.
    pub fn upsert(&mut self, entry: LeaderboardEntry) -> Result<UpsertOutcome, LeaderboardError> {
        if entry.date != self.date {
            return Err(LeaderboardError::DateMismatch {
                board: self.date,
                entry: entry.date,
            });
        }

        match self.entries.iter_mut().find(|e| e.same_slot(&entry)) {
            None => {
                self.entries.push(entry);
                Ok(UpsertOutcome::Inserted)
            }
            Some(existing) if entry.score > existing.score => {
                let previous = existing.score;
                existing.score = entry.score;
                Ok(UpsertOutcome::Improved { previous })
            }
            Some(existing) => Ok(UpsertOutcome::Kept {
                best: existing.score,
            }),
        }
    }

    /// Entries ordered for display: highest score first, then nickname.
    #[must_use]
    pub fn ranked(&self) -> Vec<LeaderboardEntry> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.nickname.cmp(&b.nickname))
                .then_with(|| a.difficulty.cmp(&b.difficulty))
        });
        ranked
    }
}
