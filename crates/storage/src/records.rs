//! Persisted shapes for values kept in the key–value store.
//!
//! These mirror the domain types so values can be JSON encoded without leaking
//! storage concerns into `trivia_core`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trivia_core::model::{
    DailyLeaderboard, Difficulty, LeaderboardEntry, Nickname, NicknameInfo,
};

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntryRecord {
    pub nickname: String,
    pub score: u32,
    pub difficulty: Difficulty,
    pub date: NaiveDate,
}

impl LeaderboardEntryRecord {
    #[must_use]
    pub fn from_entry(entry: &LeaderboardEntry) -> Self {
        Self {
            nickname: entry.nickname.as_str().to_owned(),
            score: entry.score,
            difficulty: entry.difficulty,
            date: entry.date,
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored nickname is no longer valid.
    pub fn into_entry(self) -> Result<LeaderboardEntry, StorageError> {
        let nickname = Nickname::new(&self.nickname).map_err(ser)?;
        Ok(LeaderboardEntry::new(
            nickname,
            self.score,
            self.difficulty,
            self.date,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicknameInfoRecord {
    pub nickname: String,
    pub date: NaiveDate,
}

impl NicknameInfoRecord {
    #[must_use]
    pub fn from_info(info: &NicknameInfo) -> Self {
        Self {
            nickname: info.nickname.as_str().to_owned(),
            date: info.date,
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored nickname is no longer valid.
    pub fn into_info(self) -> Result<NicknameInfo, StorageError> {
        let nickname = Nickname::new(&self.nickname).map_err(ser)?;
        Ok(NicknameInfo::new(nickname, self.date))
    }
}

/// Decode the JSON array stored under `leaderboard-<date>`.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for malformed JSON, invalid nicknames, or
/// entries dated another day.
pub fn decode_leaderboard(date: NaiveDate, raw: &str) -> Result<DailyLeaderboard, StorageError> {
    let records: Vec<LeaderboardEntryRecord> = serde_json::from_str(raw).map_err(ser)?;
    let entries = records
        .into_iter()
        .map(LeaderboardEntryRecord::into_entry)
        .collect::<Result<Vec<_>, _>>()?;
    DailyLeaderboard::from_entries(date, entries).map_err(ser)
}

/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_leaderboard(board: &DailyLeaderboard) -> Result<String, StorageError> {
    let records: Vec<LeaderboardEntryRecord> = board
        .entries()
        .iter()
        .map(LeaderboardEntryRecord::from_entry)
        .collect();
    serde_json::to_string(&records).map_err(ser)
}

/// # Errors
///
/// Returns `StorageError::Serialization` for malformed JSON or an invalid nickname.
pub fn decode_nickname_info(raw: &str) -> Result<NicknameInfo, StorageError> {
    serde_json::from_str::<NicknameInfoRecord>(raw)
        .map_err(ser)?
        .into_info()
}

/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_nickname_info(info: &NicknameInfo) -> Result<String, StorageError> {
    serde_json::to_string(&NicknameInfoRecord::from_info(info)).map_err(ser)
}
