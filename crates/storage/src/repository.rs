use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use trivia_core::model::{DailyLeaderboard, LeaderboardEntry, NicknameInfo, UpsertOutcome};
use trivia_core::time::{date_key, parse_date_key};

use crate::keys;
use crate::records;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── KEY–VALUE CONTRACT ────────────────────────────────────────────────────────
//

/// Minimal string key–value store, the only persistence the app needs.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory store for tests and ephemeral runs.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

//
// ─── TYPED REPOSITORIES ────────────────────────────────────────────────────────
//

/// Per-day best scores.
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Load the leaderboard for `date`; a day with no record yields an empty board.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored value cannot be read or decoded.
    async fn load(&self, date: NaiveDate) -> Result<DailyLeaderboard, StorageError>;

    /// Merge `entry` into its day's board, keeping the higher score.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the board cannot be read, merged or written.
    async fn upsert(&self, entry: LeaderboardEntry) -> Result<UpsertOutcome, StorageError>;
}

/// Nickname and consent flags.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be read or decoded.
    async fn nickname_info(&self) -> Result<Option<NicknameInfo>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    async fn save_nickname_info(&self, info: &NicknameInfo) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be read.
    async fn consent_accepted(&self) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be written.
    async fn accept_consent(&self) -> Result<(), StorageError>;
}

/// "Already played today" tracking for the daily quiz.
#[async_trait]
pub trait DailyQuizRepository: Send + Sync {
    /// Date of the last finished daily quiz. Unparseable values read as never played.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be read.
    async fn last_played(&self) -> Result<Option<NaiveDate>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn mark_played(&self, date: NaiveDate) -> Result<(), StorageError>;
}

/// Typed repositories layered over any [`KeyValueStore`].
#[derive(Clone)]
pub struct KeyValueRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KeyValueRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LeaderboardRepository for KeyValueRepository {
    async fn load(&self, date: NaiveDate) -> Result<DailyLeaderboard, StorageError> {
        match self.store.get(&keys::leaderboard(date)).await? {
            Some(raw) => records::decode_leaderboard(date, &raw),
            None => Ok(DailyLeaderboard::empty(date)),
        }
    }

    async fn upsert(&self, entry: LeaderboardEntry) -> Result<UpsertOutcome, StorageError> {
        let date = entry.date;
        let mut board = self.load(date).await?;
        let outcome = board
            .upsert(entry)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        if outcome.changed() {
            let raw = records::encode_leaderboard(&board)?;
            self.store.set(&keys::leaderboard(date), &raw).await?;
        }
        Ok(outcome)
    }
}

#[async_trait]
impl ProfileRepository for KeyValueRepository {
    async fn nickname_info(&self) -> Result<Option<NicknameInfo>, StorageError> {
        self.store
            .get(keys::NICKNAME_INFO)
            .await?
            .map(|raw| records::decode_nickname_info(&raw))
            .transpose()
    }

    async fn save_nickname_info(&self, info: &NicknameInfo) -> Result<(), StorageError> {
        let raw = records::encode_nickname_info(info)?;
        self.store.set(keys::NICKNAME_INFO, &raw).await
    }

    async fn consent_accepted(&self) -> Result<bool, StorageError> {
        let value = self.store.get(keys::COOKIE_CONSENT).await?;
        Ok(value.as_deref() == Some(keys::CONSENT_ACCEPTED))
    }

    async fn accept_consent(&self) -> Result<(), StorageError> {
        self.store
            .set(keys::COOKIE_CONSENT, keys::CONSENT_ACCEPTED)
            .await
    }
}

#[async_trait]
impl DailyQuizRepository for KeyValueRepository {
    async fn last_played(&self) -> Result<Option<NaiveDate>, StorageError> {
        let value = self.store.get(keys::DAILY_QUIZ_PLAYED).await?;
        Ok(value.as_deref().and_then(parse_date_key))
    }

    async fn mark_played(&self, date: NaiveDate) -> Result<(), StorageError> {
        self.store
            .set(keys::DAILY_QUIZ_PLAYED, &date_key(date))
            .await
    }
}

/// Aggregates the typed repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
    pub leaderboards: Arc<dyn LeaderboardRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub daily_quiz: Arc<dyn DailyQuizRepository>,
}

impl Storage {
    /// Wire every repository to the same key–value store.
    #[must_use]
    pub fn from_store(kv: Arc<dyn KeyValueStore>) -> Self {
        let repo = KeyValueRepository::new(Arc::clone(&kv));
        let leaderboards: Arc<dyn LeaderboardRepository> = Arc::new(repo.clone());
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo.clone());
        let daily_quiz: Arc<dyn DailyQuizRepository> = Arc::new(repo);
        Self {
            kv,
            leaderboards,
            profiles,
            daily_quiz,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_core::model::{Difficulty, Nickname};
    use trivia_core::time::fixed_clock;

    fn entry(nick: &str, score: u32, difficulty: Difficulty, date: NaiveDate) -> LeaderboardEntry {
        LeaderboardEntry::new(Nickname::new(nick).unwrap(), score, difficulty, date)
    }

    #[tokio::test]
    async fn in_memory_store_get_set_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn leaderboard_keeps_best_score_per_slot() {
        let storage = Storage::in_memory();
        let today = fixed_clock().today();

        let first = storage
            .leaderboards
            .upsert(entry("nick", 5, Difficulty::Easy, today))
            .await
            .unwrap();
        assert_eq!(first, UpsertOutcome::Inserted);

        let lower = storage
            .leaderboards
            .upsert(entry("nick", 3, Difficulty::Easy, today))
            .await
            .unwrap();
        assert_eq!(lower, UpsertOutcome::Kept { best: 5 });
        let board = storage.leaderboards.load(today).await.unwrap();
        assert_eq!(board.entries()[0].score, 5);

        let higher = storage
            .leaderboards
            .upsert(entry("nick", 7, Difficulty::Easy, today))
            .await
            .unwrap();
        assert_eq!(higher, UpsertOutcome::Improved { previous: 5 });
        let board = storage.leaderboards.load(today).await.unwrap();
        assert_eq!(board.entries().len(), 1);
        assert_eq!(board.entries()[0].score, 7);
    }

    #[tokio::test]
    async fn new_day_reads_empty_board() {
        let storage = Storage::in_memory();
        let mut clock = fixed_clock();
        let today = clock.today();
        storage
            .leaderboards
            .upsert(entry("nick", 2, Difficulty::Hard, today))
            .await
            .unwrap();

        clock.advance(chrono::Duration::days(1));
        let board = storage.leaderboards.load(clock.today()).await.unwrap();
        assert!(board.is_empty());
    }

    #[tokio::test]
    async fn consent_and_daily_flags() {
        let storage = Storage::in_memory();
        assert!(!storage.profiles.consent_accepted().await.unwrap());
        storage.profiles.accept_consent().await.unwrap();
        assert!(storage.profiles.consent_accepted().await.unwrap());
        assert_eq!(
            storage.kv.get(keys::COOKIE_CONSENT).await.unwrap().as_deref(),
            Some("true")
        );

        let today = fixed_clock().today();
        assert_eq!(storage.daily_quiz.last_played().await.unwrap(), None);
        storage.daily_quiz.mark_played(today).await.unwrap();
        assert_eq!(storage.daily_quiz.last_played().await.unwrap(), Some(today));

        storage.kv.set(keys::DAILY_QUIZ_PLAYED, "garbage").await.unwrap();
        assert_eq!(storage.daily_quiz.last_played().await.unwrap(), None);
    }

    #[tokio::test]
    async fn nickname_info_round_trips() {
        let storage = Storage::in_memory();
        assert!(storage.profiles.nickname_info().await.unwrap().is_none());
        let info = NicknameInfo::new(Nickname::new(" ace ").unwrap(), fixed_clock().today());
        storage.profiles.save_nickname_info(&info).await.unwrap();
        assert_eq!(storage.profiles.nickname_info().await.unwrap(), Some(info));
    }
}
