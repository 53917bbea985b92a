use std::sync::Arc;

use storage::repository::{LeaderboardRepository, StorageError};
use trivia_core::model::{DailyLeaderboard, LeaderboardEntry, Nickname, QuizResult, UpsertOutcome};

use crate::Clock;

/// Reads and updates today's leaderboard.
#[derive(Clone)]
pub struct LeaderboardService {
    clock: Clock,
    leaderboards: Arc<dyn LeaderboardRepository>,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(clock: Clock, leaderboards: Arc<dyn LeaderboardRepository>) -> Self {
        Self {
            clock,
            leaderboards,
        }
    }

    /// Today's board. A new day starts empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the board cannot be loaded.
    pub async fn today(&self) -> Result<DailyLeaderboard, StorageError> {
        self.leaderboards.load(self.clock.today()).await
    }

    /// Record a finished quiz for `nickname`, keeping the best score per difficulty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the board cannot be read or written.
    pub async fn record(
        &self,
        nickname: &Nickname,
        result: &QuizResult,
    ) -> Result<UpsertOutcome, StorageError> {
        let entry = LeaderboardEntry::new(
            nickname.clone(),
            result.score,
            result.selection.difficulty(),
            self.clock.today(),
        );
        let outcome = self.leaderboards.upsert(entry).await?;
        log::debug!("leaderboard upsert for {nickname}: {outcome:?}");
        Ok(outcome)
    }
}
