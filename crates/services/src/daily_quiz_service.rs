use std::sync::Arc;

use storage::repository::{DailyQuizRepository, StorageError};

use crate::Clock;

/// Tracks whether today's daily quiz was already finished.
#[derive(Clone)]
pub struct DailyQuizService {
    clock: Clock,
    daily_quiz: Arc<dyn DailyQuizRepository>,
}

impl DailyQuizService {
    #[must_use]
    pub fn new(clock: Clock, daily_quiz: Arc<dyn DailyQuizRepository>) -> Self {
        Self { clock, daily_quiz }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be read.
    pub async fn already_played_today(&self) -> Result<bool, StorageError> {
        let last = self.daily_quiz.last_played().await?;
        Ok(last == Some(self.clock.today()))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be written.
    pub async fn mark_played(&self) -> Result<(), StorageError> {
        self.daily_quiz.mark_played(self.clock.today()).await
    }
}
