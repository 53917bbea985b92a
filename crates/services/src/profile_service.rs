use std::sync::Arc;

use storage::repository::{ProfileRepository, StorageError};
use trivia_core::model::{Nickname, NicknameInfo};

use crate::Clock;
use crate::error::ProfileError;

/// Nickname and consent state for the local player.
#[derive(Clone)]
pub struct ProfileService {
    clock: Clock,
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(clock: Clock, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { clock, profiles }
    }

    /// The nickname chosen today, if any. Yesterday's choice does not carry over.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored record cannot be read.
    pub async fn nickname_for_today(&self) -> Result<Option<Nickname>, StorageError> {
        let today = self.clock.today();
        Ok(self
            .profiles
            .nickname_info()
            .await?
            .filter(|info| info.is_valid_on(today))
            .map(|info| info.nickname))
    }

    /// Validate and store a nickname for today.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Nickname` for an invalid name or `ProfileError::Storage`
    /// if it cannot be saved.
    pub async fn set_nickname(&self, raw: &str) -> Result<Nickname, ProfileError> {
        let nickname = Nickname::new(raw)?;
        let info = NicknameInfo::new(nickname.clone(), self.clock.today());
        self.profiles.save_nickname_info(&info).await?;
        log::info!("nickname set to {nickname}");
        Ok(nickname)
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be read.
    pub async fn consent_accepted(&self) -> Result<bool, StorageError> {
        self.profiles.consent_accepted().await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be written.
    pub async fn accept_consent(&self) -> Result<(), StorageError> {
        self.profiles.accept_consent().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use storage::repository::Storage;
    use trivia_core::model::NicknameError;
    use trivia_core::time::fixed_clock;

    #[tokio::test]
    async fn nickname_expires_at_midnight() {
        let storage = Storage::in_memory();
        let mut clock = fixed_clock();
        let service = ProfileService::new(clock, Arc::clone(&storage.profiles));

        service.set_nickname("  striker ").await.unwrap();
        assert_eq!(
            service.nickname_for_today().await.unwrap().unwrap().as_str(),
            "striker"
        );

        clock.advance(Duration::days(1));
        let tomorrow = ProfileService::new(clock, storage.profiles);
        assert!(tomorrow.nickname_for_today().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_nickname_is_rejected() {
        let service = ProfileService::new(fixed_clock(), Storage::in_memory().profiles);
        assert!(matches!(
            service.set_nickname("   ").await,
            Err(ProfileError::Nickname(NicknameError::Empty))
        ));
    }

    #[tokio::test]
    async fn consent_is_sticky() {
        let service = ProfileService::new(fixed_clock(), Storage::in_memory().profiles);
        assert!(!service.consent_accepted().await.unwrap());
        service.accept_consent().await.unwrap();
        assert!(service.consent_accepted().await.unwrap());
    }
}
