use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::config::QuizSettings;
use crate::daily_quiz_service::DailyQuizService;
use crate::error::{AppServicesError, ProviderError};
use crate::leaderboard_service::LeaderboardService;
use crate::profile_service::ProfileService;
use crate::provider::{
    FallbackProvider, HttpProviderConfig, HttpQuestionProvider, OfflineQuestionBank,
    QuestionProvider,
};
use crate::sessions::SessionLoop;

/// Assembles app-facing services from settings.
#[derive(Clone)]
pub struct AppServices {
    settings: QuizSettings,
    provider: Arc<dyn QuestionProvider>,
    leaderboard: Arc<LeaderboardService>,
    profile: Arc<ProfileService>,
    daily_quiz: Arc<DailyQuizService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP question API.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the HTTP client
    /// cannot be built.
    pub async fn new_sqlite(settings: QuizSettings, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&settings.db_url).await?;
        let provider = build_provider(&settings, clock)?;
        Ok(Self::from_parts(settings, clock, &storage, provider))
    }

    /// Wire services over existing storage and an explicit provider.
    #[must_use]
    pub fn from_parts(
        settings: QuizSettings,
        clock: Clock,
        storage: &Storage,
        provider: Arc<dyn QuestionProvider>,
    ) -> Self {
        let leaderboard = Arc::new(LeaderboardService::new(
            clock,
            Arc::clone(&storage.leaderboards),
        ));
        let profile = Arc::new(ProfileService::new(clock, Arc::clone(&storage.profiles)));
        let daily_quiz = Arc::new(DailyQuizService::new(
            clock,
            Arc::clone(&storage.daily_quiz),
        ));
        Self {
            settings,
            provider,
            leaderboard,
            profile,
            daily_quiz,
        }
    }

    /// A fresh session loop using the configured countdown table and feedback delay.
    #[must_use]
    pub fn session_loop(&self) -> SessionLoop {
        SessionLoop::new(
            Arc::clone(&self.provider),
            Arc::clone(&self.leaderboard),
            Arc::clone(&self.profile),
            Arc::clone(&self.daily_quiz),
        )
        .with_countdown(self.settings.countdown)
        .with_feedback_delay(self.settings.feedback_delay)
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn provider(&self) -> Arc<dyn QuestionProvider> {
        Arc::clone(&self.provider)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        Arc::clone(&self.leaderboard)
    }

    #[must_use]
    pub fn profile(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profile)
    }

    #[must_use]
    pub fn daily_quiz(&self) -> Arc<DailyQuizService> {
        Arc::clone(&self.daily_quiz)
    }
}

/// HTTP provider, wrapped with the offline bank when the fallback is enabled.
///
/// # Errors
///
/// Returns `ProviderError` if the HTTP client cannot be built.
pub fn build_provider(
    settings: &QuizSettings,
    clock: Clock,
) -> Result<Arc<dyn QuestionProvider>, ProviderError> {
    let http = HttpQuestionProvider::new(
        &HttpProviderConfig {
            base_url: settings.api_base_url.clone(),
            timeout: settings.api_timeout,
        },
        clock,
    )?;
    if settings.offline_fallback {
        log::info!("offline question fallback enabled");
        Ok(Arc::new(FallbackProvider::new(
            Arc::new(http),
            OfflineQuestionBank::new(),
        )))
    } else {
        Ok(Arc::new(http))
    }
}
