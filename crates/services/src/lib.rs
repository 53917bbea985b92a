#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod daily_quiz_service;
pub mod error;
pub mod leaderboard_service;
pub mod profile_service;
pub mod provider;
pub mod sessions;
pub mod share;

pub use trivia_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use config::QuizSettings;
pub use daily_quiz_service::DailyQuizService;
pub use error::{AppServicesError, ConfigError, ProfileError, ProviderError, SessionError};
pub use leaderboard_service::LeaderboardService;
pub use profile_service::ProfileService;
pub use provider::{QuestionProvider, QuestionRequest};
pub use sessions::{CompletionReport, SessionLoop, SessionUpdate, SessionView};
pub use share::{ShareNotice, ShareTarget, share_results};
