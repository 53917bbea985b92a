//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use trivia_core::model::{CountdownError, NicknameError};
use trivia_core::session::{LoadFailure, SessionStateError};

/// Errors emitted by question providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("question request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("question request timed out")]
    Timeout,
    #[error("provider returned no questions")]
    Empty,
    #[error("malformed question payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

impl From<ProviderError> for LoadFailure {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Empty => LoadFailure::EmptyResult,
            other => LoadFailure::Fetch {
                detail: other.to_string(),
            },
        }
    }
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileError {
    #[error(transparent)]
    Nickname(#[from] NicknameError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the session loop.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("today's daily quiz has already been played")]
    DailyAlreadyPlayed,
    #[error(transparent)]
    State(#[from] SessionStateError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors raised while reading settings from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error(transparent)]
    Countdown(#[from] CountdownError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_maps_to_empty_result() {
        assert_eq!(LoadFailure::from(ProviderError::Empty), LoadFailure::EmptyResult);
    }

    #[test]
    fn other_errors_map_to_fetch() {
        let failure = LoadFailure::from(ProviderError::HttpStatus(
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
        ));
        assert!(matches!(failure, LoadFailure::Fetch { ref detail } if detail.contains("503")));
        assert_eq!(failure.message(), LoadFailure::MESSAGE);
    }
}
