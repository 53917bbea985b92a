//! Question providers: the remote API, a built-in offline bank, and a fallback wrapper.

use async_trait::async_trait;
use trivia_core::model::{Difficulty, Question, Selection, Sport};

use crate::error::ProviderError;

mod fallback;
mod http;
mod offline;

pub use fallback::FallbackProvider;
pub use http::{HttpProviderConfig, HttpQuestionProvider};
pub use offline::OfflineQuestionBank;

/// Parameters of one question fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionRequest {
    pub count: u32,
    pub difficulty: Difficulty,
    pub sport: Sport,
}

impl From<&Selection> for QuestionRequest {
    fn from(selection: &Selection) -> Self {
        Self {
            count: selection.question_count(),
            difficulty: selection.difficulty(),
            sport: selection.sport(),
        }
    }
}

/// Source of quiz questions. One attempt per call; callers never retry.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Fetch up to `request.count` questions matching the request.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on transport, status, timeout or decoding failures.
    async fn fetch_questions(&self, request: &QuestionRequest)
    -> Result<Vec<Question>, ProviderError>;

    /// Fetch today's daily quiz (five medium questions across all sports).
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on transport, status, timeout or decoding failures.
    async fn fetch_daily(&self) -> Result<Vec<Question>, ProviderError>;

    /// Difficulties the provider can serve.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on transport, status, timeout or decoding failures.
    async fn list_difficulties(&self) -> Result<Vec<Difficulty>, ProviderError>;
}
