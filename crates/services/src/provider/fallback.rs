use std::sync::Arc;

use async_trait::async_trait;
use trivia_core::model::{Difficulty, Question};

use super::{OfflineQuestionBank, QuestionProvider, QuestionRequest};
use crate::error::ProviderError;

/// Tries the primary provider first and serves the offline bank when it fails.
///
/// An empty batch from the primary counts as a failure.
#[derive(Clone)]
pub struct FallbackProvider {
    primary: Arc<dyn QuestionProvider>,
    offline: OfflineQuestionBank,
}

impl FallbackProvider {
    #[must_use]
    pub fn new(primary: Arc<dyn QuestionProvider>, offline: OfflineQuestionBank) -> Self {
        Self { primary, offline }
    }

    fn use_primary(
        result: Result<Vec<Question>, ProviderError>,
    ) -> Result<Vec<Question>, ProviderError> {
        match result {
            Ok(questions) if questions.is_empty() => Err(ProviderError::Empty),
            other => other,
        }
    }
}

#[async_trait]
impl QuestionProvider for FallbackProvider {
    async fn fetch_questions(
        &self,
        request: &QuestionRequest,
    ) -> Result<Vec<Question>, ProviderError> {
        match Self::use_primary(self.primary.fetch_questions(request).await) {
            Ok(questions) => Ok(questions),
            Err(err) => {
                log::warn!("question provider failed ({err}); serving offline questions");
                self.offline.fetch_questions(request).await
            }
        }
    }

    async fn fetch_daily(&self) -> Result<Vec<Question>, ProviderError> {
        match Self::use_primary(self.primary.fetch_daily().await) {
            Ok(questions) => Ok(questions),
            Err(err) => {
                log::warn!("daily quiz fetch failed ({err}); serving offline questions");
                self.offline.fetch_daily().await
            }
        }
    }

    async fn list_difficulties(&self) -> Result<Vec<Difficulty>, ProviderError> {
        match self.primary.list_difficulties().await {
            Ok(difficulties) => Ok(difficulties),
            Err(err) => {
                log::warn!("difficulty listing failed ({err}); using offline bank");
                self.offline.list_difficulties().await
            }
        }
    }
}
