//! "Copy Results": hand the share text of a finished quiz to some destination.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;
use trivia_core::model::QuizResult;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShareError {
    #[error("sharing is not available")]
    Unavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Somewhere results can be copied to (clipboard, file, terminal).
pub trait ShareTarget: Send + Sync {
    /// # Errors
    ///
    /// Returns `ShareError` if the text could not be delivered.
    fn share(&self, text: &str) -> Result<(), ShareError>;
}

/// Writes the share text to a file, replacing its contents.
#[derive(Clone, Debug)]
pub struct FileShareTarget {
    path: PathBuf,
}

impl FileShareTarget {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ShareTarget for FileShareTarget {
    fn share(&self, text: &str) -> Result<(), ShareError> {
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Transient notice shown after a share attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareNotice {
    Copied,
    Failed(String),
}

impl ShareNotice {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            ShareNotice::Copied => "Results copied!".to_string(),
            ShareNotice::Failed(reason) => format!("Could not copy results: {reason}"),
        }
    }
}

/// Share `result`. Failures become a notice; they never propagate.
pub fn share_results(target: &dyn ShareTarget, result: &QuizResult, date: NaiveDate) -> ShareNotice {
    match target.share(&result.share_text(date)) {
        Ok(()) => ShareNotice::Copied,
        Err(err) => {
            log::warn!("sharing results failed: {err}");
            ShareNotice::Failed(err.to_string())
        }
    }
}
