use thiserror::Error;

use crate::model::{
    CountdownError, LeaderboardError, NicknameError, QuestionError, SelectionError,
};
use crate::session::SessionStateError;

/// Any domain validation failure raised by this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Countdown(#[from] CountdownError),
    #[error(transparent)]
    Nickname(#[from] NicknameError),
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
    #[error(transparent)]
    Session(#[from] SessionStateError),
}
