mod countdown;
mod leaderboard;
mod question;
mod result;
mod selection;

pub use countdown::{CountdownError, CountdownTable, LOW_TIME_THRESHOLD_SECS};
pub use leaderboard::{
    DailyLeaderboard, LeaderboardEntry, LeaderboardError, Nickname, NicknameError, NicknameInfo,
    UpsertOutcome,
};
pub use question::{Difficulty, Question, QuestionError, Sport};
pub use result::{AnswerMark, QuizResult};
pub use selection::{
    DAILY_QUESTION_COUNT, PRESET_QUESTION_COUNT, QUESTION_COUNT_CHOICES, Selection,
    SelectionError, SessionKind,
};
