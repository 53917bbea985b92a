use trivia_core::model::{Question, QuizResult, UpsertOutcome};
use trivia_core::session::{AnswerFeedback, LoadFailure, LoadTicket, QuestionTicket};

/// Deferred work arriving at the session loop. Every event carries the ticket it was
/// scheduled for so events from a reset or superseded run can be dropped.
#[derive(Debug)]
pub enum SessionEvent {
    Loaded {
        ticket: LoadTicket,
        result: Result<Vec<Question>, LoadFailure>,
    },
    Tick {
        ticket: QuestionTicket,
    },
    AdvanceDue {
        ticket: QuestionTicket,
    },
}

/// What changed after the loop applied one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Started { total: usize },
    LoadFailed(LoadFailure),
    Tick { remaining: u32 },
    /// The countdown ran out and a timeout was recorded.
    Answered(AnswerFeedback),
    Advanced { index: usize },
    Completed(CompletionReport),
}

/// Outcome of the one-time completion bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub result: QuizResult,
    /// `None` when no nickname was set for today.
    pub leaderboard: Option<UpsertOutcome>,
    pub persistence_errors: Vec<String>,
}

impl CompletionReport {
    #[must_use]
    pub fn fully_persisted(&self) -> bool {
        self.persistence_errors.is_empty()
    }
}
