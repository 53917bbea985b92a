use trivia_core::model::{LOW_TIME_THRESHOLD_SECS, SessionKind};
use trivia_core::session::{QuizSession, SessionStatus, Submission};

/// Render snapshot of a session.
///
/// This is intentionally **not** formatted for a particular front-end; it only exposes
/// what is visible at this moment. The correct answer is withheld until the current
/// question is locked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub status: SessionStatus,
    pub kind: SessionKind,
    /// 1-based position of the current question; 0 when none is shown.
    pub question_number: usize,
    pub total: usize,
    pub question: Option<String>,
    pub answers: Vec<String>,
    pub submitted: Option<Submission>,
    pub correct_answer: Option<String>,
    pub score: u32,
    pub time_remaining: u32,
    pub low_time: bool,
    pub failure: Option<&'static str>,
}

impl SessionView {
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Self {
        let current = session.current_question();
        let in_progress = session.status() == SessionStatus::InProgress;
        let locked = session.is_locked();

        Self {
            status: session.status(),
            kind: session.kind(),
            question_number: current.map_or(0, |_| session.current_index() + 1),
            total: session.total(),
            question: current.map(|q| q.text().to_string()),
            answers: if in_progress {
                session.presented_answers().to_vec()
            } else {
                Vec::new()
            },
            submitted: session.submitted().cloned(),
            correct_answer: current
                .filter(|_| locked)
                .map(|q| q.correct_answer().to_string()),
            score: session.score(),
            time_remaining: session.time_remaining(),
            low_time: in_progress && !locked && session.time_remaining() <= LOW_TIME_THRESHOLD_SECS,
            failure: session.failure().map(|f| f.message()),
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.submitted.is_some()
    }

    /// "Time's up!" once the countdown expired on the current question.
    #[must_use]
    pub fn timed_out(&self) -> bool {
        matches!(self.submitted, Some(Submission::TimedOut))
    }
}
