//! Quiz session state machine.
//!
//! `QuizSession` is a plain reducer: every mutation goes through one of its operations,
//! and anything scheduled outside of it (fetches, countdown ticks, feedback delays) carries
//! a ticket so late arrivals can be recognised and dropped.

use rand::Rng;
use std::fmt;
use thiserror::Error;

use crate::model::{AnswerMark, CountdownTable, Question, QuizResult, Selection, SessionKind};
use crate::shuffle::present_answers;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("cannot {operation} while {status}")]
    InvalidTransition {
        operation: &'static str,
        status: SessionStatus,
    },

    #[error("current question has not been answered yet")]
    NotLocked,

    #[error("completion already recorded")]
    CompletionAlreadyRecorded,
}

/// Why a session could not be started. All variants share one user-facing message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadFailure {
    #[error("question provider failed: {detail}")]
    Fetch { detail: String },

    #[error("question provider returned no questions")]
    EmptyResult,

    #[error("invalid quiz selection")]
    InvalidSelection,
}

impl LoadFailure {
    pub const MESSAGE: &'static str = "Could not load questions. Please try again.";

    #[must_use]
    pub fn message(&self) -> &'static str {
        Self::MESSAGE
    }
}

//
// ─── STATUS & TICKETS ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Selecting,
    Loading,
    InProgress,
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionStatus::Selecting => "selecting",
            SessionStatus::Loading => "loading",
            SessionStatus::InProgress => "in progress",
            SessionStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// Identity of one run. Bumped on every start and reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionGeneration(u64);

impl SessionGeneration {
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Issued by `begin_loading`; a fetch result is only applied if its ticket is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: SessionGeneration,
}

impl LoadTicket {
    #[must_use]
    pub fn generation(&self) -> SessionGeneration {
        self.generation
    }
}

/// Identifies one question of one run; countdown and advance events carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuestionTicket {
    generation: SessionGeneration,
    index: usize,
}

impl QuestionTicket {
    #[must_use]
    pub fn generation(&self) -> SessionGeneration {
        self.generation
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// What was recorded for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Answered(String),
    TimedOut,
}

impl Submission {
    #[must_use]
    pub fn answer(&self) -> Option<&str> {
        match self {
            Submission::Answered(answer) => Some(answer),
            Submission::TimedOut => None,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Submission::TimedOut)
    }
}

/// Result of locking in an answer (or a timeout) for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub ticket: QuestionTicket,
    pub submission: Submission,
    pub correct: bool,
    pub correct_answer: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Started { total: usize },
    Failed(LoadFailure),
    /// The ticket belongs to a run that was reset or superseded.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Recorded(AnswerFeedback),
    /// The question was already locked.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Remaining(u32),
    Expired(AnswerFeedback),
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Next { ticket: QuestionTicket },
    Completed(QuizResult),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz attempt, from selection through completion.
#[derive(Debug, Clone)]
pub struct QuizSession {
    countdown: CountdownTable,
    status: SessionStatus,
    kind: SessionKind,
    generation: SessionGeneration,
    selection: Option<Selection>,
    questions: Vec<Question>,
    current: usize,
    score: u32,
    presented: Vec<String>,
    submitted: Option<Submission>,
    time_remaining: u32,
    failure: Option<LoadFailure>,
    marks: Vec<AnswerMark>,
    completion_recorded: bool,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new(CountdownTable::default())
    }
}

impl QuizSession {
    #[must_use]
    pub fn new(countdown: CountdownTable) -> Self {
        Self {
            countdown,
            status: SessionStatus::Selecting,
            kind: SessionKind::Custom,
            generation: SessionGeneration::default(),
            selection: None,
            questions: Vec::new(),
            current: 0,
            score: 0,
            presented: Vec::new(),
            submitted: None,
            time_remaining: 0,
            failure: None,
            marks: Vec::new(),
            completion_recorded: false,
        }
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    #[must_use]
    pub fn generation(&self) -> SessionGeneration {
        self.generation
    }

    #[must_use]
    pub fn countdown(&self) -> &CountdownTable {
        &self.countdown
    }

    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.status {
            SessionStatus::InProgress | SessionStatus::Completed => self.questions.get(self.current),
            SessionStatus::Selecting | SessionStatus::Loading => None,
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn presented_answers(&self) -> &[String] {
        &self.presented
    }

    #[must_use]
    pub fn submitted(&self) -> Option<&Submission> {
        self.submitted.as_ref()
    }

    /// True once an answer (or timeout) is recorded for the current question.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.submitted.is_some()
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn failure(&self) -> Option<&LoadFailure> {
        self.failure.as_ref()
    }

    #[must_use]
    pub fn marks(&self) -> &[AnswerMark] {
        &self.marks
    }

    /// Ticket for the question currently on screen, if a run is in progress.
    #[must_use]
    pub fn question_ticket(&self) -> Option<QuestionTicket> {
        (self.status == SessionStatus::InProgress).then_some(QuestionTicket {
            generation: self.generation,
            index: self.current,
        })
    }

    /// Returns true if `ticket` still refers to the question on screen.
    #[must_use]
    pub fn is_current(&self, ticket: QuestionTicket) -> bool {
        self.question_ticket() == Some(ticket)
    }

    /// Final tally, available once the session is completed.
    #[must_use]
    pub fn result(&self) -> Option<QuizResult> {
        if self.status != SessionStatus::Completed {
            return None;
        }
        let selection = self.selection?;
        Some(QuizResult {
            kind: self.kind,
            selection,
            score: self.score,
            total: u32::try_from(self.questions.len()).unwrap_or(u32::MAX),
            marks: self.marks.clone(),
        })
    }

    /// Move from `Selecting` to `Loading` for the given selection.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidTransition` unless the session is selecting.
    pub fn begin_loading(
        &mut self,
        selection: Selection,
        kind: SessionKind,
    ) -> Result<LoadTicket, SessionStateError> {
        self.require(SessionStatus::Selecting, "start a session")?;

        self.clear_run();
        self.generation.bump();
        self.selection = Some(selection);
        self.kind = kind;
        self.failure = None;
        self.status = SessionStatus::Loading;

        Ok(LoadTicket {
            generation: self.generation,
        })
    }

    /// Apply the provider's answer to a pending load.
    ///
    /// A non-empty batch starts the run at question 0; an empty batch or an error sends the
    /// session back to `Selecting` with the failure attached. Results for a superseded
    /// ticket are reported as `Stale` and change nothing.
    pub fn finish_loading<R: Rng + ?Sized>(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Question>, LoadFailure>,
        rng: &mut R,
    ) -> LoadOutcome {
        if ticket.generation != self.generation || self.status != SessionStatus::Loading {
            return LoadOutcome::Stale;
        }
        let Some(selection) = self.selection else {
            return self.fail(LoadFailure::InvalidSelection);
        };

        match result {
            Ok(mut questions) if !questions.is_empty() => {
                let limit = usize::try_from(selection.question_count()).unwrap_or(usize::MAX);
                questions.truncate(limit);

                self.questions = questions;
                self.current = 0;
                self.score = 0;
                self.marks.clear();
                self.status = SessionStatus::InProgress;
                self.prepare_current(rng);

                LoadOutcome::Started {
                    total: self.questions.len(),
                }
            }
            Ok(_) => self.fail(LoadFailure::EmptyResult),
            Err(failure) => self.fail(failure),
        }
    }

    /// Record the user's answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidTransition` unless a run is in progress.
    pub fn submit(&mut self, answer: &str) -> Result<SubmitOutcome, SessionStateError> {
        self.require(SessionStatus::InProgress, "submit an answer")?;
        if self.is_locked() {
            return Ok(SubmitOutcome::Ignored);
        }
        Ok(SubmitOutcome::Recorded(
            self.record(Submission::Answered(answer.to_string())),
        ))
    }

    /// One countdown second elapsed for the question identified by `ticket`.
    ///
    /// When the countdown reaches zero a `TimedOut` submission is recorded. Ticks for other
    /// questions, other runs, or an already locked question are ignored.
    pub fn tick(&mut self, ticket: QuestionTicket) -> TickOutcome {
        if !self.is_current(ticket) || self.is_locked() {
            return TickOutcome::Ignored;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            TickOutcome::Expired(self.record(Submission::TimedOut))
        } else {
            TickOutcome::Remaining(self.time_remaining)
        }
    }

    /// Leave a locked question: show the next one, or complete the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidTransition` unless a run is in progress, and
    /// `SessionStateError::NotLocked` if the current question is still awaiting an answer.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<AdvanceOutcome, SessionStateError> {
        self.require(SessionStatus::InProgress, "advance")?;
        if !self.is_locked() {
            return Err(SessionStateError::NotLocked);
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.prepare_current(rng);
            let ticket = QuestionTicket {
                generation: self.generation,
                index: self.current,
            };
            return Ok(AdvanceOutcome::Next { ticket });
        }

        self.status = SessionStatus::Completed;
        self.time_remaining = 0;
        self.result()
            .map(AdvanceOutcome::Completed)
            .ok_or(SessionStateError::InvalidTransition {
                operation: "complete",
                status: self.status,
            })
    }

    /// Drop everything and go back to `Selecting`. Valid from any state.
    pub fn reset(&mut self) {
        self.clear_run();
        self.generation.bump();
        self.selection = None;
        self.kind = SessionKind::Custom;
        self.failure = None;
        self.status = SessionStatus::Selecting;
    }

    /// Hand out the final result exactly once per completed session.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidTransition` if the session is not completed and
    /// `SessionStateError::CompletionAlreadyRecorded` on repeat calls.
    pub fn record_completion(&mut self) -> Result<QuizResult, SessionStateError> {
        self.require(SessionStatus::Completed, "record completion")?;
        if self.completion_recorded {
            return Err(SessionStateError::CompletionAlreadyRecorded);
        }
        let result = self.result().ok_or(SessionStateError::InvalidTransition {
            operation: "record completion",
            status: self.status,
        })?;
        self.completion_recorded = true;
        Ok(result)
    }

    fn require(
        &self,
        status: SessionStatus,
        operation: &'static str,
    ) -> Result<(), SessionStateError> {
        if self.status == status {
            Ok(())
        } else {
            Err(SessionStateError::InvalidTransition {
                operation,
                status: self.status,
            })
        }
    }

    fn record(&mut self, submission: Submission) -> AnswerFeedback {
        let (correct, correct_answer) = match self.questions.get(self.current) {
            Some(question) => (
                submission
                    .answer()
                    .is_some_and(|answer| question.is_correct(answer)),
                question.correct_answer().to_string(),
            ),
            None => (false, String::new()),
        };

        if correct {
            self.score = self.score.saturating_add(1);
        }
        self.marks.push(match (&submission, correct) {
            (_, true) => AnswerMark::Correct,
            (Submission::TimedOut, false) => AnswerMark::TimedOut,
            (Submission::Answered(_), false) => AnswerMark::Wrong,
        });
        self.submitted = Some(submission.clone());

        AnswerFeedback {
            ticket: QuestionTicket {
                generation: self.generation,
                index: self.current,
            },
            submission,
            correct,
            correct_answer,
            score: self.score,
        }
    }

    fn prepare_current<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.submitted = None;
        self.presented = self
            .questions
            .get(self.current)
            .map(|q| present_answers(q, rng))
            .unwrap_or_default();
        self.time_remaining = self
            .selection
            .map_or(0, |s| self.countdown.seconds_for(s.difficulty()));
    }

    fn fail(&mut self, failure: LoadFailure) -> LoadOutcome {
        self.clear_run();
        self.selection = None;
        self.failure = Some(failure.clone());
        self.status = SessionStatus::Selecting;
        LoadOutcome::Failed(failure)
    }

    fn clear_run(&mut self) {
        self.questions.clear();
        self.current = 0;
        self.score = 0;
        self.presented.clear();
        self.submitted = None;
        self.time_remaining = 0;
        self.marks.clear();
        self.completion_recorded = false;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
