use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use trivia_core::model::{CountdownTable, Nickname, Question, Selection, SessionKind};
use trivia_core::session::{
    AdvanceOutcome, AnswerFeedback, LoadFailure, LoadOutcome, LoadTicket, QuestionTicket,
    QuizSession, SubmitOutcome, TickOutcome,
};

use super::events::{CompletionReport, SessionEvent, SessionUpdate};
use super::timer::{CountdownTimer, DelayedAdvance};
use super::view::SessionView;
use crate::config::DEFAULT_FEEDBACK_DELAY_MS;
use crate::daily_quiz_service::DailyQuizService;
use crate::error::SessionError;
use crate::leaderboard_service::LeaderboardService;
use crate::profile_service::ProfileService;
use crate::provider::{QuestionProvider, QuestionRequest};

/// Drives one `QuizSession` from user intents and deferred events.
///
/// Intents (`start`, `submit_answer`, `reset`, ...) are applied immediately. Fetch
/// results, countdown ticks and feedback delays arrive as queued events and are applied
/// one at a time by [`SessionLoop::next_update`].
pub struct SessionLoop {
    session: QuizSession,
    provider: Arc<dyn QuestionProvider>,
    leaderboard: Arc<LeaderboardService>,
    profile: Arc<ProfileService>,
    daily: Arc<DailyQuizService>,
    rng: StdRng,
    feedback_delay: Duration,
    countdown: CountdownTimer,
    advance: DelayedAdvance,
    fetch: Option<JoinHandle<()>>,
    events_tx: UnboundedSender<SessionEvent>,
    events_rx: UnboundedReceiver<SessionEvent>,
}

impl SessionLoop {
    #[must_use]
    pub fn new(
        provider: Arc<dyn QuestionProvider>,
        leaderboard: Arc<LeaderboardService>,
        profile: Arc<ProfileService>,
        daily: Arc<DailyQuizService>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            session: QuizSession::default(),
            provider,
            leaderboard,
            profile,
            daily,
            rng: StdRng::from_os_rng(),
            feedback_delay: Duration::from_millis(DEFAULT_FEEDBACK_DELAY_MS),
            countdown: CountdownTimer::new(),
            advance: DelayedAdvance::new(),
            fetch: None,
            events_tx,
            events_rx,
        }
    }

    #[must_use]
    pub fn with_countdown(mut self, table: CountdownTable) -> Self {
        self.session = QuizSession::new(table);
        self
    }

    /// Pause between locking an answer and showing the next question. Zero advances on
    /// the next update.
    #[must_use]
    pub fn with_feedback_delay(mut self, delay: Duration) -> Self {
        self.feedback_delay = delay;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView::from_session(&self.session)
    }

    /// True while a fetch, countdown or feedback delay may still produce an update.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        self.fetch.as_ref().is_some_and(|h| !h.is_finished())
            || self.countdown.is_running()
            || self.advance.is_pending()
            || !self.events_rx.is_empty()
    }

    /// Begin a custom quiz. The questions arrive as `SessionUpdate::Started` or
    /// `SessionUpdate::LoadFailed`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::State` unless the session is on the selection screen.
    pub fn start(&mut self, selection: Selection) -> Result<(), SessionError> {
        let ticket = self.session.begin_loading(selection, SessionKind::Custom)?;
        log::info!("starting {} quiz", selection.preset_slug());

        let provider = Arc::clone(&self.provider);
        let request = QuestionRequest::from(&selection);
        self.spawn_fetch(ticket, async move {
            provider
                .fetch_questions(&request)
                .await
                .map_err(LoadFailure::from)
        });
        Ok(())
    }

    /// Begin today's daily quiz.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::DailyAlreadyPlayed` if it was finished today,
    /// `SessionError::Storage` if that cannot be checked, and `SessionError::State`
    /// unless the session is on the selection screen.
    pub async fn start_daily(&mut self) -> Result<(), SessionError> {
        if self.daily.already_played_today().await? {
            return Err(SessionError::DailyAlreadyPlayed);
        }
        let ticket = self
            .session
            .begin_loading(Selection::daily(), SessionKind::Daily)?;
        log::info!("starting daily quiz");

        let provider = Arc::clone(&self.provider);
        self.spawn_fetch(ticket, async move {
            provider.fetch_daily().await.map_err(LoadFailure::from)
        });
        Ok(())
    }

    /// Lock in an answer for the current question. Returns `None` if it was already locked.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::State` unless a quiz is in progress.
    pub fn submit_answer(&mut self, answer: &str) -> Result<Option<AnswerFeedback>, SessionError> {
        match self.session.submit(answer)? {
            SubmitOutcome::Recorded(feedback) => {
                log::debug!(
                    "question {} answered, correct: {}",
                    feedback.ticket.index(),
                    feedback.correct
                );
                self.on_locked(feedback.ticket);
                Ok(Some(feedback))
            }
            SubmitOutcome::Ignored => Ok(None),
        }
    }

    /// Abandon the current run and return to the selection screen.
    pub fn reset(&mut self) {
        self.countdown.cancel();
        self.advance.cancel();
        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
        self.session.reset();
        log::debug!("session reset");
    }

    /// Store today's nickname; later completions are recorded under it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Profile` for an invalid name or a storage failure.
    pub async fn set_nickname(&mut self, raw: &str) -> Result<Nickname, SessionError> {
        Ok(self.profile.set_nickname(raw).await?)
    }

    /// Wait for the next deferred event and apply it. Stale events are skipped.
    ///
    /// Returns `None` only if the event channel closed.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        loop {
            let event = self.next_event().await?;
            if let Some(update) = self.apply(event).await {
                return Some(update);
            }
        }
    }

    /// Wait for the next queued event without applying it.
    ///
    /// Cancel-safe, so it can sit in a `tokio::select!` next to user input; pass the
    /// event to [`SessionLoop::apply`] outside the select.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// Apply one event. Returns `None` for stale events.
    pub async fn apply(&mut self, event: SessionEvent) -> Option<SessionUpdate> {
        match event {
            SessionEvent::Loaded { ticket, result } => self.on_loaded(ticket, result),
            SessionEvent::Tick { ticket } => match self.session.tick(ticket) {
                TickOutcome::Remaining(remaining) => Some(SessionUpdate::Tick { remaining }),
                TickOutcome::Expired(feedback) => {
                    log::debug!("question {} timed out", feedback.ticket.index());
                    self.on_locked(feedback.ticket);
                    Some(SessionUpdate::Answered(feedback))
                }
                TickOutcome::Ignored => None,
            },
            SessionEvent::AdvanceDue { ticket } => self.on_advance_due(ticket).await,
        }
    }

    fn on_loaded(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Question>, LoadFailure>,
    ) -> Option<SessionUpdate> {
        match self.session.finish_loading(ticket, result, &mut self.rng) {
            LoadOutcome::Started { total } => {
                self.fetch = None;
                log::info!("quiz started with {total} questions");
                self.start_countdown();
                Some(SessionUpdate::Started { total })
            }
            LoadOutcome::Failed(failure) => {
                self.fetch = None;
                self.countdown.cancel();
                log::warn!("could not load questions: {failure}");
                Some(SessionUpdate::LoadFailed(failure))
            }
            LoadOutcome::Stale => {
                log::debug!("dropping stale fetch result");
                None
            }
        }
    }

    async fn on_advance_due(&mut self, ticket: QuestionTicket) -> Option<SessionUpdate> {
        if !self.session.is_current(ticket) {
            return None;
        }
        match self.session.advance(&mut self.rng) {
            Ok(AdvanceOutcome::Next { ticket }) => {
                self.start_countdown();
                Some(SessionUpdate::Advanced {
                    index: ticket.index(),
                })
            }
            Ok(AdvanceOutcome::Completed(_)) => {
                self.countdown.cancel();
                self.complete().await.map(SessionUpdate::Completed)
            }
            Err(err) => {
                log::warn!("advance rejected: {err}");
                None
            }
        }
    }

    /// One-time completion bookkeeping. Persistence failures are logged and reported,
    /// never fatal.
    async fn complete(&mut self) -> Option<CompletionReport> {
        let result = match self.session.record_completion() {
            Ok(result) => result,
            Err(err) => {
                log::warn!("completion not recorded: {err}");
                return None;
            }
        };
        log::info!(
            "quiz completed: {}/{} ({}%)",
            result.score,
            result.total,
            result.percentage()
        );

        let mut persistence_errors = Vec::new();
        let mut leaderboard = None;

        match self.profile.nickname_for_today().await {
            Ok(Some(nickname)) => match self.leaderboard.record(&nickname, &result).await {
                Ok(outcome) => leaderboard = Some(outcome),
                Err(err) => {
                    log::warn!("leaderboard update failed: {err}");
                    persistence_errors.push(format!("leaderboard: {err}"));
                }
            },
            Ok(None) => {}
            Err(err) => {
                log::warn!("nickname lookup failed: {err}");
                persistence_errors.push(format!("nickname: {err}"));
            }
        }

        if result.kind == SessionKind::Daily {
            if let Err(err) = self.daily.mark_played().await {
                log::warn!("daily quiz flag not saved: {err}");
                persistence_errors.push(format!("daily quiz: {err}"));
            }
        }

        Some(CompletionReport {
            result,
            leaderboard,
            persistence_errors,
        })
    }

    fn on_locked(&mut self, ticket: QuestionTicket) {
        self.countdown.cancel();
        if self.feedback_delay.is_zero() {
            let _ = self.events_tx.send(SessionEvent::AdvanceDue { ticket });
        } else {
            self.advance
                .start(self.feedback_delay, ticket, self.events_tx.clone());
        }
    }

    fn start_countdown(&mut self) {
        if let Some(ticket) = self.session.question_ticket() {
            self.countdown.start(
                self.session.time_remaining(),
                ticket,
                self.events_tx.clone(),
            );
        }
    }

    fn spawn_fetch<F>(&mut self, ticket: LoadTicket, fetch: F)
    where
        F: Future<Output = Result<Vec<Question>, LoadFailure>> + Send + 'static,
    {
        if let Some(previous) = self.fetch.take() {
            previous.abort();
        }
        let events = self.events_tx.clone();
        self.fetch = Some(tokio::spawn(async move {
            let result = fetch.await;
            let _ = events.send(SessionEvent::Loaded { ticket, result });
        }));
    }
}

impl Drop for SessionLoop {
    fn drop(&mut self) {
        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
    }
}
