use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use services::error::ProviderError;
use services::provider::{QuestionProvider, QuestionRequest};
use services::{AppServices, QuizSettings, SessionError, SessionUpdate};
use storage::repository::Storage;
use trivia_core::model::{AnswerMark, Difficulty, Question, Selection, Sport, UpsertOutcome};
use trivia_core::session::{LoadFailure, SessionStatus, Submission};
use trivia_core::time::fixed_clock;

struct ScriptedProvider {
    questions: Vec<Question>,
    delay: Duration,
}

impl ScriptedProvider {
    fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl QuestionProvider for ScriptedProvider {
    async fn fetch_questions(
        &self,
        _request: &QuestionRequest,
    ) -> Result<Vec<Question>, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.questions.clone())
    }

    async fn fetch_daily(&self) -> Result<Vec<Question>, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.questions.clone())
    }

    async fn list_difficulties(&self) -> Result<Vec<Difficulty>, ProviderError> {
        Ok(Difficulty::ALL.to_vec())
    }
}

fn batch(len: usize, difficulty: Difficulty) -> Vec<Question> {
    (0..len)
        .map(|n| {
            Question::new(
                format!("Question {n}?"),
                format!("right {n}"),
                vec![format!("wrong {n}a"), format!("wrong {n}b"), format!("wrong {n}c")],
                difficulty,
                Sport::Soccer,
            )
            .unwrap()
        })
        .collect()
}

fn services(provider: ScriptedProvider, settings: QuizSettings) -> (AppServices, Storage) {
    let storage = Storage::in_memory();
    let services =
        AppServices::from_parts(settings, fixed_clock(), &storage, Arc::new(provider));
    (services, storage)
}

#[tokio::test(start_paused = true)]
async fn full_run_with_answer_wrong_answer_and_timeout() {
    let (services, _storage) = services(
        ScriptedProvider::new(batch(3, Difficulty::Easy)),
        QuizSettings::default(),
    );
    let mut session = services.session_loop().with_seed(7);
    session.set_nickname("ace").await.unwrap();

    session
        .start(Selection::new(Difficulty::Easy, Sport::Soccer, 3).unwrap())
        .unwrap();
    assert_eq!(
        session.next_update().await,
        Some(SessionUpdate::Started { total: 3 })
    );
    assert_eq!(session.view().time_remaining, 15);
    assert_eq!(session.view().question_number, 1);

    let right = session
        .session()
        .current_question()
        .unwrap()
        .correct_answer()
        .to_string();
    let feedback = session.submit_answer(&right).unwrap().unwrap();
    assert!(feedback.correct);
    assert_eq!(session.submit_answer(&right).unwrap(), None);

    assert_eq!(
        session.next_update().await,
        Some(SessionUpdate::Advanced { index: 1 })
    );
    assert_eq!(session.view().time_remaining, 15);
    assert_eq!(session.view().score, 1);

    let feedback = session.submit_answer("not it").unwrap().unwrap();
    assert!(!feedback.correct);
    assert_eq!(
        session.next_update().await,
        Some(SessionUpdate::Advanced { index: 2 })
    );

    for remaining in (1..15).rev() {
        assert_eq!(
            session.next_update().await,
            Some(SessionUpdate::Tick { remaining })
        );
    }
    match session.next_update().await {
        Some(SessionUpdate::Answered(feedback)) => {
            assert_eq!(feedback.submission, Submission::TimedOut);
            assert_eq!(feedback.score, 1);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(session.view().timed_out());

    let report = match session.next_update().await {
        Some(SessionUpdate::Completed(report)) => report,
        other => panic!("expected completion, got {other:?}"),
    };
    assert_eq!(report.result.score, 1);
    assert_eq!(report.result.total, 3);
    assert_eq!(
        report.result.marks,
        [AnswerMark::Correct, AnswerMark::Wrong, AnswerMark::TimedOut]
    );
    assert_eq!(report.leaderboard, Some(UpsertOutcome::Inserted));
    assert!(report.fully_persisted());
    assert_eq!(session.view().status, SessionStatus::Completed);

    let board = services.leaderboard().today().await.unwrap();
    assert_eq!(board.entries().len(), 1);
    assert_eq!(board.entries()[0].score, 1);
    assert_eq!(board.entries()[0].difficulty, Difficulty::Easy);

    // Nothing is left running once the quiz is over.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(!session.has_pending_work());
}

#[tokio::test(start_paused = true)]
async fn empty_batch_returns_to_selection() {
    let (services, _storage) = services(ScriptedProvider::new(Vec::new()), QuizSettings::default());
    let mut session = services.session_loop();

    session
        .start(Selection::new(Difficulty::Medium, Sport::All, 5).unwrap())
        .unwrap();
    assert_eq!(
        session.next_update().await,
        Some(SessionUpdate::LoadFailed(LoadFailure::EmptyResult))
    );
    let view = session.view();
    assert_eq!(view.status, SessionStatus::Selecting);
    assert_eq!(view.failure, Some(LoadFailure::MESSAGE));
    assert!(!session.has_pending_work());
}

#[tokio::test(start_paused = true)]
async fn reset_while_loading_drops_the_fetch() {
    let mut provider = ScriptedProvider::new(batch(3, Difficulty::Hard));
    provider.delay = Duration::from_secs(5);
    let (services, _storage) = services(provider, QuizSettings::default());
    let mut session = services.session_loop();

    session
        .start(Selection::new(Difficulty::Hard, Sport::Soccer, 3).unwrap())
        .unwrap();
    session.reset();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(!session.has_pending_work());
    assert_eq!(session.view().status, SessionStatus::Selecting);
}

#[tokio::test(start_paused = true)]
async fn stale_fetch_result_is_skipped() {
    let (services, _storage) = services(
        ScriptedProvider::new(batch(4, Difficulty::Hard)),
        QuizSettings::default(),
    );
    let mut session = services.session_loop();

    session
        .start(Selection::new(Difficulty::Hard, Sport::Soccer, 4).unwrap())
        .unwrap();
    // Let the first fetch finish and queue its result.
    tokio::time::sleep(Duration::from_millis(1)).await;
    session.reset();
    session
        .start(Selection::new(Difficulty::Hard, Sport::Soccer, 2).unwrap())
        .unwrap();

    assert_eq!(
        session.next_update().await,
        Some(SessionUpdate::Started { total: 2 })
    );
    assert_eq!(session.view().time_remaining, 4);
}

#[tokio::test(start_paused = true)]
async fn daily_quiz_can_only_be_finished_once_per_day() {
    let settings = QuizSettings {
        feedback_delay: Duration::ZERO,
        ..QuizSettings::default()
    };
    let (services, _storage) = services(
        ScriptedProvider::new(batch(5, Difficulty::Medium)),
        settings,
    );
    let mut session = services.session_loop();

    session.start_daily().await.unwrap();
    assert_eq!(
        session.next_update().await,
        Some(SessionUpdate::Started { total: 5 })
    );

    let mut completed = None;
    while completed.is_none() {
        let right = session
            .session()
            .current_question()
            .unwrap()
            .correct_answer()
            .to_string();
        session.submit_answer(&right).unwrap();
        match session.next_update().await {
            Some(SessionUpdate::Advanced { .. }) => {}
            Some(SessionUpdate::Completed(report)) => completed = Some(report),
            other => panic!("unexpected update {other:?}"),
        }
    }
    let report = completed.unwrap();
    assert_eq!(report.result.score, 5);
    assert_eq!(report.result.headline(), "Daily Quiz");
    // No nickname was set, so nothing went to the leaderboard.
    assert_eq!(report.leaderboard, None);
    assert!(services.daily_quiz().already_played_today().await.unwrap());

    session.reset();
    assert!(matches!(
        session.start_daily().await,
        Err(SessionError::DailyAlreadyPlayed)
    ));
}

#[tokio::test]
async fn submitting_outside_a_quiz_is_rejected() {
    let (services, _storage) = services(ScriptedProvider::new(Vec::new()), QuizSettings::default());
    let mut session = services.session_loop();
    assert!(matches!(
        session.submit_answer("anything"),
        Err(SessionError::State(_))
    ));
}
