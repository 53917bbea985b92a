//! Line-oriented terminal front-end: selection menus, the question screen and results.

use std::error::Error;
use std::io::{self, Write};

use services::error::SessionError;
use services::sessions::SessionEvent;
use services::share::ShareError;
use services::{
    AppServices, Clock, CompletionReport, LeaderboardService, ProfileService, SessionLoop,
    SessionUpdate, SessionView, ShareTarget, share_results,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use trivia_core::model::{Difficulty, QUESTION_COUNT_CHOICES, Selection, Sport, UpsertOutcome};
use trivia_core::session::{AnswerFeedback, LoadFailure, SessionStatus, Submission};

/// Buffered stdin, one trimmed line at a time.
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    #[must_use]
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Next input line, `None` at end of input. Cancel-safe.
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }

    async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        print!("{question} ");
        io::stdout().flush()?;
        self.next_line().await
    }

    /// Ask until the answer is a number in `1..=max`. `None` on end of input or `q`.
    async fn choose(&mut self, question: &str, max: usize) -> io::Result<Option<usize>> {
        loop {
            let Some(line) = self.ask(question).await? else {
                return Ok(None);
            };
            if line.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            match parse_choice(&line, max) {
                Some(choice) => return Ok(Some(choice)),
                None => println!("Pick a number from 1 to {max}."),
            }
        }
    }
}

/// 0-based index for a 1-based menu entry.
fn parse_choice(raw: &str, max: usize) -> Option<usize> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=max).contains(n))
        .map(|n| n - 1)
}

/// Prints the cookie notice until it has been accepted once.
///
/// # Errors
///
/// Returns an error if stdin or the profile storage fails.
pub async fn ensure_consent(
    profile: &ProfileService,
    prompt: &mut Prompt,
) -> Result<(), Box<dyn Error>> {
    if profile.consent_accepted().await? {
        return Ok(());
    }
    println!("This game stores your nickname, daily scores and daily quiz progress locally.");
    if let Some(answer) = prompt.ask("Accept? [y/N]").await? {
        if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
            profile.accept_consent().await?;
        }
    }
    Ok(())
}

/// Difficulty, sport and question count menus. `None` if the user quit.
async fn choose_selection(prompt: &mut Prompt) -> Result<Option<Selection>, Box<dyn Error>> {
    println!();
    println!("Difficulty:");
    for (n, difficulty) in Difficulty::ALL.iter().enumerate() {
        println!("  {}. {}", n + 1, difficulty.label());
    }
    let Some(difficulty) = prompt.choose(">", Difficulty::ALL.len()).await? else {
        return Ok(None);
    };

    println!("Sport:");
    for (n, sport) in Sport::ALL.iter().enumerate() {
        println!("  {}. {}", n + 1, sport.label());
    }
    let Some(sport) = prompt.choose(">", Sport::ALL.len()).await? else {
        return Ok(None);
    };

    println!("Questions:");
    for (n, count) in QUESTION_COUNT_CHOICES.iter().enumerate() {
        println!("  {}. {count}", n + 1);
    }
    let Some(count) = prompt.choose(">", QUESTION_COUNT_CHOICES.len()).await? else {
        return Ok(None);
    };

    Ok(Some(Selection::new(
        Difficulty::ALL[difficulty],
        Sport::ALL[sport],
        QUESTION_COUNT_CHOICES[count],
    )?))
}

/// How the first quiz of a `play` run is started.
#[derive(Debug, Clone, Copy)]
pub enum Start {
    Daily,
    /// `None` opens the selection menus.
    Custom(Option<Selection>),
}

enum QuizEnd {
    Completed(CompletionReport),
    LoadFailed(LoadFailure),
    Quit,
}

enum Input {
    Event(Option<SessionEvent>),
    Line(io::Result<Option<String>>),
}

/// Play quizzes until the user quits.
///
/// # Errors
///
/// Returns an error if stdin fails or a storage check needed to start a quiz fails.
pub async fn play(
    services: &AppServices,
    share: &dyn ShareTarget,
    clock: Clock,
    start: Start,
    prompt: &mut Prompt,
) -> Result<(), Box<dyn Error>> {
    let mut session = services.session_loop();
    let mut next = start;

    loop {
        match next {
            Start::Daily => match session.start_daily().await {
                Ok(()) => {}
                Err(SessionError::DailyAlreadyPlayed) => {
                    println!("You already played today's daily quiz. Come back tomorrow!");
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            },
            Start::Custom(selection) => {
                let selection = match selection {
                    Some(selection) => selection,
                    None => match choose_selection(prompt).await? {
                        Some(selection) => selection,
                        None => return Ok(()),
                    },
                };
                session.start(selection)?;
            }
        }
        println!("Loading questions...");

        match run_quiz(&mut session, prompt).await? {
            QuizEnd::Completed(report) => {
                render_report(&report);
                if !after_results(share, &report, clock, prompt).await? {
                    return Ok(());
                }
                session.reset();
                next = Start::Custom(None);
            }
            QuizEnd::LoadFailed(failure) => {
                println!("{}", failure.message());
                next = Start::Custom(None);
            }
            QuizEnd::Quit => {
                session.reset();
                return Ok(());
            }
        }
    }
}

async fn run_quiz(session: &mut SessionLoop, prompt: &mut Prompt) -> io::Result<QuizEnd> {
    loop {
        let view = session.view();
        let accepting = view.status == SessionStatus::InProgress && !view.is_locked();

        let input = tokio::select! {
            event = session.next_event() => Input::Event(event),
            line = prompt.next_line(), if accepting => Input::Line(line),
        };

        match input {
            Input::Event(None) => return Ok(QuizEnd::Quit),
            Input::Event(Some(event)) => {
                let Some(update) = session.apply(event).await else {
                    continue;
                };
                match update {
                    SessionUpdate::Started { .. } | SessionUpdate::Advanced { .. } => {
                        render_question(&session.view())?;
                    }
                    SessionUpdate::Tick { remaining } => {
                        render_tick(remaining, session.view().low_time)?;
                    }
                    SessionUpdate::Answered(feedback) => render_feedback(&feedback),
                    SessionUpdate::LoadFailed(failure) => return Ok(QuizEnd::LoadFailed(failure)),
                    SessionUpdate::Completed(report) => return Ok(QuizEnd::Completed(report)),
                }
            }
            Input::Line(line) => {
                let Some(line) = line? else {
                    return Ok(QuizEnd::Quit);
                };
                if line.eq_ignore_ascii_case("q") {
                    return Ok(QuizEnd::Quit);
                }
                let Some(choice) = parse_choice(&line, view.answers.len()) else {
                    println!("Pick a number from 1 to {}, or q to quit.", view.answers.len());
                    continue;
                };
                match session.submit_answer(&view.answers[choice]) {
                    Ok(Some(feedback)) => render_feedback(&feedback),
                    Ok(None) => {}
                    Err(err) => log::warn!("answer rejected: {err}"),
                }
            }
        }
    }
}

fn render_question(view: &SessionView) -> io::Result<()> {
    println!();
    println!(
        "Question {}/{}    Score: {}",
        view.question_number, view.total, view.score
    );
    if let Some(question) = &view.question {
        println!("{question}");
    }
    for (n, answer) in view.answers.iter().enumerate() {
        println!("  {}. {answer}", n + 1);
    }
    render_tick(view.time_remaining, view.low_time)
}

fn render_tick(remaining: u32, low_time: bool) -> io::Result<()> {
    let marker = if low_time { "!" } else { " " };
    print!("\r  {remaining:>2}s{marker} > ");
    io::stdout().flush()
}

fn render_feedback(feedback: &AnswerFeedback) {
    println!();
    match (&feedback.submission, feedback.correct) {
        (Submission::TimedOut, _) => {
            println!("Time's up! The answer was {}.", feedback.correct_answer);
        }
        (Submission::Answered(_), true) => println!("Correct!"),
        (Submission::Answered(_), false) => {
            println!("Wrong! The answer was {}.", feedback.correct_answer);
        }
    }
}

fn render_report(report: &CompletionReport) {
    let result = &report.result;
    println!();
    println!("{}", result.headline());
    println!(
        "You scored {}/{} ({}%)",
        result.score,
        result.total,
        result.percentage()
    );
    let marks: String = result.marks.iter().map(|mark| mark.symbol()).collect();
    println!("{marks}");

    match report.leaderboard {
        Some(UpsertOutcome::Inserted) => println!("Added to today's leaderboard."),
        Some(UpsertOutcome::Improved { previous }) => {
            println!("New best on today's leaderboard (was {previous}).");
        }
        Some(UpsertOutcome::Kept { best }) => println!("Today's best stays at {best}."),
        None => println!("Set a nickname with `trivia nickname <name>` to join the leaderboard."),
    }
    for error in &report.persistence_errors {
        println!("Not saved: {error}");
    }
}

/// Results menu. Returns `true` to play another quiz.
async fn after_results(
    share: &dyn ShareTarget,
    report: &CompletionReport,
    clock: Clock,
    prompt: &mut Prompt,
) -> io::Result<bool> {
    loop {
        let Some(line) = prompt.ask("[c] copy results  [t] try another quiz  [q] quit >").await?
        else {
            return Ok(false);
        };
        match line.to_ascii_lowercase().as_str() {
            "c" => println!("{}", share_results(share, &report.result, clock.today()).message()),
            "t" => return Ok(true),
            "q" => return Ok(false),
            _ => {}
        }
    }
}

/// Prints today's leaderboard, best score first.
///
/// # Errors
///
/// Returns an error if the leaderboard cannot be read.
pub async fn print_leaderboard(leaderboard: &LeaderboardService) -> Result<(), Box<dyn Error>> {
    let board = leaderboard.today().await?;
    println!("Leaderboard for {}", board.date());
    if board.is_empty() {
        println!("  No scores yet today.");
        return Ok(());
    }
    for (rank, entry) in board.ranked().iter().enumerate() {
        println!(
            "  {:>2}. {:<24} {:>3}  {}",
            rank + 1,
            entry.nickname,
            entry.score,
            entry.difficulty.label()
        );
    }
    Ok(())
}

/// Share target that prints the results to stdout.
#[derive(Debug, Default)]
pub struct StdoutShareTarget;

impl ShareTarget for StdoutShareTarget {
    fn share(&self, text: &str) -> Result<(), ShareError> {
        let mut out = io::stdout().lock();
        writeln!(out, "{text}")?;
        out.flush()?;
        Ok(())
    }
}
