use std::fmt;
use std::path::PathBuf;

use services::share::FileShareTarget;
use services::{AppServices, Clock, QuizSettings, ShareTarget};
use trivia_core::model::{Difficulty, Selection, SelectionError, Sport};

mod terminal;

use terminal::{Prompt, Start, StdoutShareTarget};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidValue { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    Selection(SelectionError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required here"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::Selection(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<SelectionError> for ArgsError {
    fn from(err: SelectionError) -> Self {
        ArgsError::Selection(err)
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  trivia [play] [--preset <difficulty-sport>] [--difficulty <d>] [--sport <s>] [--count <n>]");
    eprintln!("  trivia daily");
    eprintln!("  trivia leaderboard");
    eprintln!("  trivia nickname <name>");
    eprintln!();
    eprintln!("Common flags:");
    eprintln!("  --db <sqlite_url>       default sqlite://trivia.sqlite3");
    eprintln!("  --api <base_url>        question API base URL");
    eprintln!("  --offline-fallback      serve bundled questions when the API fails");
    eprintln!("  --share-file <path>     write copied results to a file instead of stdout");
    eprintln!();
    eprintln!("Difficulties: easy, medium, hard");
    eprintln!("Sports: all, basketball, football, baseball, hockey, soccer");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRIVIA_DB_URL, TRIVIA_API_BASE_URL, TRIVIA_API_TIMEOUT_SECS, TRIVIA_OFFLINE_FALLBACK");
    eprintln!("  TRIVIA_SECS_EASY, TRIVIA_SECS_MEDIUM, TRIVIA_SECS_HARD");
    eprintln!("  TRIVIA_FEEDBACK_DELAY_MS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Daily,
    Leaderboard,
    Nickname,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "daily" => Some(Self::Daily),
            "leaderboard" => Some(Self::Leaderboard),
            "nickname" => Some(Self::Nickname),
            _ => None,
        }
    }
}

/// Quiz choice given on the command line. Empty means "ask".
#[derive(Debug, Default, PartialEq, Eq)]
struct SelectionArgs {
    preset: Option<String>,
    difficulty: Option<Difficulty>,
    sport: Option<Sport>,
    count: Option<u32>,
}

impl SelectionArgs {
    fn resolve(&self) -> Result<Option<Selection>, ArgsError> {
        if let Some(slug) = &self.preset {
            let preset = Selection::from_preset(slug)?;
            let count = self.count.unwrap_or(preset.question_count());
            return Ok(Some(Selection::new(preset.difficulty(), preset.sport(), count)?));
        }
        if self.difficulty.is_none() && self.sport.is_none() && self.count.is_none() {
            return Ok(None);
        }
        let difficulty = self.difficulty.ok_or(ArgsError::MissingFlag {
            flag: "--difficulty",
        })?;
        let count = self.count.ok_or(ArgsError::MissingFlag { flag: "--count" })?;
        Ok(Some(Selection::new(
            difficulty,
            self.sport.unwrap_or_default(),
            count,
        )?))
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    db_url: Option<String>,
    api_base_url: Option<String>,
    offline_fallback: bool,
    share_file: Option<PathBuf>,
    selection: SelectionArgs,
    nickname: Option<String>,
}

impl Args {
    fn parse(command: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = Some(value);
                }
                "--api" => parsed.api_base_url = Some(require_value(args, "--api")?),
                "--offline-fallback" => parsed.offline_fallback = true,
                "--share-file" => {
                    parsed.share_file = Some(PathBuf::from(require_value(args, "--share-file")?));
                }
                "--preset" if command == Command::Play => {
                    parsed.selection.preset = Some(require_value(args, "--preset")?);
                }
                "--difficulty" if command == Command::Play => {
                    let value = require_value(args, "--difficulty")?;
                    let difficulty =
                        value
                            .parse::<Difficulty>()
                            .map_err(|_| ArgsError::InvalidValue {
                                flag: "--difficulty",
                                raw: value.clone(),
                            })?;
                    parsed.selection.difficulty = Some(difficulty);
                }
                "--sport" if command == Command::Play => {
                    let value = require_value(args, "--sport")?;
                    let sport =
                        value
                            .parse::<Sport>()
                            .map_err(|_| ArgsError::InvalidValue {
                                flag: "--sport",
                                raw: value.clone(),
                            })?;
                    parsed.selection.sport = Some(sport);
                }
                "--count" if command == Command::Play => {
                    let value = require_value(args, "--count")?;
                    let count =
                        value
                            .parse::<u32>()
                            .map_err(|_| ArgsError::InvalidValue {
                                flag: "--count",
                                raw: value.clone(),
                            })?;
                    parsed.selection.count = Some(count);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if command == Command::Nickname
                    && parsed.nickname.is_none()
                    && !arg.starts_with("--") =>
                {
                    parsed.nickname = Some(arg);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if command == Command::Nickname && parsed.nickname.is_none() {
            return Err(ArgsError::MissingValue { flag: "nickname" });
        }
        Ok(parsed)
    }

    /// Environment settings with command-line overrides applied.
    fn apply_to(&self, settings: &mut QuizSettings) {
        if let Some(db_url) = &self.db_url {
            settings.db_url.clone_from(db_url);
        }
        settings.db_url = normalize_sqlite_url(std::mem::take(&mut settings.db_url));
        if let Some(api) = &self.api_base_url {
            settings.api_base_url.clone_from(api);
        }
        if self.offline_fallback {
            settings.offline_fallback = true;
        }
    }
}

fn is_in_memory(db_url: &str) -> bool {
    db_url == "sqlite::memory:" || db_url.contains("mode=memory")
}

fn normalize_sqlite_url(raw: String) -> String {
    if is_in_memory(&raw) || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means play.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let selection = parsed.selection.resolve().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut settings = QuizSettings::from_env()?;
    parsed.apply_to(&mut settings);

    // Open + migrate SQLite at startup.
    prepare_sqlite_file(&settings.db_url)?;
    let clock = Clock::default_clock();
    let services = AppServices::new_sqlite(settings, clock).await?;

    match cmd {
        Command::Play | Command::Daily => {
            let share: Box<dyn ShareTarget> = match parsed.share_file {
                Some(path) => Box::new(FileShareTarget::new(path)),
                None => Box::new(StdoutShareTarget),
            };
            let start = if cmd == Command::Daily {
                Start::Daily
            } else {
                Start::Custom(selection)
            };
            let mut prompt = Prompt::stdin();
            terminal::ensure_consent(&services.profile(), &mut prompt).await?;
            terminal::play(&services, share.as_ref(), clock, start, &mut prompt).await
        }
        Command::Leaderboard => terminal::print_leaderboard(&services.leaderboard()).await,
        Command::Nickname => {
            let raw = parsed.nickname.unwrap_or_default();
            let nickname = services.profile().set_nickname(&raw).await?;
            println!("Playing today as {nickname}.");
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if is_in_memory(db_url) {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(command: Command, args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_string());
        Args::parse(command, &mut iter)
    }

    #[test]
    fn play_flags_build_a_selection() {
        let args = parse(
            Command::Play,
            &["--difficulty", "hard", "--sport", "hockey", "--count", "5"],
        )
        .unwrap();
        let selection = args.selection.resolve().unwrap().unwrap();
        assert_eq!(selection.difficulty(), Difficulty::Hard);
        assert_eq!(selection.sport(), Sport::Hockey);
        assert_eq!(selection.question_count(), 5);
    }

    #[test]
    fn sport_defaults_to_all() {
        let args = parse(Command::Play, &["--difficulty", "easy", "--count", "10"]).unwrap();
        let selection = args.selection.resolve().unwrap().unwrap();
        assert_eq!(selection.sport(), Sport::All);
    }

    #[test]
    fn preset_uses_ten_questions_unless_count_given() {
        let args = parse(Command::Play, &["--preset", "medium-basketball"]).unwrap();
        let selection = args.selection.resolve().unwrap().unwrap();
        assert_eq!(selection.question_count(), 10);
        assert_eq!(selection.sport(), Sport::Basketball);

        let args = parse(Command::Play, &["--preset", "easy-all", "--count", "15"]).unwrap();
        assert_eq!(args.selection.resolve().unwrap().unwrap().question_count(), 15);
    }

    #[test]
    fn no_selection_flags_means_ask() {
        let args = parse(Command::Play, &["--offline-fallback"]).unwrap();
        assert!(args.offline_fallback);
        assert_eq!(args.selection.resolve().unwrap(), None);
    }

    #[test]
    fn incomplete_or_invalid_selection_is_rejected() {
        let args = parse(Command::Play, &["--sport", "soccer"]).unwrap();
        assert!(matches!(
            args.selection.resolve(),
            Err(ArgsError::MissingFlag { flag: "--difficulty" })
        ));
        let args = parse(Command::Play, &["--difficulty", "easy", "--count", "0"]).unwrap();
        assert!(matches!(
            args.selection.resolve(),
            Err(ArgsError::Selection(SelectionError::InvalidQuestionCount))
        ));
        assert!(matches!(
            parse(Command::Play, &["--difficulty", "brutal"]),
            Err(ArgsError::InvalidValue { flag: "--difficulty", .. })
        ));
        let args = parse(Command::Play, &["--preset", "easy"]).unwrap();
        assert!(matches!(
            args.selection.resolve(),
            Err(ArgsError::Selection(SelectionError::UnknownPreset(_)))
        ));
    }

    #[test]
    fn selection_flags_only_apply_to_play() {
        assert!(matches!(
            parse(Command::Daily, &["--count", "5"]),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn nickname_takes_one_positional_name() {
        let args = parse(Command::Nickname, &["ace", "--db", "sqlite::memory:"]).unwrap();
        assert_eq!(args.nickname.as_deref(), Some("ace"));
        assert!(matches!(
            parse(Command::Nickname, &[]),
            Err(ArgsError::MissingValue { flag: "nickname" })
        ));
        assert!(matches!(
            parse(Command::Nickname, &["ace", "again"]),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn missing_flag_value_is_reported() {
        assert!(matches!(
            parse(Command::Play, &["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(
            parse(Command::Play, &["--db", "  "]),
            Err(ArgsError::InvalidDbUrl { .. })
        ));
    }

    #[test]
    fn overrides_apply_on_top_of_settings() {
        let args = parse(
            Command::Play,
            &["--db", "sqlite::memory:", "--api", "http://localhost:9000", "--offline-fallback"],
        )
        .unwrap();
        let mut settings = QuizSettings::default();
        args.apply_to(&mut settings);
        assert_eq!(settings.db_url, "sqlite::memory:");
        assert_eq!(settings.api_base_url, "http://localhost:9000");
        assert!(settings.offline_fallback);
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/trivia.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/trivia.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite://already.db".into()),
            "sqlite://already.db"
        );
        let shared = "sqlite:file:trivia?mode=memory&cache=shared";
        assert_eq!(normalize_sqlite_url(shared.into()), shared);
        assert!(prepare_sqlite_file(shared).is_ok());
    }
}
