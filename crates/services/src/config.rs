use std::env;
use std::time::Duration;

use trivia_core::model::{CountdownTable, Difficulty};

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://backend-triv.onrender.com/api";
pub const DEFAULT_DB_URL: &str = "sqlite://trivia.sqlite3";
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FEEDBACK_DELAY_MS: u64 = 1_000;

/// Runtime settings, read from `TRIVIA_*` environment variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSettings {
    pub api_base_url: String,
    pub api_timeout: Duration,
    pub offline_fallback: bool,
    pub db_url: String,
    pub countdown: CountdownTable,
    pub feedback_delay: Duration,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            api_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            offline_fallback: false,
            db_url: DEFAULT_DB_URL.into(),
            countdown: CountdownTable::default(),
            feedback_delay: Duration::from_millis(DEFAULT_FEEDBACK_DELAY_MS),
        }
    }
}

impl QuizSettings {
    /// Read settings from the process environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a numeric variable does not parse or a countdown is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`QuizSettings::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a numeric variable does not parse or a countdown is zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let number = |var: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(var).map(|v| v.trim().to_string()) {
                None => Ok(default),
                Some(v) if v.is_empty() => Ok(default),
                Some(v) => v
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidNumber { var, value: v }),
            }
        };
        let seconds = |var: &'static str, default: u32| -> Result<u32, ConfigError> {
            let value = number(var, u64::from(default))?;
            u32::try_from(value).map_err(|_| ConfigError::InvalidNumber {
                var,
                value: value.to_string(),
            })
        };

        let api_base_url = lookup("TRIVIA_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.api_base_url);
        let db_url = lookup("TRIVIA_DB_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.db_url);
        let offline_fallback = lookup("TRIVIA_OFFLINE_FALLBACK")
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        let base = defaults.countdown;
        let countdown = CountdownTable::new(
            seconds("TRIVIA_SECS_EASY", base.seconds_for(Difficulty::Easy))?,
            seconds("TRIVIA_SECS_MEDIUM", base.seconds_for(Difficulty::Medium))?,
            seconds("TRIVIA_SECS_HARD", base.seconds_for(Difficulty::Hard))?,
        )?;

        Ok(Self {
            api_base_url,
            api_timeout: Duration::from_secs(number(
                "TRIVIA_API_TIMEOUT_SECS",
                DEFAULT_API_TIMEOUT_SECS,
            )?),
            offline_fallback,
            db_url,
            countdown,
            feedback_delay: Duration::from_millis(number(
                "TRIVIA_FEEDBACK_DELAY_MS",
                DEFAULT_FEEDBACK_DELAY_MS,
            )?),
        })
    }
}
