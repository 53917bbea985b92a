//! Key names used in the key–value store.

use chrono::NaiveDate;
use trivia_core::time::date_key;

/// Set to `"true"` once the user accepted the consent prompt.
pub const COOKIE_CONSENT: &str = "cookie_consent";

/// Value stored under [`COOKIE_CONSENT`] once accepted.
pub const CONSENT_ACCEPTED: &str = "true";

/// Single `{nickname, date}` record, overwritten daily.
pub const NICKNAME_INFO: &str = "nickname-info";

/// Date key of the last daily quiz the user finished.
pub const DAILY_QUIZ_PLAYED: &str = "daily-quiz-played";

const LEADERBOARD_PREFIX: &str = "leaderboard-";

/// `leaderboard-<YYYY-MM-DD>`
#[must_use]
pub fn leaderboard(date: NaiveDate) -> String {
    format!("{LEADERBOARD_PREFIX}{}", date_key(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaderboard_key_is_dated() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        assert_eq!(leaderboard(date), "leaderboard-2024-07-04");
    }
}
