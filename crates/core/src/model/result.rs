use chrono::NaiveDate;

use crate::model::selection::{Selection, SessionKind};
use crate::time::date_key;

/// How a single question ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMark {
    Correct,
    Wrong,
    TimedOut,
}

impl AnswerMark {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            AnswerMark::Correct => "🟩",
            AnswerMark::Wrong => "🟥",
            AnswerMark::TimedOut => "⏱️",
        }
    }
}

/// Final tally of a completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub kind: SessionKind,
    pub selection: Selection,
    pub score: u32,
    pub total: u32,
    pub marks: Vec<AnswerMark>,
}

impl QuizResult {
    /// Score as a whole percentage, rounding halves up.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let scaled = u64::from(self.score) * 200 + u64::from(self.total);
        let pct = scaled / (u64::from(self.total) * 2);
        u32::try_from(pct).unwrap_or(100)
    }

    #[must_use]
    pub fn headline(&self) -> String {
        match self.kind {
            SessionKind::Daily => "Daily Quiz".to_string(),
            SessionKind::Custom => format!(
                "{} {}",
                self.selection.difficulty().label(),
                self.selection.sport().label()
            ),
        }
    }

    /// Text placed on the clipboard / share sheet by the "Copy Results" action.
    #[must_use]
    pub fn share_text(&self, date: NaiveDate) -> String {
        let marks: String = self.marks.iter().map(|m| m.symbol()).collect();
        format!(
            "Sports Trivia: {} ({})\n{}/{} ({}%)\n{}",
            self.headline(),
            date_key(date),
            self.score,
            self.total,
            self.percentage(),
            marks
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::{Difficulty, Sport};

    fn result(score: u32, total: u32) -> QuizResult {
        QuizResult {
            kind: SessionKind::Custom,
            selection: Selection::new(Difficulty::Medium, Sport::Soccer, total).unwrap(),
            score,
            total,
            marks: Vec::new(),
        }
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(result(2, 3).percentage(), 67);
        assert_eq!(result(1, 3).percentage(), 33);
        assert_eq!(result(1, 8).percentage(), 13);
        assert_eq!(result(5, 5).percentage(), 100);
        assert_eq!(result(0, 5).percentage(), 0);
    }

    #[test]
    fn share_text_lists_score_and_marks() {
        let mut res = result(2, 3);
        res.marks = vec![AnswerMark::Correct, AnswerMark::TimedOut, AnswerMark::Correct];
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let text = res.share_text(date);
        assert!(text.starts_with("Sports Trivia: Medium Soccer (2024-03-01)"));
        assert!(text.contains("2/3 (67%)"));
        assert!(text.ends_with("🟩⏱️🟩"));
    }

    #[test]
    fn daily_headline() {
        let mut res = result(1, 5);
        res.kind = SessionKind::Daily;
        assert_eq!(res.headline(), "Daily Quiz");
    }
}
