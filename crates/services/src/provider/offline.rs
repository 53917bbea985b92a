use async_trait::async_trait;
use rand::Rng;
use rand::seq::SliceRandom;
use trivia_core::model::{Difficulty, Question, Selection, Sport};

use super::{QuestionProvider, QuestionRequest};
use crate::error::ProviderError;

// (difficulty, sport, question, correct, incorrect)
type BankRow = (Difficulty, Sport, &'static str, &'static str, [&'static str; 3]);

const BANK: &[BankRow] = &[
    (
        Difficulty::Easy,
        Sport::Basketball,
        "How many points is a free throw worth in basketball?",
        "1",
        ["2", "3", "0.5"],
    ),
    (
        Difficulty::Easy,
        Sport::Basketball,
        "How many players does each team have on the court in basketball?",
        "5",
        ["6", "7", "4"],
    ),
    (
        Difficulty::Medium,
        Sport::Basketball,
        "Which team did Michael Jordan win six NBA championships with?",
        "Chicago Bulls",
        ["Washington Wizards", "Detroit Pistons", "Boston Celtics"],
    ),
    (
        Difficulty::Hard,
        Sport::Basketball,
        "Who holds the NBA record for points in a single game?",
        "Wilt Chamberlain",
        ["Kobe Bryant", "Michael Jordan", "Elgin Baylor"],
    ),
    (
        Difficulty::Easy,
        Sport::Football,
        "How many points is a touchdown worth in American football?",
        "6",
        ["7", "3", "5"],
    ),
    (
        Difficulty::Medium,
        Sport::Football,
        "Which team won the first Super Bowl?",
        "Green Bay Packers",
        ["Kansas City Chiefs", "New York Jets", "Dallas Cowboys"],
    ),
    (
        Difficulty::Hard,
        Sport::Football,
        "Which team completed the only perfect season in NFL history?",
        "1972 Miami Dolphins",
        [
            "2007 New England Patriots",
            "1985 Chicago Bears",
            "1989 San Francisco 49ers",
        ],
    ),
    (
        Difficulty::Easy,
        Sport::Baseball,
        "How many strikes make an out in baseball?",
        "3",
        ["2", "4", "5"],
    ),
    (
        Difficulty::Medium,
        Sport::Baseball,
        "Which player is known as \"The Sultan of Swat\"?",
        "Babe Ruth",
        ["Lou Gehrig", "Ty Cobb", "Mickey Mantle"],
    ),
    (
        Difficulty::Hard,
        Sport::Baseball,
        "Who holds the MLB record for career stolen bases?",
        "Rickey Henderson",
        ["Lou Brock", "Ty Cobb", "Tim Raines"],
    ),
    (
        Difficulty::Easy,
        Sport::Hockey,
        "What is the name of the NHL championship trophy?",
        "Stanley Cup",
        ["Lombardi Trophy", "Larry O'Brien Trophy", "Commissioner's Trophy"],
    ),
    (
        Difficulty::Medium,
        Sport::Hockey,
        "Which player is nicknamed \"The Great One\"?",
        "Wayne Gretzky",
        ["Mario Lemieux", "Bobby Orr", "Gordie Howe"],
    ),
    (
        Difficulty::Hard,
        Sport::Hockey,
        "Which franchise has won the most Stanley Cups?",
        "Montreal Canadiens",
        ["Toronto Maple Leafs", "Detroit Red Wings", "Boston Bruins"],
    ),
    (
        Difficulty::Easy,
        Sport::Soccer,
        "How many players does each team field in a soccer match?",
        "11",
        ["10", "9", "12"],
    ),
    (
        Difficulty::Medium,
        Sport::Soccer,
        "Which country has won the most FIFA World Cups?",
        "Brazil",
        ["Germany", "Italy", "Argentina"],
    ),
    (
        Difficulty::Medium,
        Sport::Soccer,
        "In which year was the first FIFA World Cup held?",
        "1930",
        ["1924", "1934", "1950"],
    ),
    (
        Difficulty::Hard,
        Sport::Soccer,
        "Who scored the \"Hand of God\" goal?",
        "Diego Maradona",
        ["Pelé", "Lionel Messi", "Zinedine Zidane"],
    ),
    (
        Difficulty::Medium,
        Sport::Basketball,
        "Which franchise did Kareem Abdul-Jabbar begin his NBA career with?",
        "Milwaukee Bucks",
        ["Los Angeles Lakers", "New York Knicks", "Philadelphia 76ers"],
    ),
];

/// Small built-in question bank, served when the remote API is unreachable.
#[derive(Clone, Debug)]
pub struct OfflineQuestionBank {
    questions: Vec<Question>,
}

impl Default for OfflineQuestionBank {
    fn default() -> Self {
        let questions = BANK
            .iter()
            .filter_map(|(difficulty, sport, text, correct, incorrect)| {
                let incorrect = incorrect.iter().map(|a| (*a).to_string()).collect();
                Question::new(*text, *correct, incorrect, *difficulty, *sport).ok()
            })
            .collect();
        Self { questions }
    }
}

impl OfflineQuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Matching questions in random order, at most `request.count` of them.
    #[must_use]
    pub fn select<R: Rng + ?Sized>(&self, request: &QuestionRequest, rng: &mut R) -> Vec<Question> {
        let mut matching: Vec<Question> = self
            .questions
            .iter()
            .filter(|q| q.difficulty() == request.difficulty && request.sport.matches(q.sport()))
            .cloned()
            .collect();
        matching.shuffle(rng);
        matching.truncate(usize::try_from(request.count).unwrap_or(usize::MAX));
        matching
    }

    fn serve(&self, request: &QuestionRequest) -> Result<Vec<Question>, ProviderError> {
        let questions = {
            let mut rng = rand::rng();
            self.select(request, &mut rng)
        };
        if questions.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(questions)
    }
}

#[async_trait]
impl QuestionProvider for OfflineQuestionBank {
    async fn fetch_questions(
        &self,
        request: &QuestionRequest,
    ) -> Result<Vec<Question>, ProviderError> {
        self.serve(request)
    }

    async fn fetch_daily(&self) -> Result<Vec<Question>, ProviderError> {
        self.serve(&QuestionRequest::from(&Selection::daily()))
    }

    async fn list_difficulties(&self) -> Result<Vec<Difficulty>, ProviderError> {
        Ok(Difficulty::ALL
            .into_iter()
            .filter(|d| self.questions.iter().any(|q| q.difficulty() == *d))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn request(count: u32, difficulty: Difficulty, sport: Sport) -> QuestionRequest {
        QuestionRequest {
            count,
            difficulty,
            sport,
        }
    }

    #[test]
    fn every_bank_row_is_valid() {
        assert_eq!(OfflineQuestionBank::new().len(), BANK.len());
    }

    #[test]
    fn select_filters_by_difficulty_and_sport() {
        let bank = OfflineQuestionBank::new();
        let mut rng = StdRng::seed_from_u64(9);
        let picked = bank.select(&request(10, Difficulty::Medium, Sport::Soccer), &mut rng);
        assert_eq!(picked.len(), 2);
        assert!(
            picked
                .iter()
                .all(|q| q.difficulty() == Difficulty::Medium && q.sport() == Sport::Soccer)
        );
    }

    #[test]
    fn all_sports_are_truncated_to_count() {
        let bank = OfflineQuestionBank::new();
        let mut rng = StdRng::seed_from_u64(9);
        let picked = bank.select(&request(3, Difficulty::Easy, Sport::All), &mut rng);
        assert_eq!(picked.len(), 3);
    }

    #[tokio::test]
    async fn daily_serves_five_medium_questions() {
        let daily = OfflineQuestionBank::new().fetch_daily().await.unwrap();
        assert_eq!(daily.len(), 5);
        assert!(daily.iter().all(|q| q.difficulty() == Difficulty::Medium));
    }
}
