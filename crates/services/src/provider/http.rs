use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::Deserialize;
use trivia_core::Clock;
use trivia_core::model::{Difficulty, Question, Selection, Sport};

use super::{QuestionProvider, QuestionRequest};
use crate::config::{DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS};
use crate::error::ProviderError;

#[derive(Clone, Debug)]
pub struct HttpProviderConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.into(),
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
        }
    }
}

/// Fetches questions from the trivia REST API.
#[derive(Clone)]
pub struct HttpQuestionProvider {
    client: Client,
    base_url: String,
    clock: Clock,
}

impl HttpQuestionProvider {
    /// # Errors
    ///
    /// Returns `ProviderError::Http` if the HTTP client cannot be built.
    pub fn new(config: &HttpProviderConfig, clock: Clock) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            clock,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Build `GET {base}/questions?count=&difficulty=&sport=&_t=`.
    ///
    /// `_t` is a millisecond timestamp so intermediaries never serve a cached batch.
    fn questions_request(&self, request: &QuestionRequest) -> Result<Request, ProviderError> {
        let stamp = self.clock.now().timestamp_millis();
        let built = self
            .client
            .get(self.endpoint("questions"))
            .query(&[
                ("count", request.count.to_string()),
                ("difficulty", request.difficulty.as_str().to_string()),
                ("sport", request.sport.as_str().to_string()),
                ("_t", stamp.to_string()),
            ])
            .build()?;
        Ok(built)
    }

    async fn get_text(&self, request: Request) -> Result<String, ProviderError> {
        log::debug!("GET {}", request.url());
        let response = self.client.execute(request).await?;
        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status()));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl QuestionProvider for HttpQuestionProvider {
    async fn fetch_questions(
        &self,
        request: &QuestionRequest,
    ) -> Result<Vec<Question>, ProviderError> {
        let body = self.get_text(self.questions_request(request)?).await?;
        parse_questions(&body, request.difficulty, request.sport)
    }

    async fn fetch_daily(&self) -> Result<Vec<Question>, ProviderError> {
        let request = self.client.get(self.endpoint("daily")).build()?;
        let body = self.get_text(request).await?;
        let daily = Selection::daily();
        parse_questions(&body, daily.difficulty(), daily.sport())
    }

    async fn list_difficulties(&self) -> Result<Vec<Difficulty>, ProviderError> {
        let request = self.client.get(self.endpoint("difficulties")).build()?;
        let body = self.get_text(request).await?;
        parse_difficulties(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ApiQuestion {
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    sport: Option<String>,
}

impl ApiQuestion {
    fn into_question(self, difficulty: Difficulty, sport: Sport) -> Option<Question> {
        let difficulty = self
            .difficulty
            .and_then(|d| d.parse().ok())
            .unwrap_or(difficulty);
        let sport = self.sport.and_then(|s| s.parse().ok()).unwrap_or(sport);
        let incorrect = self
            .incorrect_answers
            .iter()
            .map(|a| decode_entities(a))
            .collect();

        match Question::new(
            decode_entities(&self.question),
            decode_entities(&self.correct_answer),
            incorrect,
            difficulty,
            sport,
        ) {
            Ok(question) => Some(question),
            Err(err) => {
                log::warn!("skipping invalid question record: {err}");
                None
            }
        }
    }
}

/// Decode HTML entities such as `&quot;` and `&#039;` that the API leaves in text.
fn decode_entities(raw: &str) -> String {
    htmlescape::decode_html(raw).unwrap_or_else(|_| raw.to_string())
}

/// Parse a `/questions` or `/daily` body. Records without a difficulty or sport take the
/// requested one; records that fail validation are dropped.
fn parse_questions(
    body: &str,
    difficulty: Difficulty,
    sport: Sport,
) -> Result<Vec<Question>, ProviderError> {
    let records: Vec<ApiQuestion> = serde_json::from_str(body)?;
    Ok(records
        .into_iter()
        .filter_map(|record| record.into_question(difficulty, sport))
        .collect())
}

fn parse_difficulties(body: &str) -> Result<Vec<Difficulty>, ProviderError> {
    let raw: Vec<String> = serde_json::from_str(body)?;
    Ok(raw.iter().filter_map(|d| d.parse().ok()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_core::time::{FIXED_TEST_TIMESTAMP, fixed_clock};

    fn provider(base: &str) -> HttpQuestionProvider {
        let config = HttpProviderConfig {
            base_url: base.into(),
            ..HttpProviderConfig::default()
        };
        HttpQuestionProvider::new(&config, fixed_clock()).unwrap()
    }

    #[test]
    fn questions_url_carries_parameters_and_cache_buster() {
        let provider = provider("https://example.test/api/");
        let request = QuestionRequest {
            count: 10,
            difficulty: Difficulty::Hard,
            sport: Sport::Hockey,
        };
        let built = provider.questions_request(&request).unwrap();
        assert_eq!(
            built.url().as_str(),
            format!(
                "https://example.test/api/questions?count=10&difficulty=hard&sport=hockey&_t={}",
                FIXED_TEST_TIMESTAMP * 1000
            )
        );
    }

    #[test]
    fn payload_entities_are_decoded() {
        let body = r#"[{
            "question": "Who is &quot;The Great One&quot;?",
            "correct_answer": "Wayne Gretzky",
            "incorrect_answers": ["Mario Lemieux", "Bobby Orr", "Gordie Howe&#039;s son"],
            "difficulty": "hard",
            "sport": "hockey"
        }]"#;
        let questions = parse_questions(body, Difficulty::Easy, Sport::All).unwrap();
        assert_eq!(questions.len(), 1);
        let q = &questions[0];
        assert_eq!(q.text(), "Who is \"The Great One\"?");
        assert_eq!(q.incorrect_answers()[2], "Gordie Howe's son");
        assert_eq!(q.difficulty(), Difficulty::Hard);
        assert_eq!(q.sport(), Sport::Hockey);
    }

    #[test]
    fn missing_fields_take_requested_values_and_invalid_records_are_dropped() {
        let body = r#"[
            {"question": "Q1", "correct_answer": "A", "incorrect_answers": ["B", "C", "D"]},
            {"question": "", "correct_answer": "A", "incorrect_answers": ["B"]}
        ]"#;
        let questions = parse_questions(body, Difficulty::Medium, Sport::Soccer).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].difficulty(), Difficulty::Medium);
        assert_eq!(questions[0].sport(), Sport::Soccer);
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        assert!(matches!(
            parse_questions("{\"error\":true}", Difficulty::Easy, Sport::All),
            Err(ProviderError::Decode(_))
        ));
    }

    #[test]
    fn difficulties_skip_unknown_values() {
        let parsed = parse_difficulties(r#"["easy","medium","hard","nightmare"]"#).unwrap();
        assert_eq!(parsed, Difficulty::ALL);
    }
}
