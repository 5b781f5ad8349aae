use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::provider::{QuestionPayload, QuestionProvider};
use crate::error::ContentError;

const QUIZ_PROMPT: &str = "Create 10 interesting trivia questions for a walking quiz. \
Vary the topics (history, sport, culture, nature). Every question has three answer \
options labelled \"1\", \"X\" and \"2\". Reply with a JSON array only, each element \
shaped as {\"id\": integer, \"text\": string, \"options\": {\"1\": string, \"X\": string, \
\"2\": string}, \"correct\": \"1\" | \"X\" | \"2\"}.";

#[derive(Clone, Debug)]
pub struct QuizApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl QuizApiConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("TIPSWALK_QUIZ_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("TIPSWALK_QUIZ_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("TIPSWALK_QUIZ_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Asks an OpenAI-compatible chat-completions endpoint for the weekly questions.
#[derive(Clone)]
pub struct HttpQuestionProvider {
    client: Client,
    config: Option<QuizApiConfig>,
}

impl HttpQuestionProvider {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(QuizApiConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<QuizApiConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl QuestionProvider for HttpQuestionProvider {
    async fn fetch_weekly_questions(&self) -> Result<Vec<QuestionPayload>, ContentError> {
        let config = self.config.as_ref().ok_or(ContentError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: QUIZ_PROMPT.to_string(),
            }],
            temperature: 0.7,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ContentError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ContentError::EmptyResponse)?;

        parse_questions(&content)
    }
}

/// Decode the model reply. Accepts a bare array or `{"questions": [...]}`,
/// optionally wrapped in a Markdown code fence.
pub(crate) fn parse_questions(content: &str) -> Result<Vec<QuestionPayload>, ContentError> {
    let json = strip_code_fence(content.trim());
    if json.is_empty() {
        return Err(ContentError::EmptyResponse);
    }
    let parsed: QuestionsReply = serde_json::from_str(json)?;
    Ok(match parsed {
        QuestionsReply::List(list) => list,
        QuestionsReply::Wrapped { questions } => questions,
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the optional language tag on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuestionsReply {
    List(Vec<QuestionPayload>),
    Wrapped { questions: Vec<QuestionPayload> },
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: &str =
        r#"[{"id": 1, "text": "Q1", "options": {"1": "a", "X": "b", "2": "c"}, "correct": "2"}]"#;

    #[test]
    fn parses_bare_array() {
        let questions = parse_questions(ONE).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct, "2");
    }

    #[test]
    fn tolerates_code_fences() {
        let fenced = format!("```json\n{ONE}\n```");
        assert_eq!(parse_questions(&fenced).unwrap().len(), 1);

        let bare_fence = format!("```\n{ONE}```");
        assert_eq!(parse_questions(&bare_fence).unwrap().len(), 1);
    }

    #[test]
    fn accepts_wrapped_object() {
        let wrapped = format!(r#"{{"questions": {ONE}}}"#);
        assert_eq!(parse_questions(&wrapped).unwrap()[0].text, "Q1");
    }

    #[test]
    fn rejects_prose_and_empty_replies() {
        assert!(matches!(
            parse_questions("Sure! Here are your questions."),
            Err(ContentError::Payload(_))
        ));
        assert!(matches!(
            parse_questions("```json\n```"),
            Err(ContentError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn disabled_without_api_key() {
        let provider = HttpQuestionProvider::new(None);
        assert!(!provider.enabled());
        assert!(matches!(
            provider.fetch_weekly_questions().await,
            Err(ContentError::Disabled)
        ));
    }
}
