use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tipswalk_core::model::{AnswerLabel, Question, QuestionBank, QuestionBankError, QuestionDraft};

use crate::error::ContentError;

/// Wire shape of one question: `{id, text, options: {"1","X","2"}, correct}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub options: QuestionOptions,
    pub correct: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOptions {
    #[serde(rename = "1", default)]
    pub one: Option<String>,
    #[serde(rename = "X", default)]
    pub x: Option<String>,
    #[serde(rename = "2", default)]
    pub two: Option<String>,
}

impl QuestionPayload {
    #[must_use]
    pub fn into_draft(self) -> QuestionDraft {
        QuestionDraft {
            id: self.id,
            prompt: self.text,
            option_one: self.options.one,
            option_x: self.options.x,
            option_two: self.options.two,
            correct: self.correct,
        }
    }

    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question.id().value(),
            text: question.prompt().to_string(),
            options: QuestionOptions {
                one: Some(question.option(AnswerLabel::One).to_string()),
                x: Some(question.option(AnswerLabel::X).to_string()),
                two: Some(question.option(AnswerLabel::Two).to_string()),
            },
            correct: question.correct().as_str().to_string(),
        }
    }
}

/// Validate a provider response into a bank.
///
/// # Errors
///
/// Returns `QuestionBankError` on wrong count or any invalid question.
pub fn bank_from_payloads(payloads: Vec<QuestionPayload>) -> Result<QuestionBank, QuestionBankError> {
    QuestionBank::from_drafts(payloads.into_iter().map(QuestionPayload::into_draft).collect())
}

/// Source of the weekly question set.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Fetch this week's questions. Validation happens in the caller.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` on transport or decoding failures.
    async fn fetch_weekly_questions(&self) -> Result<Vec<QuestionPayload>, ContentError>;
}

/// Always serves the built-in fallback set.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticQuestionProvider;

#[async_trait]
impl QuestionProvider for StaticQuestionProvider {
    async fn fetch_weekly_questions(&self) -> Result<Vec<QuestionPayload>, ContentError> {
        Ok(QuestionBank::fallback()
            .iter()
            .map(QuestionPayload::from_question)
            .collect())
    }
}
