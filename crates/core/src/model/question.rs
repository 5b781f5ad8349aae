use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Number of rounds (and therefore questions) in one weekly walk.
pub const ROUNDS_PER_WALK: usize = 10;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyPrompt,

    #[error("missing answer option for label {0}")]
    MissingOption(AnswerLabel),

    #[error("invalid answer label: {0:?}")]
    InvalidLabel(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionBankError {
    #[error("expected {expected} questions, got {got}")]
    WrongCount { expected: usize, got: usize },

    #[error("question #{index} is invalid: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

//
// ─── ANSWER LABEL ──────────────────────────────────────────────────────────────
//

/// The three betting-slip style choices: home, draw, away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerLabel {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "X")]
    X,
    #[serde(rename = "2")]
    Two,
}

impl AnswerLabel {
    pub const ALL: [AnswerLabel; 3] = [AnswerLabel::One, AnswerLabel::X, AnswerLabel::Two];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerLabel::One => "1",
            AnswerLabel::X => "X",
            AnswerLabel::Two => "2",
        }
    }
}

impl fmt::Display for AnswerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerLabel {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(AnswerLabel::One),
            "X" | "x" => Ok(AnswerLabel::X),
            "2" => Ok(AnswerLabel::Two),
            other => Err(QuestionError::InvalidLabel(other.to_string())),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Unvalidated question as received from a content provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    pub id: u64,
    pub prompt: String,
    pub option_one: Option<String>,
    pub option_x: Option<String>,
    pub option_two: Option<String>,
    pub correct: String,
}

impl QuestionDraft {
    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, an option is missing or blank,
    /// or the correct label is not one of `1`, `X`, `2`.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        let one = require_option(self.option_one, AnswerLabel::One)?;
        let x = require_option(self.option_x, AnswerLabel::X)?;
        let two = require_option(self.option_two, AnswerLabel::Two)?;
        let correct = self.correct.parse::<AnswerLabel>()?;

        Ok(Question {
            id: QuestionId::new(self.id),
            prompt,
            options: [one, x, two],
            correct,
        })
    }
}

fn require_option(value: Option<String>, label: AnswerLabel) -> Result<String, QuestionError> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
        .ok_or(QuestionError::MissingOption(label))
}

/// A validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: [String; 3],
    correct: AnswerLabel,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn option(&self, label: AnswerLabel) -> &str {
        match label {
            AnswerLabel::One => &self.options[0],
            AnswerLabel::X => &self.options[1],
            AnswerLabel::Two => &self.options[2],
        }
    }

    #[must_use]
    pub fn correct(&self) -> AnswerLabel {
        self.correct
    }

    #[must_use]
    pub fn is_correct(&self, choice: AnswerLabel) -> bool {
        self.correct == choice
    }
}

//
// ─── QUESTION BANK ─────────────────────────────────────────────────────────────
//

/// Exactly `ROUNDS_PER_WALK` questions, in round order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// # Errors
    ///
    /// Returns `QuestionBankError::WrongCount` unless exactly ten questions are given.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        if questions.len() != ROUNDS_PER_WALK {
            return Err(QuestionBankError::WrongCount {
                expected: ROUNDS_PER_WALK,
                got: questions.len(),
            });
        }
        Ok(Self { questions })
    }

    /// Validate every draft and build a bank. Any invalid draft rejects the whole bank.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError` on wrong cardinality or the first invalid question.
    pub fn from_drafts(drafts: Vec<QuestionDraft>) -> Result<Self, QuestionBankError> {
        if drafts.len() != ROUNDS_PER_WALK {
            return Err(QuestionBankError::WrongCount {
                expected: ROUNDS_PER_WALK,
                got: drafts.len(),
            });
        }
        let questions = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                draft
                    .validate()
                    .map_err(|source| QuestionBankError::InvalidQuestion { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(questions)
    }

    /// Static set used whenever the content provider cannot deliver.
    #[must_use]
    pub fn fallback() -> Self {
        let questions = (1..=ROUNDS_PER_WALK as u64)
            .map(|id| Question {
                id: QuestionId::new(id),
                prompt: format!("Question {id}: How long is a marathon?"),
                options: ["42 km".to_string(), "21 km".to_string(), "10 km".to_string()],
                correct: AnswerLabel::One,
            })
            .collect();
        Self { questions }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}
