mod http;
mod provider;
mod service;

pub use http::{HttpQuestionProvider, QuizApiConfig};
pub use provider::{
    QuestionOptions, QuestionPayload, QuestionProvider, StaticQuestionProvider, bank_from_payloads,
};
pub use service::{BankSource, QuizContentService};
