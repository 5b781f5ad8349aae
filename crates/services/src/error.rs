//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use tipswalk_core::model::{ProfileError, QuestionBankError, WalkSettingsError};
use tipswalk_core::walk::WalkError;

/// Errors emitted by question providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("quiz content provider is not configured")]
    Disabled,
    #[error("quiz content provider returned an empty response")]
    EmptyResponse,
    #[error("quiz content request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("malformed quiz payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    Bank(#[from] QuestionBankError),
    #[error("quiz content request timed out")]
    Timeout,
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `TrophyService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrophyServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the walk controller, event loop and workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WalkServiceError {
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error("walk event loop has stopped")]
    Closed,
    #[error("walk event loop failed: {0}")]
    Task(String),
    #[error(transparent)]
    Trophy(#[from] TrophyServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while reading `WalkConfig` from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} must be a number, got {raw:?}")]
    InvalidNumber { var: &'static str, raw: String },
    #[error(transparent)]
    Settings(#[from] WalkSettingsError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Profile(#[from] ProfileServiceError),
}
