use std::sync::Arc;

use chrono::{DateTime, Utc};
use storage::repository::TrophyRepository;
use tipswalk_core::model::{Trophy, WalkResult};
use tracing::info;

use crate::error::TrophyServiceError;

/// Weekly trophies for perfect walks.
#[derive(Clone)]
pub struct TrophyService {
    repo: Arc<dyn TrophyRepository>,
}

impl TrophyService {
    #[must_use]
    pub fn new(repo: Arc<dyn TrophyRepository>) -> Self {
        Self { repo }
    }

    /// Award the trophy for the ISO week of `at` if the walk was perfect.
    ///
    /// Returns the trophy only when it was newly awarded; a second perfect walk in
    /// the same week yields `None`.
    ///
    /// # Errors
    ///
    /// Returns `TrophyServiceError` on storage failures.
    pub async fn award_if_perfect(
        &self,
        result: WalkResult,
        at: DateTime<Utc>,
    ) -> Result<Option<Trophy>, TrophyServiceError> {
        if !result.perfect() {
            return Ok(None);
        }
        let trophy = Trophy::for_week_of(at);
        if self.repo.award(&trophy).await? {
            info!(week = %trophy.week(), label = %trophy.label(), "trophy awarded");
            Ok(Some(trophy))
        } else {
            Ok(None)
        }
    }

    /// # Errors
    ///
    /// Returns `TrophyServiceError` on storage failures.
    pub async fn list(&self) -> Result<Vec<Trophy>, TrophyServiceError> {
        Ok(self.repo.list_trophies().await?)
    }
}
