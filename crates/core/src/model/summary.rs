use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::WalkId;
use crate::model::question::ROUNDS_PER_WALK;
use crate::time::WeekKey;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WalkSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("score {score} exceeds {total} rounds")]
    ScoreOutOfRange { score: u32, total: u32 },
}

/// Final outcome of a finished walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkResult {
    final_score: u32,
    perfect: bool,
}

impl WalkResult {
    /// # Errors
    ///
    /// Returns `WalkSummaryError::ScoreOutOfRange` if the score exceeds the round count.
    pub fn from_score(final_score: u32) -> Result<Self, WalkSummaryError> {
        let total = rounds_u32();
        if final_score > total {
            return Err(WalkSummaryError::ScoreOutOfRange {
                score: final_score,
                total,
            });
        }
        Ok(Self {
            final_score,
            perfect: final_score == total,
        })
    }

    #[must_use]
    pub fn final_score(&self) -> u32 {
        self.final_score
    }

    /// True only for ten correct answers; earns the weekly trophy.
    #[must_use]
    pub fn perfect(&self) -> bool {
        self.perfect
    }
}

/// Persisted record of a finished walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSummary {
    walk_id: WalkId,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total_rounds: u32,
    correct: u32,
}

impl WalkSummary {
    /// # Errors
    ///
    /// Returns `WalkSummaryError` if the time range is inverted or the score is too large.
    pub fn from_persisted(
        walk_id: WalkId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        total_rounds: u32,
        correct: u32,
    ) -> Result<Self, WalkSummaryError> {
        if completed_at < started_at {
            return Err(WalkSummaryError::InvalidTimeRange);
        }
        if correct > total_rounds {
            return Err(WalkSummaryError::ScoreOutOfRange {
                score: correct,
                total: total_rounds,
            });
        }
        Ok(Self {
            walk_id,
            started_at,
            completed_at,
            total_rounds,
            correct,
        })
    }

    /// # Errors
    ///
    /// Returns `WalkSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    pub fn from_result(
        walk_id: WalkId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        result: WalkResult,
    ) -> Result<Self, WalkSummaryError> {
        Self::from_persisted(
            walk_id,
            started_at,
            completed_at,
            rounds_u32(),
            result.final_score(),
        )
    }

    #[must_use]
    pub fn walk_id(&self) -> WalkId {
        self.walk_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn perfect(&self) -> bool {
        self.correct == self.total_rounds
    }

    /// ISO week the walk was completed in.
    #[must_use]
    pub fn week(&self) -> WeekKey {
        WeekKey::of(self.completed_at)
    }
}

fn rounds_u32() -> u32 {
    u32::try_from(ROUNDS_PER_WALK).unwrap_or(u32::MAX)
}
