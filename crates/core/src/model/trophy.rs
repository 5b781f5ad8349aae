use chrono::{DateTime, Utc};

use crate::time::WeekKey;

/// Award for a perfect walk, one per ISO week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trophy {
    week: WeekKey,
    awarded_at: DateTime<Utc>,
}

impl Trophy {
    /// Trophy for the ISO week containing `awarded_at`.
    #[must_use]
    pub fn for_week_of(awarded_at: DateTime<Utc>) -> Self {
        Self {
            week: WeekKey::of(awarded_at),
            awarded_at,
        }
    }

    #[must_use]
    pub fn from_persisted(week: WeekKey, awarded_at: DateTime<Utc>) -> Self {
        Self { week, awarded_at }
    }

    #[must_use]
    pub fn week(&self) -> WeekKey {
        self.week
    }

    #[must_use]
    pub fn awarded_at(&self) -> DateTime<Utc> {
        self.awarded_at
    }

    /// Short label shown on the trophy shelf, e.g. `V46`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("V{}", self.week.week())
    }
}
