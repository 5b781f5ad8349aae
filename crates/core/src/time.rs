use std::fmt;

use chrono::{DateTime, Datelike, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// ISO week of `now()`.
    #[must_use]
    pub fn current_week(&self) -> WeekKey {
        WeekKey::of(self.now())
    }
}

/// ISO-8601 week: weeks start on Monday and week 1 holds the year's first Thursday.
///
/// `year` is the ISO week-based year, which differs from the calendar year around
/// New Year (2024-12-30 belongs to 2025-W01).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekKey {
    year: i32,
    week: u32,
}

impl WeekKey {
    #[must_use]
    pub fn of(at: DateTime<Utc>) -> Self {
        let iso = at.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// Rehydrate from stored parts. Returns `None` for week numbers outside 1..=53.
    #[must_use]
    pub fn from_parts(year: i32, week: u32) -> Option<Self> {
        (1..=53).contains(&week).then_some(Self { year, week })
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn week(&self) -> u32 {
        self.week
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn fixed_test_timestamp_is_week_46() {
        assert_eq!(WeekKey::of(fixed_now()), WeekKey::from_parts(2023, 46).unwrap());
    }

    #[test]
    fn week_one_holds_first_thursday() {
        // 2026-01-01 is a Thursday, so it sits in 2026-W01.
        assert_eq!(WeekKey::of(utc(2026, 1, 1)).week(), 1);
        // 2021-01-01 is a Friday and still belongs to 2020-W53.
        let key = WeekKey::of(utc(2021, 1, 1));
        assert_eq!((key.year(), key.week()), (2020, 53));
        // 2024-12-30 is a Monday in 2025-W01.
        let key = WeekKey::of(utc(2024, 12, 30));
        assert_eq!((key.year(), key.week()), (2025, 1));
    }

    #[test]
    fn from_parts_rejects_invalid_week() {
        assert!(WeekKey::from_parts(2025, 0).is_none());
        assert!(WeekKey::from_parts(2025, 54).is_none());
    }

    #[test]
    fn current_week_follows_fixed_clock() {
        assert_eq!(fixed_clock().current_week().week(), 46);
        let next = Clock::fixed(fixed_now() + chrono::Duration::days(7));
        assert_eq!(next.current_week().week(), 47);
    }
}
