use thiserror::Error;

use crate::geo::Coordinate;

/// Reference displacement required to unlock a question.
pub const DEFAULT_UNLOCK_DISTANCE_M: f64 = 200.0;

/// Start point used when no position fix has arrived yet (central Stockholm).
pub const DEFAULT_START: Coordinate = Coordinate::new_unchecked(59.3293, 18.0686);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WalkSettings {
    unlock_distance_m: f64,
    default_start: Coordinate,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct WalkSettingsDraft {
    pub unlock_distance_m: Option<f64>,
    pub default_start: Option<Coordinate>,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum WalkSettingsError {
    #[error("unlock distance must be a positive number of meters, got {0}")]
    InvalidUnlockDistance(f64),
}

impl WalkSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft, filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns `WalkSettingsError` if the unlock distance is not positive and finite.
    pub fn validate(self) -> Result<WalkSettings, WalkSettingsError> {
        let unlock_distance_m = self.unlock_distance_m.unwrap_or(DEFAULT_UNLOCK_DISTANCE_M);
        if !unlock_distance_m.is_finite() || unlock_distance_m <= 0.0 {
            return Err(WalkSettingsError::InvalidUnlockDistance(unlock_distance_m));
        }

        Ok(WalkSettings {
            unlock_distance_m,
            default_start: self.default_start.unwrap_or(DEFAULT_START),
        })
    }
}

impl WalkSettings {
    #[must_use]
    pub fn unlock_distance_m(&self) -> f64 {
        self.unlock_distance_m
    }

    #[must_use]
    pub fn default_start(&self) -> Coordinate {
        self.default_start
    }
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            unlock_distance_m: DEFAULT_UNLOCK_DISTANCE_M,
            default_start: DEFAULT_START,
        }
    }
}
