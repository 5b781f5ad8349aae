use std::env;
use std::time::Duration;

use tipswalk_core::model::{WalkSettings, WalkSettingsDraft};

use crate::error::ConfigError;

pub const UNLOCK_DISTANCE_VAR: &str = "TIPSWALK_UNLOCK_DISTANCE_M";
pub const CONTENT_TIMEOUT_VAR: &str = "TIPSWALK_CONTENT_TIMEOUT_SECS";
pub const DB_URL_VAR: &str = "TIPSWALK_DB_URL";

pub const DEFAULT_CONTENT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_DB_URL: &str = "sqlite://tipswalk.sqlite3";

/// Process-wide tunables. Nothing here is persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct WalkConfig {
    pub settings: WalkSettings,
    pub content_timeout: Duration,
    pub db_url: String,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            settings: WalkSettings::default(),
            content_timeout: DEFAULT_CONTENT_TIMEOUT,
            db_url: DEFAULT_DB_URL.to_string(),
        }
    }
}

impl WalkConfig {
    /// Read the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a numeric variable does not parse or the unlock
    /// distance is not a positive finite number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`WalkConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// See [`WalkConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let unlock_distance_m = value(UNLOCK_DISTANCE_VAR)
            .map(|raw| parse_number::<f64>(UNLOCK_DISTANCE_VAR, &raw))
            .transpose()?;
        let settings = WalkSettingsDraft {
            unlock_distance_m,
            default_start: None,
        }
        .validate()?;

        let content_timeout = value(CONTENT_TIMEOUT_VAR)
            .map(|raw| parse_number::<u64>(CONTENT_TIMEOUT_VAR, &raw))
            .transpose()?
            .map_or(DEFAULT_CONTENT_TIMEOUT, Duration::from_secs);

        let db_url = value(DB_URL_VAR).unwrap_or_else(|| DEFAULT_DB_URL.to_string());

        Ok(Self {
            settings,
            content_timeout,
            db_url,
        })
    }

    /// Override the unlock distance, e.g. from a CLI flag.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Settings` if the distance is not positive and finite.
    pub fn with_unlock_distance(mut self, meters: f64) -> Result<Self, ConfigError> {
        self.settings = WalkSettingsDraft {
            unlock_distance_m: Some(meters),
            default_start: Some(self.settings.default_start()),
        }
        .validate()?;
        Ok(self)
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = WalkConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, WalkConfig::default());
        assert_eq!(config.settings.unlock_distance_m(), 200.0);
        assert_eq!(config.content_timeout, Duration::from_secs(10));
    }

    #[test]
    fn reads_overrides() {
        let config = WalkConfig::from_lookup(lookup(&[
            (UNLOCK_DISTANCE_VAR, "50"),
            (CONTENT_TIMEOUT_VAR, "3"),
            (DB_URL_VAR, "sqlite::memory:"),
        ]))
        .unwrap();
        assert_eq!(config.settings.unlock_distance_m(), 50.0);
        assert_eq!(config.content_timeout, Duration::from_secs(3));
        assert_eq!(config.db_url, "sqlite::memory:");
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = WalkConfig::from_lookup(lookup(&[(UNLOCK_DISTANCE_VAR, "far")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { var, .. } if var == UNLOCK_DISTANCE_VAR));

        let err = WalkConfig::from_lookup(lookup(&[(UNLOCK_DISTANCE_VAR, "-5")])).unwrap_err();
        assert!(matches!(err, ConfigError::Settings(_)));
    }

    #[test]
    fn cli_override_validates() {
        let config = WalkConfig::default().with_unlock_distance(25.0).unwrap();
        assert_eq!(config.settings.unlock_distance_m(), 25.0);
        assert!(WalkConfig::default().with_unlock_distance(f64::NAN).is_err());
    }
}
