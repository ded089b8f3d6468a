// src/config.rs
// Tunables for the scheduler and the study session.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for `maxIntervalDays`, roughly 270 years.
pub const MAX_INTERVAL_DAYS: i64 = 100_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Constants used by the review scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Confidence gained or lost per review.
    pub step: f64,
    /// Cards at or above this confidence count as mastered.
    pub mastery_threshold: f64,
    /// Below this confidence a card comes back within the day.
    pub soon_threshold: f64,
    /// Longest delay between reviews, in days.
    pub max_interval_days: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            step: 0.2,
            mastery_threshold: 0.8,
            soon_threshold: 0.6,
            max_interval_days: 36_500,
        }
    }
}

/// How the next card of a pass is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionStrategy {
    Sequential,
    Random,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub strategy: SelectionStrategy,
    pub celebration_streak: u32,
    pub celebration_window_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::Random,
            celebration_streak: 5,
            celebration_window_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub session: SessionConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON config file. Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scheduler;
        if !(s.step > 0.0 && s.step <= 1.0) {
            return Err(ConfigError::Invalid(format!("step must be in (0, 1], got {}", s.step)));
        }
        let thresholds = [
            ("masteryThreshold", s.mastery_threshold),
            ("soonThreshold", s.soon_threshold),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !(1..=MAX_INTERVAL_DAYS).contains(&s.max_interval_days) {
            return Err(ConfigError::Invalid(format!(
                "maxIntervalDays must be in [1, {}], got {}",
                MAX_INTERVAL_DAYS, s.max_interval_days
            )));
        }
        if self.session.celebration_streak == 0 {
            return Err(ConfigError::Invalid("celebrationStreak must be positive".to_string()));
        }
        if self.session.celebration_window_secs <= 0 {
            return Err(ConfigError::Invalid("celebrationWindowSecs must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.scheduler.step, 0.2);
        assert_eq!(config.session.celebration_streak, 5);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "scheduler": {{ "step": 0.25 }}, "session": {{ "strategy": "sequential" }} }}"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.scheduler.step, 0.25);
        assert_eq!(config.scheduler.mastery_threshold, 0.8);
        assert_eq!(config.session.strategy, SelectionStrategy::Sequential);
        assert_eq!(config.session.celebration_window_secs, 5);
    }

    #[test]
    fn test_rejects_out_of_range_step() {
        let mut config = Config::new();
        config.scheduler.step = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.scheduler.step = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_threshold_outside_unit_range() {
        let mut config = Config::new();
        config.scheduler.soon_threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_interval_days_is_bounded() {
        let mut config = Config::new();
        config.scheduler.max_interval_days = MAX_INTERVAL_DAYS;
        assert!(config.validate().is_ok());

        for bad in [0, -1, MAX_INTERVAL_DAYS + 1, 1_000_000_000] {
            config.scheduler.max_interval_days = bad;
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))), "{}", bad);
        }
    }
}
