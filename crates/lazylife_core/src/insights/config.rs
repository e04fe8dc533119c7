//! Tunables for dashboard aggregation.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Trailing week used by weekly counts and the consistency score.
pub const WEEK_DAYS: i64 = 7;
/// Trailing month used by `entries_last_30_days`.
pub const MONTH_DAYS: i64 = 30;

const DEFAULT_LOOKBACK_DAYS: u32 = 30;
/// Longest accepted fetch window, roughly ten years.
pub const MAX_LOOKBACK_DAYS: u32 = 3_650;
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_LIST_LIMIT: usize = 3;
const DEFAULT_CONSISTENCY_THRESHOLD: f64 = 0.7;

/// Dashboard aggregation settings.
///
/// Missing fields fall back to defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// Days of history fetched per tracker, ending today inclusive.
    ///
    /// Entries older than the window are never fetched, so a tracker whose
    /// last entry predates it reports no entries at all.
    pub lookback_days: u32,
    /// Per-tracker fetch budget; an expired fetch counts as a failed one.
    pub fetch_timeout_ms: u64,
    pub attention_limit: usize,
    pub consistent_limit: usize,
    /// Minimum score for the most-consistent list, inclusive.
    pub consistency_threshold: f64,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            attention_limit: DEFAULT_LIST_LIMIT,
            consistent_limit: DEFAULT_LIST_LIMIT,
            consistency_threshold: DEFAULT_CONSISTENCY_THRESHOLD,
        }
    }
}

impl InsightsConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Checks that the settings describe a usable aggregation.
    ///
    /// # Errors
    /// - `LookbackTooShort` when the window cannot cover a full week.
    /// - `LookbackTooLong` above `MAX_LOOKBACK_DAYS`.
    /// - `ZeroTimeout`, `ZeroLimit` and `ThresholdOutOfRange` for degenerate values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if i64::from(self.lookback_days) < WEEK_DAYS {
            return Err(ConfigError::LookbackTooShort {
                lookback_days: self.lookback_days,
                minimum: WEEK_DAYS as u32,
            });
        }
        if self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ConfigError::LookbackTooLong {
                lookback_days: self.lookback_days,
                maximum: MAX_LOOKBACK_DAYS,
            });
        }
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.attention_limit == 0 {
            return Err(ConfigError::ZeroLimit("attention_limit"));
        }
        if self.consistent_limit == 0 {
            return Err(ConfigError::ZeroLimit("consistent_limit"));
        }
        if !(0.0..=1.0).contains(&self.consistency_threshold) {
            return Err(ConfigError::ThresholdOutOfRange(self.consistency_threshold));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    LookbackTooShort { lookback_days: u32, minimum: u32 },
    LookbackTooLong { lookback_days: u32, maximum: u32 },
    ZeroTimeout,
    ZeroLimit(&'static str),
    ThresholdOutOfRange(f64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LookbackTooShort {
                lookback_days,
                minimum,
            } => write!(
                f,
                "lookback_days is {lookback_days}; at least {minimum} days are required"
            ),
            Self::LookbackTooLong {
                lookback_days,
                maximum,
            } => write!(
                f,
                "lookback_days is {lookback_days}; at most {maximum} days are allowed"
            ),
            Self::ZeroTimeout => write!(f, "fetch_timeout_ms must be greater than zero"),
            Self::ZeroLimit(field) => write!(f, "{field} must be greater than zero"),
            Self::ThresholdOutOfRange(value) => {
                write!(f, "consistency_threshold {value} is outside [0, 1]")
            }
        }
    }
}

impl Error for ConfigError {}
