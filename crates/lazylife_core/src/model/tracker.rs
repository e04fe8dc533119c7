//! Tracker domain model.
//!
//! # Responsibility
//! - Define the recurring item a user logs observations against.
//! - Provide name normalization and validation used by write paths.
//!
//! # Invariants
//! - `id` is stable and never reused for another tracker.
//! - `is_archived` is the source of truth for tombstone state.
//! - `name` is trimmed, whitespace-collapsed and non-empty once validated.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a tracker.
pub type TrackerId = Uuid;

/// Upper bound for tracker display names, counted in chars.
pub const MAX_TRACKER_NAME_CHARS: usize = 120;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Expected logging cadence for a tracker.
///
/// Only `Daily` gets a fixed-ratio consistency score; every other cadence is
/// scored against the tracker's own historical frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    /// Stable string id used in storage and CLI input.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn is_daily(self) -> bool {
        matches!(self, Self::Daily)
    }
}

impl Display for Granularity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = TrackerValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(TrackerValidationError::UnknownGranularity(
                other.to_string(),
            )),
        }
    }
}

/// A user-defined recurring item (habit, chore, goal) that entries are
/// logged against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
    pub id: TrackerId,
    /// Display name. Never written to logs.
    pub name: String,
    pub granularity: Granularity,
    pub created_at: DateTime<Utc>,
    /// Soft delete tombstone; archived trackers keep their entries.
    pub is_archived: bool,
}

impl Tracker {
    /// Creates a tracker with a generated ID, stamped at the current instant.
    pub fn new(name: impl Into<String>, granularity: Granularity) -> Self {
        Self::with_id(Uuid::new_v4(), name, granularity, Utc::now())
    }

    /// Creates a tracker with caller-provided identity and creation time.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(
        id: TrackerId,
        name: impl Into<String>,
        granularity: Granularity,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            granularity,
            created_at,
            is_archived: false,
        }
    }

    /// Validates write-path invariants.
    ///
    /// # Errors
    /// - `EmptyName` when the name is blank after trimming.
    /// - `NameTooLong` when the name exceeds `MAX_TRACKER_NAME_CHARS`.
    pub fn validate(&self) -> Result<(), TrackerValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(TrackerValidationError::EmptyName);
        }
        let actual = name.chars().count();
        if actual > MAX_TRACKER_NAME_CHARS {
            return Err(TrackerValidationError::NameTooLong {
                max_chars: MAX_TRACKER_NAME_CHARS,
                actual,
            });
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        !self.is_archived
    }
}

/// Trims a tracker name and collapses inner whitespace runs to one space.
pub fn normalize_tracker_name(name: &str) -> String {
    WHITESPACE_RE.replace_all(name.trim(), " ").into_owned()
}

/// Tracker validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerValidationError {
    EmptyName,
    NameTooLong { max_chars: usize, actual: usize },
    UnknownGranularity(String),
}

impl Display for TrackerValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "tracker name cannot be empty"),
            Self::NameTooLong { max_chars, actual } => write!(
                f,
                "tracker name is {actual} chars; at most {max_chars} are allowed"
            ),
            Self::UnknownGranularity(value) => write!(
                f,
                "unknown granularity `{value}`; expected daily|weekly|monthly"
            ),
        }
    }
}

impl Error for TrackerValidationError {}
