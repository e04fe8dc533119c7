//! Entry domain model.
//!
//! # Responsibility
//! - Define one dated observation logged against a tracker.
//!
//! # Invariants
//! - `entry_date` is a calendar date with no time-of-day component.
//! - Several entries may share the same `(tracker_id, entry_date)`; readers
//!   must not assume uniqueness by date.

use crate::model::tracker::{Tracker, TrackerId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type EntryId = Uuid;

/// Upper bound for free-form entry notes, counted in chars.
pub const MAX_ENTRY_NOTE_CHARS: usize = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub tracker_id: TrackerId,
    pub entry_date: NaiveDate,
    /// Optional user text. Never written to logs.
    pub note: Option<String>,
    /// Arrival instant; defines the implicit creation order of entries.
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn new(tracker_id: TrackerId, entry_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            tracker_id,
            entry_date,
            note: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Validates the entry against the tracker it is logged for.
    ///
    /// # Errors
    /// - `TrackerMismatch` when `tracker_id` differs from `tracker.id`.
    /// - `BeforeTrackerCreation` when the entry predates the tracker.
    /// - `NoteTooLong` when the note exceeds `MAX_ENTRY_NOTE_CHARS`.
    pub fn validate_for(&self, tracker: &Tracker) -> Result<(), EntryValidationError> {
        if self.tracker_id != tracker.id {
            return Err(EntryValidationError::TrackerMismatch {
                expected: tracker.id,
                actual: self.tracker_id,
            });
        }
        let created_on = tracker.created_at.date_naive();
        if self.entry_date < created_on {
            return Err(EntryValidationError::BeforeTrackerCreation {
                entry_date: self.entry_date,
                created_on,
            });
        }
        if let Some(note) = &self.note {
            let actual = note.chars().count();
            if actual > MAX_ENTRY_NOTE_CHARS {
                return Err(EntryValidationError::NoteTooLong {
                    max_chars: MAX_ENTRY_NOTE_CHARS,
                    actual,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    TrackerMismatch {
        expected: TrackerId,
        actual: TrackerId,
    },
    BeforeTrackerCreation {
        entry_date: NaiveDate,
        created_on: NaiveDate,
    },
    NoteTooLong {
        max_chars: usize,
        actual: usize,
    },
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrackerMismatch { expected, actual } => {
                write!(f, "entry belongs to tracker {actual}, expected {expected}")
            }
            Self::BeforeTrackerCreation {
                entry_date,
                created_on,
            } => write!(
                f,
                "entry date {entry_date} is before tracker creation date {created_on}"
            ),
            Self::NoteTooLong { max_chars, actual } => write!(
                f,
                "entry note is {actual} chars; at most {max_chars} are allowed"
            ),
        }
    }
}

impl Error for EntryValidationError {}

#[cfg(test)]
mod tests {
    use super::{Entry, EntryValidationError};
    use crate::model::tracker::{Granularity, Tracker};
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn tracker() -> Tracker {
        Tracker::with_id(
            Uuid::new_v4(),
            "stretch",
            Granularity::Daily,
            Utc.with_ymd_and_hms(2026, 3, 10, 18, 30, 0).unwrap(),
        )
    }

    #[test]
    fn entry_on_creation_day_is_valid() {
        let tracker = tracker();
        let entry = Entry::new(tracker.id, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        assert!(entry.validate_for(&tracker).is_ok());
    }

    #[test]
    fn entry_before_creation_day_is_rejected() {
        let tracker = tracker();
        let entry = Entry::new(tracker.id, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        assert!(matches!(
            entry.validate_for(&tracker),
            Err(EntryValidationError::BeforeTrackerCreation { .. })
        ));
    }

    #[test]
    fn entry_for_other_tracker_is_rejected() {
        let tracker = tracker();
        let entry = Entry::new(Uuid::new_v4(), NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
        assert!(matches!(
            entry.validate_for(&tracker),
            Err(EntryValidationError::TrackerMismatch { .. })
        ));
    }
}
