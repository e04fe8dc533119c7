//! Tracker use-case service.
//!
//! # Responsibility
//! - Create, list and archive trackers.
//! - Log dated entries against active trackers.
//!
//! # Invariants
//! - Tracker names are normalized before persistence.
//! - Archived trackers accept no new entries.
//! - Service layer remains storage-agnostic.

use crate::model::entry::{Entry, EntryId};
use crate::model::tracker::{normalize_tracker_name, Granularity, Tracker, TrackerId};
use crate::repo::entry_repo::EntryRepository;
use crate::repo::tracker_repo::{RepoError, TrackerListQuery, TrackerRepository};
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for tracker use-cases.
#[derive(Debug)]
pub enum TrackerServiceError {
    TrackerNotFound(TrackerId),
    TrackerArchived(TrackerId),
    EntryNotFound(EntryId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for TrackerServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrackerNotFound(id) => write!(f, "tracker not found: {id}"),
            Self::TrackerArchived(id) => write!(f, "tracker is archived: {id}"),
            Self::EntryNotFound(id) => write!(f, "entry not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent tracker state: {details}"),
        }
    }
}

impl Error for TrackerServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TrackerServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type ServiceResult<T> = Result<T, TrackerServiceError>;

/// Tracker service facade over repository implementations.
pub struct TrackerService<T: TrackerRepository, E: EntryRepository> {
    trackers: T,
    entries: E,
}

impl<T: TrackerRepository, E: EntryRepository> TrackerService<T, E> {
    pub fn new(trackers: T, entries: E) -> Self {
        Self { trackers, entries }
    }

    /// Creates one tracker with a normalized name.
    pub fn create_tracker(&self, name: &str, granularity: Granularity) -> ServiceResult<Tracker> {
        let tracker = Tracker::new(normalize_tracker_name(name), granularity);
        let id = self.trackers.create_tracker(&tracker)?;
        info!(
            "event=tracker_create module=service status=ok tracker_id={id} granularity={granularity}"
        );

        self.trackers
            .get_tracker(id, false)?
            .ok_or(TrackerServiceError::InconsistentState(
                "created tracker not found in read-back",
            ))
    }

    /// Lists trackers oldest first.
    pub fn list_trackers(&self, include_archived: bool) -> ServiceResult<Vec<Tracker>> {
        let query = TrackerListQuery {
            include_archived,
            ..TrackerListQuery::default()
        };
        Ok(self.trackers.list_trackers(&query)?)
    }

    pub fn get_tracker(&self, id: TrackerId) -> ServiceResult<Tracker> {
        self.trackers
            .get_tracker(id, true)?
            .ok_or(TrackerServiceError::TrackerNotFound(id))
    }

    pub fn archive_tracker(&self, id: TrackerId) -> ServiceResult<()> {
        self.trackers.archive_tracker(id).map_err(|err| match err {
            RepoError::NotFound(_) => TrackerServiceError::TrackerNotFound(id),
            other => TrackerServiceError::Repo(other),
        })?;
        info!("event=tracker_archive module=service status=ok tracker_id={id}");
        Ok(())
    }

    /// Logs one entry for `date` against an active tracker.
    ///
    /// # Errors
    /// - `TrackerNotFound` / `TrackerArchived` for unknown or archived trackers.
    /// - `Repo(EntryValidation(..))` when the date predates the tracker.
    pub fn log_entry(
        &self,
        tracker_id: TrackerId,
        date: NaiveDate,
        note: Option<String>,
    ) -> ServiceResult<Entry> {
        let tracker = self.get_tracker(tracker_id)?;
        if !tracker.is_active() {
            return Err(TrackerServiceError::TrackerArchived(tracker_id));
        }

        let mut entry = Entry::new(tracker_id, date);
        if let Some(note) = note.as_deref().map(str::trim).filter(|value| !value.is_empty()) {
            entry = entry.with_note(note);
        }
        self.entries.create_entry(&entry)?;
        info!(
            "event=entry_log module=service status=ok tracker_id={tracker_id} entry_id={}",
            entry.id
        );
        Ok(entry)
    }

    pub fn remove_entry(&self, id: EntryId) -> ServiceResult<()> {
        self.entries.delete_entry(id).map_err(|err| match err {
            RepoError::NotFound(_) => TrackerServiceError::EntryNotFound(id),
            other => TrackerServiceError::Repo(other),
        })
    }

    /// Returns entries dated within `[start, end]` in arrival order.
    pub fn entries_between(
        &self,
        tracker_id: TrackerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<Entry>> {
        Ok(self
            .entries
            .list_entries_by_date_range(tracker_id, start, end)?)
    }

    pub fn count_entries(&self, tracker_id: TrackerId) -> ServiceResult<u32> {
        Ok(self.entries.count_entries(tracker_id)?)
    }
}
