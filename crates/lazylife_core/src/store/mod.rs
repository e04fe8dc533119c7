//! Async entry store accessor used by the insights aggregator.
//!
//! # Responsibility
//! - Expose date-range entry reads behind an object-safe async contract so
//!   the aggregator can fan out one fetch per tracker.
//! - Bridge the blocking SQLite repository onto tokio's blocking pool.
//!
//! # Invariants
//! - Reads are side-effect free.
//! - `start <= end` is enforced by the underlying repository.

use crate::model::entry::Entry;
use crate::model::tracker::TrackerId;
use crate::repo::entry_repo::{EntryRepository, SqliteEntryRepository};
use crate::repo::tracker_repo::RepoError;
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

/// Failure surfaced by an entry store read.
#[derive(Debug)]
pub enum StoreError {
    Repo(RepoError),
    /// Shared connection lock was poisoned by a panicking holder.
    ConnectionPoisoned,
    /// Blocking task was cancelled or panicked.
    Join(tokio::task::JoinError),
    /// Backend-specific failure described by its message only.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::ConnectionPoisoned => write!(f, "entry store connection lock poisoned"),
            Self::Join(err) => write!(f, "entry store task failed: {err}"),
            Self::Unavailable(message) => write!(f, "entry store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Join(err) => Some(err),
            Self::ConnectionPoisoned | Self::Unavailable(_) => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Date-range entry reads for one tracker.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Returns entries dated within `[start, end]`, ordered by arrival.
    async fn list_entries_by_date_range(
        &self,
        tracker_id: TrackerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Entry>, StoreError>;
}

#[async_trait]
impl<S: EntryStore + ?Sized> EntryStore for Arc<S> {
    async fn list_entries_by_date_range(
        &self,
        tracker_id: TrackerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Entry>, StoreError> {
        (**self)
            .list_entries_by_date_range(tracker_id, start, end)
            .await
    }
}

/// SQLite-backed entry store sharing one connection across fetches.
///
/// Concurrent fetches are issued together but serialize on the connection
/// lock; each runs on the blocking pool so the async caller never stalls a
/// runtime worker.
#[derive(Clone)]
pub struct SqliteEntryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEntryStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn list_entries_by_date_range(
        &self,
        tracker_id: TrackerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Entry>, StoreError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || -> Result<Vec<Entry>, StoreError> {
            let guard = conn.lock().map_err(|_| StoreError::ConnectionPoisoned)?;
            let entries = SqliteEntryRepository::new(&guard)
                .list_entries_by_date_range(tracker_id, start, end)?;
            Ok(entries)
        })
        .await
        .map_err(StoreError::Join)?
    }
}
