//! Tracker repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable create/read/archive APIs over `trackers` storage.
//! - Own the shared repository error type.
//!
//! # Invariants
//! - Write paths must call `Tracker::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::entry::EntryValidationError;
use crate::model::tracker::{Granularity, Tracker, TrackerId, TrackerValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TRACKER_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    granularity,
    created_at,
    is_archived
FROM trackers";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by tracker and entry persistence.
#[derive(Debug)]
pub enum RepoError {
    TrackerValidation(TrackerValidationError),
    EntryValidation(EntryValidationError),
    Db(DbError),
    NotFound(Uuid),
    InvalidRange { start: NaiveDate, end: NaiveDate },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrackerValidation(err) => write!(f, "{err}"),
            Self::EntryValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidRange { start, end } => {
                write!(f, "invalid date range: start {start} is after end {end}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TrackerValidation(err) => Some(err),
            Self::EntryValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidRange { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<TrackerValidationError> for RepoError {
    fn from(value: TrackerValidationError) -> Self {
        Self::TrackerValidation(value)
    }
}

impl From<EntryValidationError> for RepoError {
    fn from(value: EntryValidationError) -> Self {
        Self::EntryValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing trackers.
#[derive(Debug, Clone, Default)]
pub struct TrackerListQuery {
    pub include_archived: bool,
    pub limit: Option<u32>,
}

/// Repository interface for tracker persistence.
pub trait TrackerRepository {
    fn create_tracker(&self, tracker: &Tracker) -> RepoResult<TrackerId>;
    fn get_tracker(&self, id: TrackerId, include_archived: bool) -> RepoResult<Option<Tracker>>;
    /// Lists trackers oldest first (`created_at ASC, uuid ASC`).
    fn list_trackers(&self, query: &TrackerListQuery) -> RepoResult<Vec<Tracker>>;
    /// Soft-deletes a tracker. Archiving twice is not an error.
    fn archive_tracker(&self, id: TrackerId) -> RepoResult<()>;
}

/// SQLite-backed tracker repository.
pub struct SqliteTrackerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTrackerRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TrackerRepository for SqliteTrackerRepository<'_> {
    fn create_tracker(&self, tracker: &Tracker) -> RepoResult<TrackerId> {
        tracker.validate()?;

        self.conn.execute(
            "INSERT INTO trackers (uuid, name, granularity, created_at, is_archived)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                tracker.id.to_string(),
                tracker.name.as_str(),
                tracker.granularity.as_str(),
                tracker.created_at.timestamp_millis(),
                bool_to_int(tracker.is_archived),
            ],
        )?;

        Ok(tracker.id)
    }

    fn get_tracker(&self, id: TrackerId, include_archived: bool) -> RepoResult<Option<Tracker>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TRACKER_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR is_archived = 0);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_archived)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_tracker_row(row)?));
        }

        Ok(None)
    }

    fn list_trackers(&self, query: &TrackerListQuery) -> RepoResult<Vec<Tracker>> {
        let mut sql = format!("{TRACKER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_archived {
            sql.push_str(" AND is_archived = 0");
        }

        sql.push_str(" ORDER BY created_at ASC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut trackers = Vec::new();

        while let Some(row) = rows.next()? {
            trackers.push(parse_tracker_row(row)?);
        }

        Ok(trackers)
    }

    fn archive_tracker(&self, id: TrackerId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE trackers SET is_archived = 1 WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_tracker_row(row: &Row<'_>) -> RepoResult<Tracker> {
    let id = parse_uuid_column(row, "uuid", "trackers.uuid")?;

    let granularity_text: String = row.get("granularity")?;
    let granularity = granularity_text.parse::<Granularity>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid granularity `{granularity_text}` in trackers.granularity"
        ))
    })?;

    let is_archived = match row.get::<_, i64>("is_archived")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_archived value `{other}` in trackers.is_archived"
            )));
        }
    };

    let tracker = Tracker {
        id,
        name: row.get("name")?,
        granularity,
        created_at: parse_epoch_ms(row.get("created_at")?, "trackers.created_at")?,
        is_archived,
    };
    tracker.validate()?;
    Ok(tracker)
}

pub(crate) fn parse_uuid_column(row: &Row<'_>, column: &str, label: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {label}")))
}

pub(crate) fn parse_epoch_ms(value: i64, label: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid timestamp `{value}` in {label}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
