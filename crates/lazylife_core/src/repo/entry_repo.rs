//! Entry repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist dated entries against existing trackers.
//! - Serve inclusive date-range reads in arrival order.
//!
//! # Invariants
//! - An entry is only written when its tracker exists and the entry date is
//!   not earlier than the tracker's creation date.
//! - Range reads never dedupe by date.

use crate::model::entry::{Entry, EntryId};
use crate::model::tracker::TrackerId;
use crate::repo::tracker_repo::{
    parse_epoch_ms, parse_uuid_column, RepoError, RepoResult, SqliteTrackerRepository,
    TrackerRepository,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const ENTRY_SELECT_SQL: &str = "SELECT
    uuid,
    tracker_uuid,
    entry_date,
    note,
    created_at
FROM tracker_entries";

const ENTRY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository interface for entry persistence.
pub trait EntryRepository {
    fn create_entry(&self, entry: &Entry) -> RepoResult<EntryId>;
    /// Lists entries dated within `[start, end]`, ordered by arrival.
    ///
    /// # Errors
    /// - `InvalidRange` when `start > end`.
    fn list_entries_by_date_range(
        &self,
        tracker_id: TrackerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<Entry>>;
    fn count_entries(&self, tracker_id: TrackerId) -> RepoResult<u32>;
    fn delete_entry(&self, id: EntryId) -> RepoResult<()>;
}

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn create_entry(&self, entry: &Entry) -> RepoResult<EntryId> {
        let tracker = SqliteTrackerRepository::new(self.conn)
            .get_tracker(entry.tracker_id, true)?
            .ok_or(RepoError::NotFound(entry.tracker_id))?;
        entry.validate_for(&tracker)?;

        self.conn.execute(
            "INSERT INTO tracker_entries (uuid, tracker_uuid, entry_date, note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                entry.id.to_string(),
                entry.tracker_id.to_string(),
                format_entry_date(entry.entry_date),
                entry.note.as_deref(),
                entry.created_at.timestamp_millis(),
            ],
        )?;

        Ok(entry.id)
    }

    fn list_entries_by_date_range(
        &self,
        tracker_id: TrackerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<Entry>> {
        if start > end {
            return Err(RepoError::InvalidRange { start, end });
        }

        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL}
             WHERE tracker_uuid = ?1
               AND entry_date >= ?2
               AND entry_date <= ?3
             ORDER BY created_at ASC, rowid ASC;"
        ))?;

        let mut rows = stmt.query(params![
            tracker_id.to_string(),
            format_entry_date(start),
            format_entry_date(end),
        ])?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }

    fn count_entries(&self, tracker_id: TrackerId) -> RepoResult<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM tracker_entries WHERE tracker_uuid = ?1;",
            [tracker_id.to_string()],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }

    fn delete_entry(&self, id: EntryId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM tracker_entries WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<Entry> {
    let date_text: String = row.get("entry_date")?;
    let entry_date = NaiveDate::parse_from_str(&date_text, ENTRY_DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date `{date_text}` in tracker_entries.entry_date"
        ))
    })?;

    Ok(Entry {
        id: parse_uuid_column(row, "uuid", "tracker_entries.uuid")?,
        tracker_id: parse_uuid_column(row, "tracker_uuid", "tracker_entries.tracker_uuid")?,
        entry_date,
        note: row.get("note")?,
        created_at: parse_epoch_ms(row.get("created_at")?, "tracker_entries.created_at")?,
    })
}

fn format_entry_date(date: NaiveDate) -> String {
    date.format(ENTRY_DATE_FORMAT).to_string()
}
