//! Per-tracker engagement calculator.
//!
//! # Invariants
//! - Output depends only on the tracker, the entry slice and `now`.
//! - `consistency_score` is finite and within `[0, 1]`.
//! - Day arithmetic is by calendar date in UTC; entries dated after `now`
//!   count as logged today.

use crate::insights::config::{MONTH_DAYS, WEEK_DAYS};
use crate::model::entry::Entry;
use crate::model::insights::{EngagementLevel, EngagementSnapshot};
use crate::model::tracker::Tracker;
use chrono::{DateTime, NaiveDate, Utc};

/// Trackers idle for more than this many days need attention.
const ATTENTION_IDLE_DAYS: i64 = 2;
const HIGH_ENGAGEMENT_WEEKLY: u32 = 5;
const MEDIUM_ENGAGEMENT_WEEKLY: u32 = 3;

/// Computes an engagement snapshot for `tracker` from `entries` as of `now`.
///
/// Entries are not required to be sorted or unique by date. Entries that
/// belong to other trackers are the caller's responsibility.
pub fn compute_engagement(
    tracker: &Tracker,
    entries: &[Entry],
    now: DateTime<Utc>,
) -> EngagementSnapshot {
    let today = now.date_naive();

    let days_since_last_entry = entries
        .iter()
        .map(|entry| entry.entry_date)
        .max()
        .map(|latest| days_ago(today, latest).max(0));

    let entries_last_7_days = count_within(entries, today, WEEK_DAYS);
    let entries_last_30_days = count_within(entries, today, MONTH_DAYS);
    let total_entries = u32::try_from(entries.len()).unwrap_or(u32::MAX);

    let consistency_score = if tracker.granularity.is_daily() {
        daily_consistency(entries_last_7_days)
    } else {
        let days_since_created = (now - tracker.created_at).num_days().max(1);
        relative_consistency(days_since_created, total_entries, entries_last_7_days)
    };

    let needs_attention = days_since_last_entry.is_some_and(|days| days > ATTENTION_IDLE_DAYS)
        || (entries_last_7_days == 0 && total_entries > 0);

    EngagementSnapshot {
        tracker_id: tracker.id,
        tracker_name: tracker.name.clone(),
        granularity: tracker.granularity,
        days_since_last_entry,
        entries_last_7_days,
        entries_last_30_days,
        total_entries,
        consistency_score,
        needs_attention,
        engagement_level: engagement_level(entries_last_7_days, total_entries),
    }
}

/// Whole calendar days from `date` to `today`; negative for future dates.
pub(crate) fn days_ago(today: NaiveDate, date: NaiveDate) -> i64 {
    (today - date).num_days()
}

fn count_within(entries: &[Entry], today: NaiveDate, window_days: i64) -> u32 {
    let count = entries
        .iter()
        .filter(|entry| days_ago(today, entry.entry_date) < window_days)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn daily_consistency(entries_last_7_days: u32) -> f64 {
    (f64::from(entries_last_7_days) / WEEK_DAYS as f64).min(1.0)
}

/// Ratio of the recent weekly rate to the tracker's lifetime rate.
///
/// `expected` is the average number of days between entries since creation,
/// so the ratio compares an entries-per-day rate to a days-per-entry rate.
fn relative_consistency(
    days_since_created: i64,
    total_entries: u32,
    entries_last_7_days: u32,
) -> f64 {
    let expected = days_since_created as f64 / f64::from(total_entries.max(1));
    let recent = f64::from(entries_last_7_days) / WEEK_DAYS as f64;
    bounded_ratio(recent, expected)
}

/// `recent / expected` clamped to `[0, 1]`; a zero or non-finite
/// denominator maps to 1 when there is recent activity and 0 otherwise.
fn bounded_ratio(recent: f64, expected: f64) -> f64 {
    if expected <= 0.0 || !expected.is_finite() {
        return if recent > 0.0 { 1.0 } else { 0.0 };
    }
    (recent / expected).clamp(0.0, 1.0)
}

fn engagement_level(entries_last_7_days: u32, total_entries: u32) -> EngagementLevel {
    if entries_last_7_days >= HIGH_ENGAGEMENT_WEEKLY {
        EngagementLevel::High
    } else if entries_last_7_days >= MEDIUM_ENGAGEMENT_WEEKLY {
        EngagementLevel::Medium
    } else if entries_last_7_days >= 1 || total_entries > 0 {
        EngagementLevel::Low
    } else {
        EngagementLevel::None
    }
}
