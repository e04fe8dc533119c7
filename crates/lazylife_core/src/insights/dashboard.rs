//! Owner-level dashboard aggregation.
//!
//! # Responsibility
//! - Fetch each tracker's recent entries concurrently through an `EntryStore`.
//! - Compute one engagement snapshot per tracker and fold them into ranked
//!   attention/activity/consistency lists, running totals and a status line.
//!
//! # Invariants
//! - All fetches are awaited (join semantics) before any folding starts.
//! - A failed or timed-out fetch is logged and replaced by an empty entry
//!   set; `summarize*` always returns a complete summary.
//! - Ties in every ranking keep the input tracker order.

use crate::insights::config::{ConfigError, InsightsConfig, WEEK_DAYS};
use crate::insights::engagement::{compute_engagement, days_ago};
use crate::model::entry::Entry;
use crate::model::insights::{
    ActiveTrackerItem, AttentionItem, ConsistentTrackerItem, DashboardSummary, EngagementSnapshot,
};
use crate::model::tracker::{Tracker, TrackerId};
use crate::store::{EntryStore, StoreError};
use chrono::{DateTime, Days, NaiveDate, Utc};
use futures::future::join_all;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub const ONBOARDING_MESSAGE: &str = "Create your first tracker to start tracking.";
const FIRST_ENTRY_MESSAGE: &str = "Log your first entry to start seeing insights.";

/// Per-tracker entry fetch failure.
#[derive(Debug)]
pub enum FetchError {
    FetchFailed {
        tracker_id: TrackerId,
        source: StoreError,
    },
    TimedOut {
        tracker_id: TrackerId,
        after: std::time::Duration,
    },
}

impl FetchError {
    pub fn tracker_id(&self) -> TrackerId {
        match self {
            Self::FetchFailed { tracker_id, .. } | Self::TimedOut { tracker_id, .. } => *tracker_id,
        }
    }

    /// Stable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FetchFailed { .. } => "entry_fetch_failed",
            Self::TimedOut { .. } => "entry_fetch_timeout",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchFailed { tracker_id, source } => {
                write!(f, "failed to fetch entries for tracker {tracker_id}: {source}")
            }
            Self::TimedOut { tracker_id, after } => write!(
                f,
                "fetching entries for tracker {tracker_id} timed out after {} ms",
                after.as_millis()
            ),
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::FetchFailed { source, .. } => Some(source),
            Self::TimedOut { .. } => None,
        }
    }
}

/// Dashboard aggregator over one entry store.
pub struct DashboardAggregator<S: EntryStore> {
    store: S,
    config: InsightsConfig,
}

impl<S: EntryStore> DashboardAggregator<S> {
    /// Creates an aggregator with default settings.
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: InsightsConfig::default(),
        }
    }

    /// Creates an aggregator with validated custom settings.
    pub fn with_config(store: S, config: InsightsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &InsightsConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Summarizes `trackers` as of the current instant.
    pub async fn summarize(&self, trackers: &[Tracker]) -> DashboardSummary {
        self.summarize_at(trackers, Utc::now()).await
    }

    /// Summarizes `trackers` as of `now`.
    ///
    /// The result is a pure function of the trackers, the fetched entries
    /// and `now`.
    pub async fn summarize_at(&self, trackers: &[Tracker], now: DateTime<Utc>) -> DashboardSummary {
        if trackers.is_empty() {
            info!("event=dashboard_summarize module=insights status=ok tracker_count=0");
            return onboarding_summary();
        }

        let started_at = Instant::now();
        info!(
            "event=dashboard_summarize module=insights status=start tracker_count={}",
            trackers.len()
        );

        let today = now.date_naive();
        let window_start = self.window_start(today);
        let results = join_all(
            trackers
                .iter()
                .map(|tracker| self.fetch_entries(tracker.id, window_start, today)),
        )
        .await;

        let mut degraded_fetches = 0usize;
        let mut totals = EntryTotals::default();
        let mut snapshots = Vec::with_capacity(trackers.len());
        for (tracker, result) in trackers.iter().zip(results) {
            let entries = result.unwrap_or_else(|err| {
                degraded_fetches += 1;
                warn!(
                    "event=entry_fetch module=insights status=degraded tracker_id={} error_code={} error={}",
                    err.tracker_id(),
                    err.code(),
                    err
                );
                Vec::new()
            });
            totals.add(&entries, today);
            snapshots.push(compute_engagement(tracker, &entries, now));
        }

        let summary = fold_snapshots(&snapshots, totals, &self.config);
        info!(
            "event=dashboard_summarize module=insights status=ok tracker_count={} degraded_fetches={} needing_attention={} duration_ms={}",
            trackers.len(),
            degraded_fetches,
            summary.trackers_needing_attention.len(),
            started_at.elapsed().as_millis()
        );
        summary
    }

    /// Computes one tracker's snapshot as of `now`.
    ///
    /// Unlike `summarize_at`, a fetch failure is returned to the caller.
    pub async fn snapshot_at(
        &self,
        tracker: &Tracker,
        now: DateTime<Utc>,
    ) -> Result<EngagementSnapshot, FetchError> {
        let today = now.date_naive();
        let entries = self
            .fetch_entries(tracker.id, self.window_start(today), today)
            .await?;
        Ok(compute_engagement(tracker, &entries, now))
    }

    /// First day of the fetch window, saturating at the earliest
    /// representable date.
    fn window_start(&self, today: NaiveDate) -> NaiveDate {
        let span = u64::from(self.config.lookback_days.saturating_sub(1));
        today.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN)
    }

    async fn fetch_entries(
        &self,
        tracker_id: TrackerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Entry>, FetchError> {
        let after = self.config.fetch_timeout();
        match tokio::time::timeout(
            after,
            self.store.list_entries_by_date_range(tracker_id, start, end),
        )
        .await
        {
            Ok(Ok(entries)) => Ok(entries),
            Ok(Err(source)) => Err(FetchError::FetchFailed { tracker_id, source }),
            Err(_) => Err(FetchError::TimedOut { tracker_id, after }),
        }
    }
}

/// Summary returned when the owner has no trackers at all.
pub fn onboarding_summary() -> DashboardSummary {
    DashboardSummary {
        trackers_needing_attention: Vec::new(),
        most_active_tracker: None,
        most_consistent_trackers: Vec::new(),
        total_entries_today: 0,
        total_entries_this_week: 0,
        status_message: ONBOARDING_MESSAGE.to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct EntryTotals {
    today: u32,
    this_week: u32,
}

impl EntryTotals {
    fn add(&mut self, entries: &[Entry], today: NaiveDate) {
        for entry in entries {
            let age = days_ago(today, entry.entry_date);
            if age == 0 {
                self.today += 1;
            }
            if (0..WEEK_DAYS).contains(&age) {
                self.this_week += 1;
            }
        }
    }
}

fn fold_snapshots(
    snapshots: &[EngagementSnapshot],
    totals: EntryTotals,
    config: &InsightsConfig,
) -> DashboardSummary {
    DashboardSummary {
        trackers_needing_attention: rank_attention(snapshots, config.attention_limit),
        most_active_tracker: pick_most_active(snapshots),
        most_consistent_trackers: rank_consistent(
            snapshots,
            config.consistency_threshold,
            config.consistent_limit,
        ),
        total_entries_today: totals.today,
        total_entries_this_week: totals.this_week,
        status_message: status_message(totals.today, totals.this_week, snapshots.len()),
    }
}

fn rank_attention(snapshots: &[EngagementSnapshot], limit: usize) -> Vec<AttentionItem> {
    let mut flagged: Vec<&EngagementSnapshot> = snapshots
        .iter()
        .filter(|snapshot| snapshot.needs_attention)
        .collect();
    // Stable sort keeps input order among equal idle spans.
    flagged.sort_by(|a, b| {
        b.days_since_last_entry
            .unwrap_or(0)
            .cmp(&a.days_since_last_entry.unwrap_or(0))
    });

    flagged
        .into_iter()
        .take(limit)
        .map(|snapshot| AttentionItem {
            tracker_id: snapshot.tracker_id,
            tracker_name: snapshot.tracker_name.clone(),
            days_since_last_entry: snapshot.days_since_last_entry,
            message: attention_message(snapshot.days_since_last_entry),
        })
        .collect()
}

fn pick_most_active(snapshots: &[EngagementSnapshot]) -> Option<ActiveTrackerItem> {
    let mut best: Option<&EngagementSnapshot> = None;
    for snapshot in snapshots.iter().filter(|s| s.entries_last_7_days > 0) {
        if best.map_or(true, |current| snapshot.entries_last_7_days > current.entries_last_7_days) {
            best = Some(snapshot);
        }
    }

    best.map(|snapshot| ActiveTrackerItem {
        tracker_id: snapshot.tracker_id,
        tracker_name: snapshot.tracker_name.clone(),
        entries_last_7_days: snapshot.entries_last_7_days,
        message: format!(
            "{} {} this week",
            snapshot.entries_last_7_days,
            entry_noun(snapshot.entries_last_7_days)
        ),
    })
}

fn rank_consistent(
    snapshots: &[EngagementSnapshot],
    threshold: f64,
    limit: usize,
) -> Vec<ConsistentTrackerItem> {
    let mut consistent: Vec<&EngagementSnapshot> = snapshots
        .iter()
        .filter(|snapshot| {
            snapshot.consistency_score >= threshold && snapshot.entries_last_7_days > 0
        })
        .collect();
    consistent.sort_by(|a, b| b.consistency_score.total_cmp(&a.consistency_score));

    consistent
        .into_iter()
        .take(limit)
        .map(|snapshot| ConsistentTrackerItem {
            tracker_id: snapshot.tracker_id,
            tracker_name: snapshot.tracker_name.clone(),
            consistency_score: snapshot.consistency_score,
            message: format!(
                "{}% consistent this week",
                (snapshot.consistency_score * 100.0).round() as u32
            ),
        })
        .collect()
}

fn attention_message(days_since_last_entry: Option<i64>) -> String {
    match days_since_last_entry {
        None => "No entries yet".to_string(),
        Some(0) => "Logged today".to_string(),
        Some(1) => "Last logged yesterday".to_string(),
        Some(days) => format!("Last logged {days} days ago"),
    }
}

fn status_message(entries_today: u32, entries_this_week: u32, tracker_count: usize) -> String {
    if entries_today > 0 {
        format!(
            "You've logged {entries_today} {} today.",
            entry_noun(entries_today)
        )
    } else if entries_this_week > 0 {
        format!(
            "You've logged {entries_this_week} {} this week.",
            entry_noun(entries_this_week)
        )
    } else if tracker_count > 0 {
        FIRST_ENTRY_MESSAGE.to_string()
    } else {
        ONBOARDING_MESSAGE.to_string()
    }
}

fn entry_noun(count: u32) -> &'static str {
    if count == 1 {
        "entry"
    } else {
        "entries"
    }
}
