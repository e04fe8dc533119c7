use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use lazylife_core::db::open_db_in_memory;
use lazylife_core::{
    onboarding_summary, ConfigError, DashboardAggregator, EngagementLevel, Entry, EntryRepository,
    EntryStore, FetchError, Granularity, InsightsConfig, SqliteEntryRepository, SqliteEntryStore,
    SqliteTrackerRepository, StoreError, Tracker, TrackerId, TrackerRepository,
};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::sync::Mutex;
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 15, 16, 45, 0).unwrap()
}

fn tracker(name: &str, granularity: Granularity) -> Tracker {
    Tracker::with_id(
        Uuid::new_v4(),
        name,
        granularity,
        now() - Duration::days(60),
    )
}

fn entries_days_ago(tracker: &Tracker, days: &[i64]) -> Vec<Entry> {
    days.iter()
        .map(|days| Entry::new(tracker.id, now().date_naive() - Duration::days(*days)))
        .collect()
}

/// In-memory store with scripted outages and stalls.
#[derive(Default)]
struct ScriptedStore {
    entries: HashMap<TrackerId, Vec<Entry>>,
    failing: HashSet<TrackerId>,
    stalled: HashSet<TrackerId>,
    calls: Mutex<Vec<(TrackerId, NaiveDate, NaiveDate)>>,
}

impl ScriptedStore {
    fn with_entries(mut self, tracker: &Tracker, days: &[i64]) -> Self {
        self.entries
            .entry(tracker.id)
            .or_default()
            .extend(entries_days_ago(tracker, days));
        self
    }

    fn failing_for(mut self, tracker: &Tracker) -> Self {
        self.failing.insert(tracker.id);
        self
    }

    fn stalled_for(mut self, tracker: &Tracker) -> Self {
        self.stalled.insert(tracker.id);
        self
    }
}

#[async_trait]
impl EntryStore for ScriptedStore {
    async fn list_entries_by_date_range(
        &self,
        tracker_id: TrackerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Entry>, StoreError> {
        self.calls.lock().unwrap().push((tracker_id, start, end));
        if self.failing.contains(&tracker_id) {
            return Err(StoreError::Unavailable("scripted outage".to_string()));
        }
        if self.stalled.contains(&tracker_id) {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        }
        Ok(self
            .entries
            .get(&tracker_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.entry_date >= start && entry.entry_date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[tokio::test]
async fn empty_tracker_list_returns_onboarding_summary() {
    let aggregator = DashboardAggregator::new(ScriptedStore::default());

    let summary = aggregator.summarize_at(&[], now()).await;

    assert!(summary.trackers_needing_attention.is_empty());
    assert!(summary.most_active_tracker.is_none());
    assert!(summary.most_consistent_trackers.is_empty());
    assert_eq!(summary.total_entries_today, 0);
    assert_eq!(summary.total_entries_this_week, 0);
    assert_eq!(
        summary.status_message,
        "Create your first tracker to start tracking."
    );
    assert_eq!(summary, onboarding_summary());
}

#[tokio::test]
async fn active_tracker_and_stale_tracker_are_ranked() {
    let a = tracker("A", Granularity::Daily);
    let b = tracker("B", Granularity::Daily);
    let store = ScriptedStore::default()
        .with_entries(&a, &[0, 1, 2, 3, 4])
        .with_entries(&b, &[10]);
    let aggregator = DashboardAggregator::new(store);

    let summary = aggregator
        .summarize_at(&[a.clone(), b.clone()], now())
        .await;

    let active = summary.most_active_tracker.as_ref().unwrap();
    assert_eq!(active.tracker_id, a.id);
    assert_eq!(active.message, "5 entries this week");

    assert_eq!(summary.trackers_needing_attention.len(), 1);
    let stale = &summary.trackers_needing_attention[0];
    assert_eq!(stale.tracker_id, b.id);
    assert_eq!(stale.days_since_last_entry, Some(10));
    assert_eq!(stale.message, "Last logged 10 days ago");

    assert_eq!(summary.total_entries_today, 1);
    assert_eq!(summary.total_entries_this_week, 5);
    assert_eq!(summary.status_message, "You've logged 1 entry today.");
    assert_eq!(summary.most_consistent_trackers.len(), 1);
    assert_eq!(summary.most_consistent_trackers[0].tracker_id, a.id);
}

#[tokio::test]
async fn each_tracker_is_fetched_over_the_lookback_window() {
    let a = tracker("A", Granularity::Daily);
    let b = tracker("B", Granularity::Weekly);
    let aggregator = DashboardAggregator::new(ScriptedStore::default());

    aggregator.summarize_at(&[a.clone(), b.clone()], now()).await;

    let today = now().date_naive();
    let mut calls = aggregator.store().calls.lock().unwrap().clone();
    calls.sort_by_key(|(id, _, _)| *id == b.id);
    assert_eq!(
        calls,
        vec![
            (a.id, today - Duration::days(29), today),
            (b.id, today - Duration::days(29), today),
        ]
    );
}

#[tokio::test]
async fn failed_fetch_degrades_to_empty_entries() {
    let healthy = tracker("healthy", Granularity::Daily);
    let broken = tracker("broken", Granularity::Daily);
    let store = ScriptedStore::default()
        .with_entries(&healthy, &[1, 2])
        .with_entries(&broken, &[0, 0, 0])
        .failing_for(&broken);
    let aggregator = DashboardAggregator::new(store);

    let summary = aggregator
        .summarize_at(&[broken.clone(), healthy.clone()], now())
        .await;

    assert_eq!(summary.total_entries_today, 0);
    assert_eq!(summary.total_entries_this_week, 2);
    assert_eq!(
        summary.most_active_tracker.as_ref().unwrap().tracker_id,
        healthy.id
    );
    assert!(summary.trackers_needing_attention.is_empty());
    assert_eq!(summary.status_message, "You've logged 2 entries this week.");

    let err = aggregator.snapshot_at(&broken, now()).await.unwrap_err();
    assert!(matches!(err, FetchError::FetchFailed { tracker_id, .. } if tracker_id == broken.id));
}

#[tokio::test]
async fn every_fetch_failing_still_returns_a_summary() {
    let a = tracker("A", Granularity::Daily);
    let b = tracker("B", Granularity::Monthly);
    let store = ScriptedStore::default()
        .with_entries(&a, &[0])
        .failing_for(&a)
        .failing_for(&b);
    let aggregator = DashboardAggregator::new(store);

    let summary = aggregator.summarize_at(&[a, b], now()).await;

    assert!(summary.trackers_needing_attention.is_empty());
    assert!(summary.most_active_tracker.is_none());
    assert_eq!(summary.total_entries_this_week, 0);
    assert_eq!(
        summary.status_message,
        "Log your first entry to start seeing insights."
    );
}

#[tokio::test]
async fn stalled_fetch_times_out_without_blocking_others() {
    let quick = tracker("quick", Granularity::Daily);
    let stuck = tracker("stuck", Granularity::Daily);
    let store = ScriptedStore::default()
        .with_entries(&quick, &[0, 1, 2])
        .with_entries(&stuck, &[0])
        .stalled_for(&stuck);
    let config = InsightsConfig {
        fetch_timeout_ms: 50,
        ..InsightsConfig::default()
    };
    let aggregator = DashboardAggregator::with_config(store, config).unwrap();

    let summary = aggregator
        .summarize_at(&[stuck.clone(), quick.clone()], now())
        .await;

    assert_eq!(summary.total_entries_today, 1);
    assert_eq!(summary.total_entries_this_week, 3);

    let err = aggregator.snapshot_at(&stuck, now()).await.unwrap_err();
    assert!(matches!(err, FetchError::TimedOut { .. }));
}

#[tokio::test]
async fn attention_list_is_capped_and_sorted_by_idle_days() {
    let trackers: Vec<Tracker> = ["t4", "t12", "t5", "t20", "t3"]
        .iter()
        .map(|name| tracker(name, Granularity::Daily))
        .collect();
    let store = ScriptedStore::default()
        .with_entries(&trackers[0], &[4])
        .with_entries(&trackers[1], &[12])
        .with_entries(&trackers[2], &[5])
        .with_entries(&trackers[3], &[20])
        .with_entries(&trackers[4], &[3]);
    let aggregator = DashboardAggregator::new(store);

    let summary = aggregator.summarize_at(&trackers, now()).await;

    let names: Vec<&str> = summary
        .trackers_needing_attention
        .iter()
        .map(|item| item.tracker_name.as_str())
        .collect();
    assert_eq!(names, vec!["t20", "t12", "t5"]);
}

#[tokio::test]
async fn summarize_is_deterministic_for_fixed_inputs() {
    let a = tracker("A", Granularity::Daily);
    let b = tracker("B", Granularity::Weekly);
    let c = tracker("C", Granularity::Daily);
    let store = ScriptedStore::default()
        .with_entries(&a, &[0, 1, 1, 3, 5, 6])
        .with_entries(&b, &[2, 9, 16])
        .with_entries(&c, &[25]);
    let aggregator = DashboardAggregator::new(store);
    let trackers = vec![a, b, c];

    let first = aggregator.summarize_at(&trackers, now()).await;
    let second = aggregator.summarize_at(&trackers, now()).await;

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn summary_serializes_with_camel_case_keys() {
    let a = tracker("A", Granularity::Daily);
    let store = ScriptedStore::default().with_entries(&a, &[0, 6]);
    let aggregator = DashboardAggregator::new(store);

    let summary = aggregator.summarize_at(&[a.clone()], now()).await;
    let json = serde_json::to_value(&summary).unwrap();

    assert!(json.get("trackersNeedingAttention").is_some());
    assert!(json.get("mostActiveTracker").is_some());
    assert!(json.get("mostConsistentTrackers").is_some());
    assert_eq!(json["totalEntriesToday"], 1);
    assert_eq!(json["totalEntriesThisWeek"], 2);

    let snapshot = aggregator.snapshot_at(&a, now()).await.unwrap();
    assert_eq!(snapshot.engagement_level, EngagementLevel::Low);
    let snapshot_json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(snapshot_json["entriesLast7Days"], 2);
    assert_eq!(snapshot_json["engagementLevel"], "low");
    assert_eq!(snapshot_json["needsAttention"], false);
}

#[test]
fn with_config_rejects_invalid_settings() {
    let config = InsightsConfig {
        lookback_days: 3,
        ..InsightsConfig::default()
    };
    assert!(DashboardAggregator::with_config(ScriptedStore::default(), config).is_err());

    let config = InsightsConfig {
        lookback_days: 200_000_000,
        ..InsightsConfig::default()
    };
    assert!(matches!(
        DashboardAggregator::with_config(ScriptedStore::default(), config),
        Err(ConfigError::LookbackTooLong {
            lookback_days: 200_000_000,
            ..
        })
    ));
}

#[tokio::test]
async fn window_saturates_at_earliest_representable_date() {
    let a = tracker("A", Granularity::Daily);
    let store = ScriptedStore::default().with_entries(&a, &[0, 1]);
    let aggregator = DashboardAggregator::new(store);
    let earliest = NaiveDate::MIN.and_hms_opt(0, 0, 0).unwrap().and_utc();

    let summary = aggregator.summarize_at(&[a.clone()], earliest).await;

    assert_eq!(summary.total_entries_today, 0);
    assert_eq!(
        summary.status_message,
        "Log your first entry to start seeing insights."
    );
    let calls = aggregator.store().calls.lock().unwrap().clone();
    assert_eq!(calls, vec![(a.id, NaiveDate::MIN, NaiveDate::MIN)]);
}

#[tokio::test]
async fn entries_older_than_lookback_window_are_not_seen() {
    let day_29 = tracker("day 29", Granularity::Daily);
    let day_30 = tracker("day 30", Granularity::Daily);
    let day_31 = tracker("day 31", Granularity::Daily);
    let store = ScriptedStore::default()
        .with_entries(&day_29, &[29])
        .with_entries(&day_30, &[30])
        .with_entries(&day_31, &[31]);
    let aggregator = DashboardAggregator::new(store);
    let trackers = vec![day_29.clone(), day_30.clone(), day_31.clone()];

    let summary = aggregator.summarize_at(&trackers, now()).await;

    assert_eq!(summary.trackers_needing_attention.len(), 1);
    assert_eq!(summary.trackers_needing_attention[0].tracker_id, day_29.id);
    assert_eq!(
        summary.trackers_needing_attention[0].message,
        "Last logged 29 days ago"
    );
    assert_eq!(
        summary.status_message,
        "Log your first entry to start seeing insights."
    );

    let inside = aggregator.snapshot_at(&day_29, now()).await.unwrap();
    assert_eq!(inside.days_since_last_entry, Some(29));
    assert_eq!(inside.entries_last_30_days, 1);
    for outside in [&day_30, &day_31] {
        let snapshot = aggregator.snapshot_at(outside, now()).await.unwrap();
        assert_eq!(snapshot.days_since_last_entry, None);
        assert_eq!(snapshot.total_entries, 0);
        assert!(!snapshot.needs_attention);
    }
}

#[tokio::test]
async fn fetch_failure_exposes_store_error_as_source() {
    let broken = tracker("broken", Granularity::Daily);
    let aggregator = DashboardAggregator::new(ScriptedStore::default().failing_for(&broken));

    let err = aggregator.snapshot_at(&broken, now()).await.unwrap_err();

    assert_eq!(err.tracker_id(), broken.id);
    assert_eq!(err.code(), "entry_fetch_failed");
    let source = err.source().unwrap();
    assert_eq!(source.to_string(), "entry store unavailable: scripted outage");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sqlite_store_feeds_the_aggregator() {
    let conn = open_db_in_memory().unwrap();
    let water = tracker("water", Granularity::Daily);
    let review = tracker("budget review", Granularity::Monthly);
    {
        let trackers = SqliteTrackerRepository::new(&conn);
        trackers.create_tracker(&water).unwrap();
        trackers.create_tracker(&review).unwrap();

        let entries = SqliteEntryRepository::new(&conn);
        for entry in entries_days_ago(&water, &[0, 0, 1, 2, 3, 4, 5, 6, 40]) {
            entries.create_entry(&entry).unwrap();
        }
        for entry in entries_days_ago(&review, &[14]) {
            entries.create_entry(&entry).unwrap();
        }
    }

    let aggregator = DashboardAggregator::new(SqliteEntryStore::new(conn));
    let summary = aggregator
        .summarize_at(&[water.clone(), review.clone()], now())
        .await;

    assert_eq!(summary.total_entries_today, 2);
    assert_eq!(summary.total_entries_this_week, 8);
    assert_eq!(summary.status_message, "You've logged 2 entries today.");

    let active = summary.most_active_tracker.unwrap();
    assert_eq!(active.tracker_id, water.id);
    assert_eq!(active.entries_last_7_days, 8);

    assert_eq!(summary.trackers_needing_attention.len(), 1);
    assert_eq!(summary.trackers_needing_attention[0].tracker_id, review.id);
    assert_eq!(
        summary.trackers_needing_attention[0].message,
        "Last logged 14 days ago"
    );

    assert_eq!(summary.most_consistent_trackers.len(), 1);
    assert_eq!(summary.most_consistent_trackers[0].consistency_score, 1.0);
}
