//! Derived engagement projections.
//!
//! These records are recomputed on every aggregation call and never
//! persisted. They serialize in camelCase to match the dashboard payload
//! consumed by the web client.

use crate::model::tracker::{Granularity, TrackerId};
use serde::{Deserialize, Serialize};

/// Coarse bucket summarizing recent logging volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    High,
    Medium,
    Low,
    None,
}

/// Per-tracker engagement metrics at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementSnapshot {
    pub tracker_id: TrackerId,
    pub tracker_name: String,
    pub granularity: Granularity,
    /// `None` when the tracker has no entries in the inspected set.
    pub days_since_last_entry: Option<i64>,
    pub entries_last_7_days: u32,
    pub entries_last_30_days: u32,
    /// Size of the inspected entry set, duplicates included.
    pub total_entries: u32,
    /// Always within `[0, 1]`.
    pub consistency_score: f64,
    pub needs_attention: bool,
    pub engagement_level: EngagementLevel,
}

/// One tracker surfaced in the attention list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionItem {
    pub tracker_id: TrackerId,
    pub tracker_name: String,
    pub days_since_last_entry: Option<i64>,
    pub message: String,
}

/// The tracker with the most entries in the trailing week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTrackerItem {
    pub tracker_id: TrackerId,
    pub tracker_name: String,
    pub entries_last_7_days: u32,
    pub message: String,
}

/// One tracker surfaced in the consistency list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistentTrackerItem {
    pub tracker_id: TrackerId,
    pub tracker_name: String,
    pub consistency_score: f64,
    pub message: String,
}

/// Owner-level insights folded from every tracker's snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub trackers_needing_attention: Vec<AttentionItem>,
    pub most_active_tracker: Option<ActiveTrackerItem>,
    pub most_consistent_trackers: Vec<ConsistentTrackerItem>,
    pub total_entries_today: u32,
    pub total_entries_this_week: u32,
    pub status_message: String,
}
