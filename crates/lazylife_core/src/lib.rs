//! Core domain logic for LazyLife trackers and engagement insights.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod insights;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use insights::config::{ConfigError, InsightsConfig};
pub use insights::dashboard::{onboarding_summary, DashboardAggregator, FetchError};
pub use insights::engagement::compute_engagement;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entry::{Entry, EntryId, EntryValidationError};
pub use model::insights::{
    ActiveTrackerItem, AttentionItem, ConsistentTrackerItem, DashboardSummary, EngagementLevel,
    EngagementSnapshot,
};
pub use model::tracker::{Granularity, Tracker, TrackerId, TrackerValidationError};
pub use repo::entry_repo::{EntryRepository, SqliteEntryRepository};
pub use repo::tracker_repo::{
    RepoError, RepoResult, SqliteTrackerRepository, TrackerListQuery, TrackerRepository,
};
pub use service::tracker_service::{TrackerService, TrackerServiceError};
pub use store::{EntryStore, SqliteEntryStore, StoreError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
