//! Domain model for trackers, logged entries and derived insights.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep persisted records (`Tracker`, `Entry`) separate from derived,
//!   never-persisted projections (`EngagementSnapshot`, `DashboardSummary`).
//!
//! # Invariants
//! - Every tracker and entry is identified by a stable UUID.
//! - A tracker's creation date is never later than any entry date logged
//!   against it.

pub mod entry;
pub mod insights;
pub mod tracker;
