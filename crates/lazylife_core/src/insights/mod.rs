//! Engagement insights over logged tracker entries.
//!
//! # Responsibility
//! - Compute per-tracker engagement snapshots (`engagement`).
//! - Fold snapshots for one owner into a ranked dashboard (`dashboard`).
//!
//! # Invariants
//! - Every computation is a pure function of its inputs plus an explicit
//!   `now`; nothing derived here is persisted.
//! - A failed entry fetch degrades that tracker to zero entries; it never
//!   aborts the dashboard.

pub mod config;
pub mod dashboard;
pub mod engagement;
