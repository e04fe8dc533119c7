//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for trackers and entries.
//! - Isolate SQLite query details from service/insights orchestration.
//!
//! # Invariants
//! - Repository writes validate domain records before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `InvalidRange`) in
//!   addition to DB transport errors.

pub mod entry_repo;
pub mod tracker_repo;
