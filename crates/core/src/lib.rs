//! Net worth core - domain entities, services, and traits.
//!
//! This crate holds the ledger logic: asset category snapshots, input
//! validation, net worth aggregation, goal progress and the time series.
//! It is storage-agnostic and defines the `SnapshotStoreTrait` implemented
//! here (in-memory, local cache) and by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod ledger;
pub mod session;
pub mod stores;

// Re-export the ledger surface
pub use ledger::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
