//! SQLite storage for the net worth ledger.
//!
//! This crate is the only place where Diesel dependencies exist. It
//! implements [`networth_core::SnapshotStoreTrait`] on top of:
//! - an r2d2 connection pool for reads
//! - a single writer actor that runs each write in an immediate transaction
//! - embedded Diesel migrations
//!
//! ```text
//! networth-core (domain, traits)
//!         │
//!         ▼
//! networth-storage-sqlite (this crate)
//!         │
//!         ▼
//!     SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod snapshots;

pub use db::{
    create_pool, get_connection, init, open, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};
pub use errors::{IntoCore, StorageError};
pub use snapshots::SnapshotRepository;

pub use networth_core::errors::{Error, Result, StoreError};
