//! Snapshot store implementations that need no database.

mod local_cache;
mod memory;

pub use local_cache::LocalCacheStore;
pub use memory::InMemorySnapshotStore;
