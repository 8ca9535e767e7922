use async_trait::async_trait;
use rust_decimal::Decimal;

use super::ledger_model::{
    BreakdownItem, EntryMode, GoalProgress, LedgerState, LedgerSummary, NetWorthPoint, Snapshot,
};
use super::ledger_validation::SnapshotForm;
use crate::errors::Result;
use crate::session::UserId;

/// Persistence capability behind a ledger.
///
/// Implementations: `InMemorySnapshotStore`, `LocalCacheStore` (file-backed
/// key/value cache) and the SQLite `SnapshotRepository`. A deployment picks
/// exactly one.
#[async_trait]
pub trait SnapshotStoreTrait: Send + Sync {
    /// All snapshots of `user`, ordered by timestamp ascending.
    fn read_all(&self, user: &UserId) -> Result<Vec<Snapshot>>;

    /// Appends a snapshot. Snapshots are never updated afterwards.
    async fn append(&self, user: &UserId, snapshot: Snapshot) -> Result<Snapshot>;

    fn get_goal(&self, user: &UserId) -> Result<Option<Decimal>>;

    /// Overwrites the goal.
    async fn set_goal(&self, user: &UserId, goal: Decimal) -> Result<()>;
}

/// Ledger operations for one signed-in user.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    fn user_id(&self) -> &UserId;

    /// Replaces the in-memory ledger with the store's contents.
    fn load(&self) -> Result<()>;

    /// Persists a new snapshot, then appends it in memory.
    ///
    /// The form is borrowed so it survives a failed commit.
    async fn commit_snapshot(&self, form: &SnapshotForm, mode: EntryMode) -> Result<Snapshot>;

    /// Validates, persists, then overwrites the goal.
    async fn set_goal(&self, raw: &str) -> Result<Decimal>;

    fn state(&self) -> Result<LedgerState>;
    fn snapshots(&self) -> Result<Vec<Snapshot>>;
    fn latest_snapshot(&self) -> Result<Option<Snapshot>>;
    fn category_breakdown(&self) -> Result<Vec<BreakdownItem>>;
    fn net_worth_series(&self) -> Result<Vec<NetWorthPoint>>;
    fn goal(&self) -> Result<Option<Decimal>>;

    /// Progress towards the stored goal; zero when no goal is set.
    fn goal_progress(&self) -> Result<GoalProgress>;

    /// Percent change between the two latest snapshots.
    fn latest_change(&self) -> Result<Option<Decimal>>;

    fn summary(&self) -> Result<LedgerSummary>;
}
