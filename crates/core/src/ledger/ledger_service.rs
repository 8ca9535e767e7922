//! User-scoped ledger service backed by a snapshot store.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info};
use rust_decimal::Decimal;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;

use super::ledger_model::{
    BreakdownItem, EntryMode, GoalProgress, LedgerState, LedgerSummary, NetWorthPoint, Snapshot,
};
use super::ledger_traits::{LedgerServiceTrait, SnapshotStoreTrait};
use super::ledger_validation::{validate_goal_input, SnapshotForm};
use super::portfolio_ledger::Ledger;
use crate::errors::{Error, Result};
use crate::session::UserId;

/// Ledger service for one user.
///
/// The in-memory ledger only changes after the store confirms a write, so a
/// failed write leaves it in its last known-good state.
pub struct LedgerService {
    user_id: UserId,
    store: Arc<dyn SnapshotStoreTrait>,
    ledger: RwLock<Ledger>,
    write_gate: Mutex<()>,
}

impl LedgerService {
    /// Creates a service with an empty ledger. Call `load` to read the store.
    pub fn new(user_id: UserId, store: Arc<dyn SnapshotStoreTrait>) -> Self {
        Self {
            user_id,
            store,
            ledger: RwLock::new(Ledger::new()),
            write_gate: Mutex::new(()),
        }
    }

    /// Creates a service and loads the user's ledger.
    pub fn open(user_id: UserId, store: Arc<dyn SnapshotStoreTrait>) -> Result<Self> {
        let service = Self::new(user_id, store);
        service.load()?;
        Ok(service)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Ledger>> {
        self.ledger
            .read()
            .map_err(|_| Error::Unexpected("Ledger lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Ledger>> {
        self.ledger
            .write()
            .map_err(|_| Error::Unexpected("Ledger lock poisoned".to_string()))
    }
}

#[async_trait]
impl LedgerServiceTrait for LedgerService {
    fn user_id(&self) -> &UserId {
        &self.user_id
    }

    fn load(&self) -> Result<()> {
        let snapshots = self.store.read_all(&self.user_id)?;
        let goal = self.store.get_goal(&self.user_id)?;
        debug!(
            "Loaded {} snapshot(s) for user {} (goal: {:?})",
            snapshots.len(),
            self.user_id,
            goal
        );
        *self.write()? = Ledger::from_snapshots(snapshots, goal);
        Ok(())
    }

    async fn commit_snapshot(&self, form: &SnapshotForm, mode: EntryMode) -> Result<Snapshot> {
        let _gate = self.write_gate.lock().await;

        let candidate = self.read()?.prepare_snapshot(form, mode, Utc::now())?;

        let stored = self
            .store
            .append(&self.user_id, candidate)
            .await
            .map_err(|e| {
                error!("Failed to persist snapshot for user {}: {}", self.user_id, e);
                e
            })?;

        self.write()?.append(stored.clone());
        info!(
            "Committed snapshot {} for user {} ({:?}, net worth {})",
            stored.id,
            self.user_id,
            mode,
            stored.net_worth()
        );
        Ok(stored)
    }

    async fn set_goal(&self, raw: &str) -> Result<Decimal> {
        let goal = validate_goal_input(raw)?;
        let _gate = self.write_gate.lock().await;

        self.store
            .set_goal(&self.user_id, goal)
            .await
            .map_err(|e| {
                error!("Failed to persist goal for user {}: {}", self.user_id, e);
                e
            })?;

        self.write()?.set_goal(goal);
        info!("Goal for user {} set to {}", self.user_id, goal);
        Ok(goal)
    }

    fn state(&self) -> Result<LedgerState> {
        Ok(self.read()?.state())
    }

    fn snapshots(&self) -> Result<Vec<Snapshot>> {
        Ok(self.read()?.snapshots().to_vec())
    }

    fn latest_snapshot(&self) -> Result<Option<Snapshot>> {
        Ok(self.read()?.latest_snapshot().cloned())
    }

    fn category_breakdown(&self) -> Result<Vec<BreakdownItem>> {
        Ok(self.read()?.category_breakdown())
    }

    fn net_worth_series(&self) -> Result<Vec<NetWorthPoint>> {
        Ok(self.read()?.net_worth_series())
    }

    fn goal(&self) -> Result<Option<Decimal>> {
        Ok(self.read()?.goal())
    }

    fn goal_progress(&self) -> Result<GoalProgress> {
        let ledger = self.read()?;
        Ok(ledger
            .goal()
            .map(|goal| ledger.goal_progress(goal))
            .unwrap_or_default())
    }

    fn latest_change(&self) -> Result<Option<Decimal>> {
        Ok(self.read()?.latest_change())
    }

    fn summary(&self) -> Result<LedgerSummary> {
        Ok(self.read()?.summary())
    }
}
