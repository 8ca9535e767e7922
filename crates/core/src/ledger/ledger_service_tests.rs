//! Unit tests for the ledger service.

use super::*;
use crate::errors::{Error, Result, StoreError, ValidationError};
use crate::session::UserId;
use crate::stores::InMemorySnapshotStore;
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// Mock Implementations
// ============================================================================

/// Wraps the in-memory store and fails writes while `failing` is set.
struct FlakyStore {
    inner: InMemorySnapshotStore,
    failing: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: InMemorySnapshotStore::new(),
            failing: AtomicBool::new(false),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Store(StoreError::ConnectionFailed(
                "store offline".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotStoreTrait for FlakyStore {
    fn read_all(&self, user: &UserId) -> Result<Vec<Snapshot>> {
        self.inner.read_all(user)
    }

    async fn append(&self, user: &UserId, snapshot: Snapshot) -> Result<Snapshot> {
        self.check()?;
        self.inner.append(user, snapshot).await
    }

    fn get_goal(&self, user: &UserId) -> Result<Option<Decimal>> {
        self.inner.get_goal(user)
    }

    async fn set_goal(&self, user: &UserId, goal: Decimal) -> Result<()> {
        self.check()?;
        self.inner.set_goal(user, goal).await
    }
}

fn user() -> UserId {
    UserId::new("user-1").unwrap()
}

fn form(entries: &[(AssetCategory, &str)]) -> SnapshotForm {
    let mut form = SnapshotForm::new();
    for (category, raw) in entries {
        let _ = form.set_field(*category, raw);
    }
    form
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn commit_persists_then_updates_views() {
    let store = Arc::new(FlakyStore::new());
    let service = LedgerService::open(user(), store.clone()).unwrap();
    assert_eq!(service.state().unwrap(), LedgerState::Empty);

    let snapshot = service
        .commit_snapshot(
            &form(&[
                (AssetCategory::Stocks, "1000"),
                (AssetCategory::Savings, "500"),
            ]),
            EntryMode::Absolute,
        )
        .await
        .unwrap();

    assert_eq!(snapshot.net_worth(), dec!(1500));
    assert_eq!(service.state().unwrap(), LedgerState::Populated);
    assert_eq!(service.latest_snapshot().unwrap(), Some(snapshot.clone()));
    assert_eq!(store.read_all(&user()).unwrap(), vec![snapshot]);
}

#[tokio::test]
async fn store_failure_leaves_ledger_untouched_and_form_reusable() {
    let store = Arc::new(FlakyStore::new());
    let service = LedgerService::open(user(), store.clone()).unwrap();
    service
        .commit_snapshot(&form(&[(AssetCategory::Stocks, "1000")]), EntryMode::Absolute)
        .await
        .unwrap();

    let retry = form(&[(AssetCategory::Stocks, "1200")]);
    store.set_failing(true);
    let err = service
        .commit_snapshot(&retry, EntryMode::Absolute)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::ConnectionFailed(_))));
    assert_eq!(service.snapshots().unwrap().len(), 1);
    assert_eq!(service.net_worth_series().unwrap().len(), 1);

    // The same form succeeds once the store is back.
    store.set_failing(false);
    let snapshot = service
        .commit_snapshot(&retry, EntryMode::Absolute)
        .await
        .unwrap();
    assert_eq!(snapshot.net_worth(), dec!(1200));
    assert_eq!(service.snapshots().unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_form_never_reaches_the_store() {
    let store = Arc::new(FlakyStore::new());
    let service = LedgerService::open(user(), store.clone()).unwrap();

    let err = service
        .commit_snapshot(&form(&[(AssetCategory::Crypto, "-1")]), EntryMode::Absolute)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::ValidationFailed { .. })
    ));
    assert!(store.read_all(&user()).unwrap().is_empty());
    assert_eq!(service.state().unwrap(), LedgerState::Empty);
}

#[tokio::test]
async fn goal_is_validated_persisted_and_overwritten() {
    let store = Arc::new(FlakyStore::new());
    let service = LedgerService::open(user(), store.clone()).unwrap();
    service
        .commit_snapshot(&form(&[(AssetCategory::Savings, "1200")]), EntryMode::Absolute)
        .await
        .unwrap();

    assert_eq!(service.goal_progress().unwrap(), GoalProgress::default());
    assert!(matches!(
        service.set_goal("0").await,
        Err(Error::Validation(ValidationError::NonPositiveGoal))
    ));

    service.set_goal("1000").await.unwrap();
    assert_eq!(service.set_goal("2000").await.unwrap(), dec!(2000));
    assert_eq!(service.goal().unwrap(), Some(dec!(2000)));
    assert_eq!(store.get_goal(&user()).unwrap(), Some(dec!(2000)));
    assert_eq!(
        service.goal_progress().unwrap(),
        GoalProgress {
            percent: dec!(60),
            remaining: dec!(800)
        }
    );

    store.set_failing(true);
    assert!(service.set_goal("5000").await.is_err());
    assert_eq!(service.goal().unwrap(), Some(dec!(2000)));
}

#[tokio::test]
async fn load_restores_previous_session() {
    let store = Arc::new(FlakyStore::new());
    {
        let service = LedgerService::open(user(), store.clone()).unwrap();
        service
            .commit_snapshot(&form(&[(AssetCategory::Stocks, "1000")]), EntryMode::Absolute)
            .await
            .unwrap();
        service
            .commit_snapshot(&form(&[(AssetCategory::Stocks, "200")]), EntryMode::Incremental)
            .await
            .unwrap();
        service.set_goal("2400").await.unwrap();
    }

    let service = LedgerService::open(user(), store).unwrap();
    let summary = service.summary().unwrap();
    assert_eq!(summary.state, LedgerState::Populated);
    assert_eq!(summary.series.len(), 2);
    assert_eq!(summary.latest.unwrap().net_worth(), dec!(1200));
    assert_eq!(summary.change_percent, Some(dec!(20)));
    assert_eq!(summary.goal_progress.percent, dec!(50));
    assert_eq!(service.latest_change().unwrap(), Some(dec!(20)));
    assert_eq!(service.category_breakdown().unwrap().len(), 7);
}
