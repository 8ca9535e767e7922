//! In-memory snapshot store.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::errors::{Error, Result, StoreError};
use crate::ledger::{Snapshot, SnapshotStoreTrait};
use crate::session::UserId;

#[derive(Debug, Default)]
struct UserData {
    snapshots: Vec<Snapshot>,
    goal: Option<Decimal>,
}

/// Keeps every user's ledger in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    users: RwLock<HashMap<UserId, UserData>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> Error {
        Error::Store(StoreError::Internal("In-memory store lock poisoned".into()))
    }
}

#[async_trait]
impl SnapshotStoreTrait for InMemorySnapshotStore {
    fn read_all(&self, user: &UserId) -> Result<Vec<Snapshot>> {
        let users = self.users.read().map_err(|_| Self::poisoned())?;
        let mut snapshots = users
            .get(user)
            .map(|data| data.snapshots.clone())
            .unwrap_or_default();
        snapshots.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(snapshots)
    }

    async fn append(&self, user: &UserId, snapshot: Snapshot) -> Result<Snapshot> {
        let mut users = self.users.write().map_err(|_| Self::poisoned())?;
        let data = users.entry(user.clone()).or_default();
        if data.snapshots.iter().any(|s| s.id == snapshot.id) {
            return Err(Error::Store(StoreError::UniqueViolation(format!(
                "Snapshot {} already exists",
                snapshot.id
            ))));
        }
        data.snapshots.push(snapshot.clone());
        Ok(snapshot)
    }

    fn get_goal(&self, user: &UserId) -> Result<Option<Decimal>> {
        let users = self.users.read().map_err(|_| Self::poisoned())?;
        Ok(users.get(user).and_then(|data| data.goal))
    }

    async fn set_goal(&self, user: &UserId, goal: Decimal) -> Result<()> {
        let mut users = self.users.write().map_err(|_| Self::poisoned())?;
        users.entry(user.clone()).or_default().goal = Some(goal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AssetCategory, CategoryValues};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn users_are_isolated() {
        let store = InMemorySnapshotStore::new();
        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();

        let values = CategoryValues::default().with(AssetCategory::Stocks, dec!(10));
        store
            .append(&alice, Snapshot::new(Utc::now(), values).unwrap())
            .await
            .unwrap();
        store.set_goal(&alice, dec!(100)).await.unwrap();

        assert_eq!(store.read_all(&alice).unwrap().len(), 1);
        assert!(store.read_all(&bob).unwrap().is_empty());
        assert_eq!(store.get_goal(&alice).unwrap(), Some(dec!(100)));
        assert_eq!(store.get_goal(&bob).unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let store = InMemorySnapshotStore::new();
        let user = UserId::new("alice").unwrap();
        let snapshot = Snapshot::new(Utc::now(), CategoryValues::default()).unwrap();

        store.append(&user, snapshot.clone()).await.unwrap();
        let err = store.append(&user, snapshot).await.unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::UniqueViolation(_))));
    }
}
