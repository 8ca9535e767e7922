use async_trait::async_trait;
use diesel::prelude::*;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::model::{parse_amount, SnapshotDB, UserSettingDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{snapshots, user_settings};
use networth_core::constants::GOAL_SETTING_KEY;
use networth_core::errors::Result;
use networth_core::session::UserId;
use networth_core::{Snapshot, SnapshotStoreTrait};

/// SQLite-backed snapshot store. Reads use the pool; writes go through the
/// single writer actor.
pub struct SnapshotRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SnapshotRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SnapshotRepository { pool, writer }
    }
}

#[async_trait]
impl SnapshotStoreTrait for SnapshotRepository {
    fn read_all(&self, user: &UserId) -> Result<Vec<Snapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = snapshots::table
            .filter(snapshots::user_id.eq(user.as_str()))
            .order((snapshots::created_at.asc(), snapshots::id.asc()))
            .select(SnapshotDB::as_select())
            .load::<SnapshotDB>(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter().map(Snapshot::try_from).collect()
    }

    async fn append(&self, user: &UserId, snapshot: Snapshot) -> Result<Snapshot> {
        let row = SnapshotDB::from_domain(user, &snapshot);
        self.writer
            .exec(move |conn| {
                diesel::insert_into(snapshots::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await?;

        debug!("Stored snapshot {} for user {}", snapshot.id, user);
        Ok(snapshot)
    }

    fn get_goal(&self, user: &UserId) -> Result<Option<Decimal>> {
        let mut conn = get_connection(&self.pool)?;
        let stored = user_settings::table
            .filter(user_settings::user_id.eq(user.as_str()))
            .filter(user_settings::setting_key.eq(GOAL_SETTING_KEY))
            .select(user_settings::setting_value)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        stored
            .map(|value| parse_amount(GOAL_SETTING_KEY, &value))
            .transpose()
    }

    async fn set_goal(&self, user: &UserId, goal: Decimal) -> Result<()> {
        let setting = UserSettingDB {
            user_id: user.as_str().to_string(),
            setting_key: GOAL_SETTING_KEY.to_string(),
            setting_value: goal.to_string(),
        };
        self.writer
            .exec(move |conn| {
                diesel::replace_into(user_settings::table)
                    .values(&setting)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
