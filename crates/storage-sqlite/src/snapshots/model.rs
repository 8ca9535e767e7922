//! Database models for snapshots and per-user settings.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::StorageError;
use networth_core::errors::{Error, Result};
use networth_core::session::UserId;
use networth_core::{CategoryValues, Snapshot};

/// One snapshot row. Amounts are stored as decimal text; net worth is
/// derived on read and never stored.
#[derive(Queryable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SnapshotDB {
    pub id: String,
    pub user_id: String,
    pub created_at: String,
    pub stocks: String,
    pub mutual_funds: String,
    pub fixed_deposit: String,
    pub retirement_savings: String,
    pub savings: String,
    pub provident_fund: String,
    pub crypto: String,
}

/// Key/value row scoped to one user.
#[derive(Queryable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::user_settings)]
pub struct UserSettingDB {
    pub user_id: String,
    pub setting_key: String,
    pub setting_value: String,
}

impl SnapshotDB {
    pub fn from_domain(user: &UserId, snapshot: &Snapshot) -> Self {
        let values = snapshot.values();
        Self {
            id: snapshot.id.clone(),
            user_id: user.as_str().to_string(),
            // Fixed-width UTC text with full nanoseconds so that ordering by
            // the column is chronological and reads return the exact instant.
            created_at: snapshot
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Nanos, true),
            stocks: values.stocks.to_string(),
            mutual_funds: values.mutual_funds.to_string(),
            fixed_deposit: values.fixed_deposit.to_string(),
            retirement_savings: values.retirement_savings.to_string(),
            savings: values.savings.to_string(),
            provident_fund: values.provident_fund.to_string(),
            crypto: values.crypto.to_string(),
        }
    }
}

impl TryFrom<SnapshotDB> for Snapshot {
    type Error = Error;

    fn try_from(row: SnapshotDB) -> Result<Self> {
        let timestamp = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| {
                StorageError::SerializationError(format!(
                    "Snapshot {} has an invalid timestamp '{}': {}",
                    row.id, row.created_at, e
                ))
            })?
            .with_timezone(&Utc);

        let values = CategoryValues {
            stocks: parse_amount(&row.id, &row.stocks)?,
            mutual_funds: parse_amount(&row.id, &row.mutual_funds)?,
            fixed_deposit: parse_amount(&row.id, &row.fixed_deposit)?,
            retirement_savings: parse_amount(&row.id, &row.retirement_savings)?,
            savings: parse_amount(&row.id, &row.savings)?,
            provident_fund: parse_amount(&row.id, &row.provident_fund)?,
            crypto: parse_amount(&row.id, &row.crypto)?,
        };

        let id = row.id.clone();
        Snapshot::with_id(row.id, timestamp, values).map_err(|e| {
            StorageError::SerializationError(format!("Snapshot {} cannot be totalled: {}", id, e))
                .into()
        })
    }
}

pub(crate) fn parse_amount(owner: &str, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| {
        StorageError::SerializationError(format!(
            "Invalid amount '{}' stored for {}: {}",
            raw, owner, e
        ))
        .into()
    })
}
