//! File-backed key/value cache holding the ledger under the
//! `networthData` and `networthGoal` keys.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

use crate::constants::{NETWORTH_DATA_KEY, NETWORTH_GOAL_KEY};
use crate::errors::{Error, Result, StoreError};
use crate::ledger::{CategoryValues, Snapshot, SnapshotStoreTrait};
use crate::session::UserId;

#[derive(Serialize, Deserialize)]
struct GoalEntry {
    #[serde(with = "exact_amount")]
    value: Decimal,
}

/// On-disk snapshot document. Amounts are written as decimal strings so no
/// digits are lost; numeric amounts from browser exports are still accepted.
#[derive(Serialize, Deserialize)]
struct CachedSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    date: DateTime<Utc>,
    #[serde(default, with = "exact_amount")]
    stocks: Decimal,
    #[serde(rename = "mutualFunds", alias = "mutual_funds", default, with = "exact_amount")]
    mutual_funds: Decimal,
    #[serde(default, with = "exact_amount")]
    fd: Decimal,
    #[serde(default, with = "exact_amount")]
    nps: Decimal,
    #[serde(default, with = "exact_amount")]
    savings: Decimal,
    #[serde(default, with = "exact_amount")]
    ppf: Decimal,
    #[serde(default, with = "exact_amount")]
    crypto: Decimal,
    // Written for readers of the raw file; recomputed on load.
    #[serde(default, skip_deserializing, serialize_with = "exact_amount::serialize")]
    networth: Decimal,
}

impl From<&Snapshot> for CachedSnapshot {
    fn from(snapshot: &Snapshot) -> Self {
        let values = snapshot.values();
        Self {
            id: Some(snapshot.id.clone()),
            date: snapshot.timestamp,
            stocks: values.stocks,
            mutual_funds: values.mutual_funds,
            fd: values.fixed_deposit,
            nps: values.retirement_savings,
            savings: values.savings,
            ppf: values.provident_fund,
            crypto: values.crypto,
            networth: snapshot.net_worth(),
        }
    }
}

impl CachedSnapshot {
    fn into_snapshot(self) -> Result<Snapshot> {
        let values = CategoryValues {
            stocks: self.stocks,
            mutual_funds: self.mutual_funds,
            fixed_deposit: self.fd,
            retirement_savings: self.nps,
            savings: self.savings,
            provident_fund: self.ppf,
            crypto: self.crypto,
        };
        let id = self.id.unwrap_or_else(|| Uuid::now_v7().to_string());
        Snapshot::with_id(id, self.date, values).map_err(|e| {
            Error::Store(StoreError::Serialization(format!(
                "Cached snapshot at {}: {}",
                self.date, e
            )))
        })
    }
}

/// Serde helpers that write amounts as exact decimal strings and read either
/// strings or JSON numbers.
mod exact_amount {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Text(String),
        Number(serde_json::Number),
    }

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let raw = match RawAmount::deserialize(deserializer)? {
            RawAmount::Text(text) => text,
            RawAmount::Number(number) => number.to_string(),
        };
        Decimal::from_str(raw.trim())
            .or_else(|_| Decimal::from_scientific(raw.trim()))
            .map_err(|e| de::Error::custom(format!("invalid amount {:?}: {}", raw, e)))
    }
}

/// Stores each user's ledger as JSON documents under `<root>/<user>/<key>.json`.
///
/// Snapshots are kept in the same document shape the browser cache used, so
/// exported `networthData` arrays can be dropped in directly.
#[derive(Debug)]
pub struct LocalCacheStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl LocalCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, user: &UserId, key: &str) -> PathBuf {
        self.root
            .join(encode_path_segment(user.as_str()))
            .join(format!("{}.json", key))
    }

    fn read_key<T: for<'de> Deserialize<'de>>(&self, user: &UserId, key: &str) -> Result<Option<T>> {
        let path = self.key_path(user, key);
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read(&path)?;
        if raw.is_empty() {
            return Ok(None);
        }

        let value = serde_json::from_slice(&raw).map_err(|e| {
            warn!("Corrupt cache entry {}: {}", path.display(), e);
            Error::Store(StoreError::Serialization(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        Ok(Some(value))
    }

    // Writes to a sibling temp file and renames it over the target.
    fn write_key<T: Serialize>(&self, user: &UserId, key: &str, value: &T) -> Result<()> {
        let path = self.key_path(user, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&tmp, &path)?;
        debug!("Wrote cache entry {}", path.display());
        Ok(())
    }

    fn with_lock<T>(&self, op: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Store(StoreError::Internal("Local cache lock poisoned".into())))?;
        op()
    }
}

#[async_trait]
impl SnapshotStoreTrait for LocalCacheStore {
    fn read_all(&self, user: &UserId) -> Result<Vec<Snapshot>> {
        self.with_lock(|| {
            let mut snapshots = self
                .read_key::<Vec<CachedSnapshot>>(user, NETWORTH_DATA_KEY)?
                .unwrap_or_default()
                .into_iter()
                .map(CachedSnapshot::into_snapshot)
                .collect::<Result<Vec<_>>>()?;
            snapshots.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
            Ok(snapshots)
        })
    }

    async fn append(&self, user: &UserId, snapshot: Snapshot) -> Result<Snapshot> {
        self.with_lock(|| {
            let mut documents: Vec<CachedSnapshot> = self
                .read_key(user, NETWORTH_DATA_KEY)?
                .unwrap_or_default();
            documents.push(CachedSnapshot::from(&snapshot));
            self.write_key(user, NETWORTH_DATA_KEY, &documents)
        })?;
        Ok(snapshot)
    }

    fn get_goal(&self, user: &UserId) -> Result<Option<Decimal>> {
        self.with_lock(|| {
            Ok(self
                .read_key::<GoalEntry>(user, NETWORTH_GOAL_KEY)?
                .map(|entry| entry.value))
        })
    }

    async fn set_goal(&self, user: &UserId, goal: Decimal) -> Result<()> {
        self.with_lock(|| self.write_key(user, NETWORTH_GOAL_KEY, &GoalEntry { value: goal }))
    }
}

/// Percent-encodes everything outside `[A-Za-z0-9_-]` so user ids map to a
/// single, collision-free directory name.
fn encode_path_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}
