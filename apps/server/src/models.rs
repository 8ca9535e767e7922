use std::collections::BTreeMap;

use networth_core::EntryMode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of `POST /ledger/snapshots`. Values are the raw strings typed by
/// the user, keyed by category; validation happens server side.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSnapshotRequest {
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    #[serde(default)]
    pub mode: EntryMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoalRequest {
    pub goal: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalResponse {
    pub goal: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeResponse {
    pub change_percent: Option<Decimal>,
}
