//! Ledger domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

/// Investment or savings bucket tracked by the ledger.
///
/// The set is closed. Declaration order is the canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Stocks,
    MutualFunds,
    FixedDeposit,
    RetirementSavings,
    Savings,
    ProvidentFund,
    Crypto,
}

impl AssetCategory {
    /// All categories in display order.
    pub const ALL: [AssetCategory; 7] = [
        AssetCategory::Stocks,
        AssetCategory::MutualFunds,
        AssetCategory::FixedDeposit,
        AssetCategory::RetirementSavings,
        AssetCategory::Savings,
        AssetCategory::ProvidentFund,
        AssetCategory::Crypto,
    ];

    /// Storage key.
    pub fn key(self) -> &'static str {
        match self {
            AssetCategory::Stocks => "stocks",
            AssetCategory::MutualFunds => "mutual_funds",
            AssetCategory::FixedDeposit => "fixed_deposit",
            AssetCategory::RetirementSavings => "retirement_savings",
            AssetCategory::Savings => "savings",
            AssetCategory::ProvidentFund => "provident_fund",
            AssetCategory::Crypto => "crypto",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            AssetCategory::Stocks => "Stocks",
            AssetCategory::MutualFunds => "Mutual Funds",
            AssetCategory::FixedDeposit => "Fixed Deposits",
            AssetCategory::RetirementSavings => "Retirement Savings",
            AssetCategory::Savings => "Savings",
            AssetCategory::ProvidentFund => "Provident Fund",
            AssetCategory::Crypto => "Crypto",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AssetCategory {
    type Err = ValidationError;

    /// Accepts storage keys as well as the short keys of older documents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stocks" => Ok(AssetCategory::Stocks),
            "mutual_funds" | "mutualFunds" => Ok(AssetCategory::MutualFunds),
            "fixed_deposit" | "fd" => Ok(AssetCategory::FixedDeposit),
            "retirement_savings" | "nps" => Ok(AssetCategory::RetirementSavings),
            "savings" => Ok(AssetCategory::Savings),
            "provident_fund" | "ppf" => Ok(AssetCategory::ProvidentFund),
            "crypto" => Ok(AssetCategory::Crypto),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown asset category '{}'",
                other
            ))),
        }
    }
}

/// One value per asset category.
///
/// Serialized in the document shape used by earlier releases
/// (`mutualFunds`, `fd`, `nps`, `ppf`), with the storage keys accepted as
/// aliases. Missing fields read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryValues {
    pub stocks: Decimal,
    #[serde(rename = "mutualFunds", alias = "mutual_funds")]
    pub mutual_funds: Decimal,
    #[serde(rename = "fd", alias = "fixed_deposit")]
    pub fixed_deposit: Decimal,
    #[serde(rename = "nps", alias = "retirement_savings")]
    pub retirement_savings: Decimal,
    pub savings: Decimal,
    #[serde(rename = "ppf", alias = "provident_fund")]
    pub provident_fund: Decimal,
    pub crypto: Decimal,
}

impl CategoryValues {
    pub fn get(&self, category: AssetCategory) -> Decimal {
        match category {
            AssetCategory::Stocks => self.stocks,
            AssetCategory::MutualFunds => self.mutual_funds,
            AssetCategory::FixedDeposit => self.fixed_deposit,
            AssetCategory::RetirementSavings => self.retirement_savings,
            AssetCategory::Savings => self.savings,
            AssetCategory::ProvidentFund => self.provident_fund,
            AssetCategory::Crypto => self.crypto,
        }
    }

    pub fn set(&mut self, category: AssetCategory, value: Decimal) {
        let slot = match category {
            AssetCategory::Stocks => &mut self.stocks,
            AssetCategory::MutualFunds => &mut self.mutual_funds,
            AssetCategory::FixedDeposit => &mut self.fixed_deposit,
            AssetCategory::RetirementSavings => &mut self.retirement_savings,
            AssetCategory::Savings => &mut self.savings,
            AssetCategory::ProvidentFund => &mut self.provident_fund,
            AssetCategory::Crypto => &mut self.crypto,
        };
        *slot = value;
    }

    /// Builder-style setter.
    pub fn with(mut self, category: AssetCategory, value: Decimal) -> Self {
        self.set(category, value);
        self
    }

    /// Sum across all categories. This is the only place net worth is computed.
    ///
    /// Fails with `AmountTooLarge` instead of clamping when the sum overflows.
    pub fn total(&self) -> Result<Decimal, ValidationError> {
        AssetCategory::ALL.iter().try_fold(Decimal::ZERO, |acc, c| {
            acc.checked_add(self.get(*c))
                .ok_or(ValidationError::AmountTooLarge)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetCategory, Decimal)> + '_ {
        AssetCategory::ALL.iter().map(move |c| (*c, self.get(*c)))
    }
}

/// How a submitted form is combined with the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    /// Supplied values replace the previous ones; omitted values carry forward.
    #[default]
    Absolute,
    /// Supplied values are added to the previous ones; omitted values carry forward.
    Incremental,
}

/// One dated entry in the ledger.
///
/// `net_worth` is derived from `values` at construction and cannot be set
/// independently. Deserialization recomputes it and ignores any stored total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord", into = "SnapshotRecord")]
pub struct Snapshot {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    values: CategoryValues,
    net_worth: Decimal,
}

impl Snapshot {
    /// Creates a snapshot with a fresh time-ordered id.
    pub fn new(timestamp: DateTime<Utc>, values: CategoryValues) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::now_v7().to_string(), timestamp, values)
    }

    pub fn with_id(
        id: String,
        timestamp: DateTime<Utc>,
        values: CategoryValues,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            timestamp,
            values,
            net_worth: values.total()?,
        })
    }

    pub fn values(&self) -> &CategoryValues {
        &self.values
    }

    pub fn net_worth(&self) -> Decimal {
        self.net_worth
    }

    pub fn value(&self, category: AssetCategory) -> Decimal {
        self.values.get(category)
    }
}

/// Wire/document shape of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "date")]
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    values: CategoryValues,
    #[serde(rename = "networth", default)]
    net_worth: Option<Decimal>,
}

impl TryFrom<SnapshotRecord> for Snapshot {
    type Error = ValidationError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        let id = record.id.unwrap_or_else(|| Uuid::now_v7().to_string());
        Snapshot::with_id(id, record.timestamp, record.values)
    }
}

impl From<Snapshot> for SnapshotRecord {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            id: Some(snapshot.id),
            timestamp: snapshot.timestamp,
            values: snapshot.values,
            net_worth: Some(snapshot.net_worth),
        }
    }
}

/// The two states the presentation tier branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerState {
    /// No snapshots yet (onboarding).
    Empty,
    /// At least one snapshot (dashboard).
    Populated,
}

/// One slice of the latest snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownItem {
    pub category: AssetCategory,
    pub label: String,
    pub value: Decimal,
}

/// A single point of the net worth time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthPoint {
    pub timestamp: DateTime<Utc>,
    pub net_worth: Decimal,
}

/// Progress of the latest net worth towards the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    /// Percentage in `[0, 100]`
    pub percent: Decimal,
    /// Amount still missing, never negative
    pub remaining: Decimal,
}

/// Every derived view in one payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub state: LedgerState,
    pub latest: Option<Snapshot>,
    pub breakdown: Vec<BreakdownItem>,
    pub series: Vec<NetWorthPoint>,
    pub goal: Option<Decimal>,
    pub goal_progress: GoalProgress,
    pub change_percent: Option<Decimal>,
}
