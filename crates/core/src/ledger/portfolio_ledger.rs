//! In-memory portfolio ledger: append-only snapshots and derived views.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;

use super::ledger_model::{
    AssetCategory, BreakdownItem, EntryMode, GoalProgress, LedgerState,
    LedgerSummary, NetWorthPoint, Snapshot,
};
use super::ledger_validation::SnapshotForm;
use crate::constants::DECIMAL_PRECISION;
use crate::errors::{Result, ValidationError};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Ordered, append-only collection of snapshots for one user, plus the goal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    snapshots: Vec<Snapshot>,
    goal: Option<Decimal>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from a store read. Snapshots are sorted by
    /// timestamp; equal timestamps keep the store's order.
    pub fn from_snapshots(mut snapshots: Vec<Snapshot>, goal: Option<Decimal>) -> Self {
        snapshots.sort_by_key(|s| s.timestamp);
        Self { snapshots, goal }
    }

    pub fn state(&self) -> LedgerState {
        if self.snapshots.is_empty() {
            LedgerState::Empty
        } else {
            LedgerState::Populated
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn goal(&self) -> Option<Decimal> {
        self.goal
    }

    /// Overwrites the goal. Callers validate first.
    pub fn set_goal(&mut self, goal: Decimal) {
        self.goal = Some(goal);
    }

    pub fn latest_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn previous_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.iter().rev().nth(1)
    }

    /// Computes the snapshot a commit would append, without appending it.
    ///
    /// Fails with `ValidationFailed` if any form field carries an error, and
    /// with `AmountTooLarge` when a running value or the total overflows.
    pub fn prepare_snapshot(
        &self,
        form: &SnapshotForm,
        mode: EntryMode,
        timestamp: DateTime<Utc>,
    ) -> Result<Snapshot> {
        let amounts = form.amounts()?;
        let mut values = self
            .latest_snapshot()
            .map(|s| *s.values())
            .unwrap_or_default();

        let mut overflowed = BTreeMap::new();
        for (category, amount) in amounts {
            let next = match mode {
                EntryMode::Absolute => Some(amount),
                EntryMode::Incremental => values.get(category).checked_add(amount),
            };
            match next {
                Some(next) => values.set(category, next),
                None => {
                    overflowed.insert(category, ValidationError::AmountTooLarge);
                }
            }
        }
        if !overflowed.is_empty() {
            return Err(ValidationError::ValidationFailed { fields: overflowed }.into());
        }

        Ok(Snapshot::new(self.next_timestamp(timestamp), values)?)
    }

    /// Appends a snapshot produced by `prepare_snapshot`.
    pub fn append(&mut self, snapshot: Snapshot) {
        debug!(
            "Appending snapshot {} (net worth {})",
            snapshot.id,
            snapshot.net_worth()
        );
        self.snapshots.push(snapshot);
    }

    /// Validates the form, derives the next snapshot and appends it.
    ///
    /// All-or-nothing: on error the ledger is unchanged.
    pub fn commit_snapshot(&mut self, form: &SnapshotForm, mode: EntryMode) -> Result<Snapshot> {
        let snapshot = self.prepare_snapshot(form, mode, Utc::now())?;
        self.append(snapshot.clone());
        Ok(snapshot)
    }

    /// One entry per category of the latest snapshot, in display order.
    /// Empty when there is no data yet.
    pub fn category_breakdown(&self) -> Vec<BreakdownItem> {
        let Some(latest) = self.latest_snapshot() else {
            return Vec::new();
        };

        AssetCategory::ALL
            .iter()
            .map(|category| BreakdownItem {
                category: *category,
                label: category.label().to_string(),
                value: latest.value(*category),
            })
            .collect()
    }

    /// One point per snapshot, in ledger order.
    pub fn net_worth_series(&self) -> Vec<NetWorthPoint> {
        self.snapshots
            .iter()
            .map(|s| NetWorthPoint {
                timestamp: s.timestamp,
                net_worth: s.net_worth(),
            })
            .collect()
    }

    /// Progress of the latest net worth towards `goal`.
    pub fn goal_progress(&self, goal: Decimal) -> GoalProgress {
        let latest = self
            .latest_snapshot()
            .map(Snapshot::net_worth)
            .unwrap_or(Decimal::ZERO);
        goal_progress(latest, goal)
    }

    /// Percent change between the two most recent snapshots.
    pub fn latest_change(&self) -> Option<Decimal> {
        let latest = self.latest_snapshot()?;
        percent_change(
            latest.net_worth(),
            self.previous_snapshot().map(Snapshot::net_worth),
        )
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            state: self.state(),
            latest: self.latest_snapshot().cloned(),
            breakdown: self.category_breakdown(),
            series: self.net_worth_series(),
            goal: self.goal,
            goal_progress: self.goal.map(|g| self.goal_progress(g)).unwrap_or_default(),
            change_percent: self.latest_change(),
        }
    }

    // Keeps the ledger strictly chronological even if the clock steps back.
    fn next_timestamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.latest_snapshot() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        }
    }
}

/// `percent = clamp(net_worth / goal * 100, 0, 100)`,
/// `remaining = max(goal - net_worth, 0)`. A goal `<= 0` means "not set".
pub fn goal_progress(net_worth: Decimal, goal: Decimal) -> GoalProgress {
    if goal <= Decimal::ZERO {
        return GoalProgress::default();
    }

    let percent = net_worth
        .checked_div(goal)
        .and_then(|ratio| ratio.checked_mul(ONE_HUNDRED))
        .unwrap_or(ONE_HUNDRED)
        .clamp(Decimal::ZERO, ONE_HUNDRED)
        .round_dp(DECIMAL_PRECISION);
    let remaining = (goal - net_worth).max(Decimal::ZERO);

    GoalProgress { percent, remaining }
}

/// `(current - previous) / previous * 100`, or `None` when there is nothing
/// to compare against or `previous` is zero.
pub fn percent_change(current: Decimal, previous: Option<Decimal>) -> Option<Decimal> {
    let previous = previous?;
    if previous.is_zero() {
        return None;
    }

    let change = current
        .checked_sub(previous)?
        .checked_div(previous)?
        .checked_mul(ONE_HUNDRED)?;
    Some(change.round_dp(DECIMAL_PRECISION))
}
