//! Portfolio ledger module - models, validation, derived views, service and traits.
//!
//! The ledger is an ordered, append-only list of asset category snapshots for
//! one user plus a single goal value. Net worth, category breakdown, the time
//! series, goal progress and period-over-period change are all derived here.

mod ledger_model;
mod ledger_service;
mod ledger_traits;
mod ledger_validation;
mod portfolio_ledger;

pub use ledger_model::*;
pub use ledger_service::LedgerService;
pub use ledger_traits::{LedgerServiceTrait, SnapshotStoreTrait};
pub use ledger_validation::{
    validate_category_input, validate_goal_input, SnapshotForm, ValidatedAmount,
};
pub use portfolio_ledger::{goal_progress, percent_change, Ledger};


#[cfg(test)]
mod ledger_service_tests;
