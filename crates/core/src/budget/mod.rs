//! Monthly budget periods and their reconciliation against transactions.
//!
//! Every `(user, month, year)` has at most one [`BudgetPeriod`] holding one
//! [`CategoryEntry`] per category name. The [`BudgetReconciler`] keeps those
//! entries equal to the net effect of the user's transactions for the month,
//! using the category policy in [`policy`].

pub mod error;
pub mod policy;
pub mod reconciler;
pub mod store;
pub mod summary;
pub mod types;


pub use error::BudgetError;
pub use policy::{CategoryAmounts, CategoryEffect, apply_transaction_effect};
pub use reconciler::{BudgetReconciler, ReconcileError};
pub use store::{BudgetStore, CategoryField, MemoryBudgetStore};
pub use summary::{BudgetSummary, Utilization};
pub use types::{BudgetPeriod, CategoryEntry, Direction, PeriodKey};
