//! Core business logic for FinWise.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `transaction` - Transaction snapshots and input validation
//! - `budget` - Monthly budget periods, the income/expense category policy,
//!   reconciliation against a [`budget::BudgetStore`] and summary derivation

pub mod budget;
pub mod transaction;
