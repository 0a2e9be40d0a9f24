//! Budget error types.

use thiserror::Error;

/// Budget input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    /// Month outside `0..=11`.
    #[error("Invalid month {0}, expected 0-11")]
    InvalidMonth(u32),

    /// Category name was empty or whitespace.
    #[error("Category must not be blank")]
    BlankCategory,

    /// Manually set amount was negative.
    #[error("Amount cannot be negative")]
    NegativeAmount,
}
