//! Transactions as seen by budget reconciliation.
//!
//! A transaction is owned by the transaction store; this module only knows the
//! fields that decide its budget attribution, plus the validation every
//! write goes through before any budget is touched.

use chrono::{Datelike, NaiveDate};
use finwise_shared::types::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::budget::PeriodKey;

/// Whether a transaction brings money in or sends it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money in. Extends the category limit.
    Income,
    /// Money out. Counts toward the category's spent amount.
    Expense,
}

impl TransactionKind {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(TransactionError::InvalidType(other.to_string())),
        }
    }
}

/// Transaction validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// A required field was not supplied.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// `type` was neither income nor expense.
    #[error("invalid transaction type '{0}', expected income or expense")]
    InvalidType(String),

    /// Amount was zero or negative.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// Category was empty or whitespace.
    #[error("category must not be blank")]
    BlankCategory,
}

/// The validated, user-editable fields of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFields {
    /// Income or expense.
    pub kind: TransactionKind,
    /// Positive amount.
    pub amount: Decimal,
    /// Category name, matched exactly against budget entries.
    pub category: String,
    /// Calendar date; its month and year pick the budget period.
    pub date: NaiveDate,
    /// Free-form note.
    pub description: Option<String>,
}

impl TransactionFields {
    /// Builds the snapshot the reconciler consumes.
    #[must_use]
    pub fn snapshot(&self, user_id: UserId) -> TransactionSnapshot {
        TransactionSnapshot {
            user_id,
            amount: self.amount,
            category: self.category.clone(),
            kind: self.kind,
            date: self.date,
        }
    }
}

/// Raw transaction input as received from a client. Every field is optional
/// so that missing fields can be reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionDraft {
    /// `income` or `expense`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Amount.
    pub amount: Option<Decimal>,
    /// Category.
    pub category: Option<String>,
    /// Date (YYYY-MM-DD). Defaults to today.
    pub date: Option<NaiveDate>,
    /// Description.
    pub description: Option<String>,
}

impl TransactionDraft {
    /// Validates a new transaction. `today` fills in a missing date.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule, checked in the order type, amount,
    /// category.
    pub fn validate(self, today: NaiveDate) -> Result<TransactionFields, TransactionError> {
        let kind = self
            .kind
            .as_deref()
            .ok_or(TransactionError::MissingField("type"))?
            .parse::<TransactionKind>()?;
        let amount = validate_amount(self.amount.ok_or(TransactionError::MissingField("amount"))?)?;
        let category = validate_category(
            self.category
                .ok_or(TransactionError::MissingField("category"))?,
        )?;

        Ok(TransactionFields {
            kind,
            amount,
            category,
            date: self.date.unwrap_or(today),
            description: self.description,
        })
    }

    /// Merges this draft over an existing transaction. Absent fields keep
    /// their current value; present fields are validated as for a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if any supplied field is invalid.
    pub fn merge_into(
        self,
        current: &TransactionFields,
    ) -> Result<TransactionFields, TransactionError> {
        let kind = match self.kind.as_deref() {
            Some(raw) => raw.parse()?,
            None => current.kind,
        };
        let amount = match self.amount {
            Some(amount) => validate_amount(amount)?,
            None => current.amount,
        };
        let category = match self.category {
            Some(category) => validate_category(category)?,
            None => current.category.clone(),
        };

        Ok(TransactionFields {
            kind,
            amount,
            category,
            date: self.date.unwrap_or(current.date),
            description: self.description.or_else(|| current.description.clone()),
        })
    }
}

fn validate_amount(amount: Decimal) -> Result<Decimal, TransactionError> {
    if amount <= Decimal::ZERO {
        return Err(TransactionError::NonPositiveAmount);
    }
    Ok(amount)
}

fn validate_category(category: String) -> Result<String, TransactionError> {
    if category.trim().is_empty() {
        return Err(TransactionError::BlankCategory);
    }
    Ok(category)
}

/// The fields of a transaction that determine its effect on a budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSnapshot {
    /// Owner.
    pub user_id: UserId,
    /// Positive amount.
    pub amount: Decimal,
    /// Category name.
    pub category: String,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Transaction date.
    pub date: NaiveDate,
}

impl TransactionSnapshot {
    /// The budget period this transaction is attributed to.
    #[must_use]
    pub fn period_key(&self) -> PeriodKey {
        PeriodKey {
            user_id: self.user_id,
            month: self.date.month0(),
            year: self.date.year(),
        }
    }
}
