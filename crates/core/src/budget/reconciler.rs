//! Keeps budget periods in step with transaction writes.

use rust_decimal::Decimal;
use tracing::debug;

use super::error::BudgetError;
use super::policy::CategoryEffect;
use super::store::{BudgetStore, CategoryField};
use super::summary::BudgetSummary;
use super::types::{Direction, PeriodKey};
use crate::transaction::TransactionSnapshot;

/// Applies and reverses transaction effects on a [`BudgetStore`].
///
/// Callers drive it from the transaction lifecycle:
///
/// - create: [`record_created`](Self::record_created)
/// - update: [`record_updated`](Self::record_updated), which reverses the old
///   snapshot and then applies the new one as two separate writes
/// - delete: [`record_deleted`](Self::record_deleted)
///
/// The reconciler trusts its input; validation happens before it is called.
#[derive(Debug, Clone)]
pub struct BudgetReconciler<S> {
    store: S,
}

impl<S: BudgetStore> BudgetReconciler<S> {
    /// Creates a reconciler over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Applies or reverses one transaction's effect on its period.
    ///
    /// # Errors
    ///
    /// Propagates the store's error. Nothing is retried.
    pub async fn apply(
        &self,
        transaction: &TransactionSnapshot,
        direction: Direction,
    ) -> Result<(), S::Error> {
        let key = transaction.period_key();
        let effect =
            CategoryEffect::for_transaction(transaction.kind, transaction.amount, direction);

        debug!(
            period = %key,
            category = %transaction.category,
            kind = %transaction.kind,
            amount = %transaction.amount,
            ?direction,
            "Reconciling budget category"
        );

        self.store
            .apply_category_effect(&key, &transaction.category, effect)
            .await
    }

    /// Applies a newly created transaction.
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub async fn record_created(&self, transaction: &TransactionSnapshot) -> Result<(), S::Error> {
        self.apply(transaction, Direction::Apply).await
    }

    /// Moves a transaction's effect from `old` to `new`.
    ///
    /// The old effect is always reversed in full before the new one is
    /// applied, even when only one field changed or the period moved.
    ///
    /// # Errors
    ///
    /// Propagates the store's error. If the second write fails the first has
    /// already been persisted.
    pub async fn record_updated(
        &self,
        old: &TransactionSnapshot,
        new: &TransactionSnapshot,
    ) -> Result<(), S::Error> {
        self.apply(old, Direction::Reverse).await?;
        self.apply(new, Direction::Apply).await
    }

    /// Reverses a deleted transaction.
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub async fn record_deleted(&self, transaction: &TransactionSnapshot) -> Result<(), S::Error> {
        self.apply(transaction, Direction::Reverse).await
    }

    /// Sets a category's limit directly, outside transaction attribution.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Invalid` for a blank category or negative
    /// value, `ReconcileError::Store` on store failure.
    pub async fn set_limit(
        &self,
        key: &PeriodKey,
        category: &str,
        limit: Decimal,
    ) -> Result<(), ReconcileError<S::Error>> {
        self.set_amount(key, category, CategoryField::Limit, limit)
            .await
    }

    /// Sets a category's spent amount directly, outside transaction
    /// attribution.
    ///
    /// # Errors
    ///
    /// Same as [`set_limit`](Self::set_limit).
    pub async fn set_spent(
        &self,
        key: &PeriodKey,
        category: &str,
        spent: Decimal,
    ) -> Result<(), ReconcileError<S::Error>> {
        self.set_amount(key, category, CategoryField::Spent, spent)
            .await
    }

    async fn set_amount(
        &self,
        key: &PeriodKey,
        category: &str,
        field: CategoryField,
        value: Decimal,
    ) -> Result<(), ReconcileError<S::Error>> {
        if category.trim().is_empty() {
            return Err(ReconcileError::Invalid(BudgetError::BlankCategory));
        }
        if value < Decimal::ZERO {
            return Err(ReconcileError::Invalid(BudgetError::NegativeAmount));
        }

        debug!(period = %key, category, ?field, %value, "Setting budget category amount");

        self.store
            .set_category_amount(key, category, field, value)
            .await
            .map_err(ReconcileError::Store)
    }

    /// Summarizes a period. A missing period summarizes to zeros.
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub async fn summary(&self, key: &PeriodKey) -> Result<BudgetSummary, S::Error> {
        Ok(self
            .store
            .find_period(key)
            .await?
            .map_or_else(BudgetSummary::empty, |period| period.summary()))
    }
}

/// Failure of a manual budget adjustment.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError<E> {
    /// Rejected input.
    #[error(transparent)]
    Invalid(BudgetError),

    /// Store failure.
    #[error("Budget store error: {0}")]
    Store(E),
}
