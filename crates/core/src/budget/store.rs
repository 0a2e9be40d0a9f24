//! Budget persistence seam.

use std::collections::HashMap;
use std::convert::Infallible;

use async_trait::async_trait;
use finwise_shared::types::BudgetId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::policy::CategoryEffect;
use super::types::{BudgetPeriod, PeriodKey};

/// Which column of a category entry a manual adjustment overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryField {
    /// The spendable limit.
    Limit,
    /// The spent amount.
    Spent,
}

/// Storage for budget periods keyed by `(user, month, year)`.
///
/// Both write operations must create the period and the category entry when
/// they are absent, and must be atomic per category: two concurrent writes to
/// the same category may not lose either update.
#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// Store failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Seeds or increments one category entry.
    async fn apply_category_effect(
        &self,
        key: &PeriodKey,
        category: &str,
        effect: CategoryEffect,
    ) -> Result<(), Self::Error>;

    /// Overwrites one field of a category entry.
    async fn set_category_amount(
        &self,
        key: &PeriodKey,
        category: &str,
        field: CategoryField,
        value: Decimal,
    ) -> Result<(), Self::Error>;

    /// Loads a period with its categories in first-touch order.
    async fn find_period(&self, key: &PeriodKey) -> Result<Option<BudgetPeriod>, Self::Error>;
}

/// Process-local [`BudgetStore`]. Each operation holds one lock for its whole
/// read-modify-write.
#[derive(Debug, Default)]
pub struct MemoryBudgetStore {
    periods: Mutex<HashMap<PeriodKey, BudgetPeriod>>,
}

impl MemoryBudgetStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of periods held.
    pub async fn len(&self) -> usize {
        self.periods.lock().await.len()
    }

    /// Returns true if no period exists.
    pub async fn is_empty(&self) -> bool {
        self.periods.lock().await.is_empty()
    }
}

#[async_trait]
impl BudgetStore for MemoryBudgetStore {
    type Error = Infallible;

    async fn apply_category_effect(
        &self,
        key: &PeriodKey,
        category: &str,
        effect: CategoryEffect,
    ) -> Result<(), Self::Error> {
        let mut periods = self.periods.lock().await;
        periods
            .entry(*key)
            .or_insert_with(|| BudgetPeriod::new(BudgetId::new(), *key))
            .apply_effect(category, &effect);
        Ok(())
    }

    async fn set_category_amount(
        &self,
        key: &PeriodKey,
        category: &str,
        field: CategoryField,
        value: Decimal,
    ) -> Result<(), Self::Error> {
        let mut periods = self.periods.lock().await;
        periods
            .entry(*key)
            .or_insert_with(|| BudgetPeriod::new(BudgetId::new(), *key))
            .set_amount(category, field, value);
        Ok(())
    }

    async fn find_period(&self, key: &PeriodKey) -> Result<Option<BudgetPeriod>, Self::Error> {
        Ok(self.periods.lock().await.get(key).cloned())
    }
}
