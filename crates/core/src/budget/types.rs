//! Budget data types.

use chrono::{Datelike, NaiveDate, Utc};
use finwise_shared::types::{BudgetId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::BudgetError;
use super::policy::CategoryEffect;
use super::store::CategoryField;
use super::summary::BudgetSummary;

/// Whether a transaction's effect is being added or taken back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Add the transaction's effect.
    Apply,
    /// Undo a previously applied effect.
    Reverse,
}

impl Direction {
    /// `+1` for apply, `-1` for reverse.
    #[must_use]
    pub const fn sign(self) -> Decimal {
        match self {
            Self::Apply => Decimal::ONE,
            Self::Reverse => Decimal::NEGATIVE_ONE,
        }
    }

    /// Returns true for [`Direction::Apply`].
    #[must_use]
    pub const fn is_apply(self) -> bool {
        matches!(self, Self::Apply)
    }
}

/// Identity of a budget period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    /// Owner.
    pub user_id: UserId,
    /// Month, zero-based (January = 0).
    pub month: u32,
    /// Calendar year.
    pub year: i32,
}

impl PeriodKey {
    /// Creates a key, checking the month range.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::InvalidMonth` if `month > 11`.
    pub const fn new(user_id: UserId, month: u32, year: i32) -> Result<Self, BudgetError> {
        if month > 11 {
            return Err(BudgetError::InvalidMonth(month));
        }
        Ok(Self {
            user_id,
            month,
            year,
        })
    }

    /// The period containing `date`.
    #[must_use]
    pub fn for_date(user_id: UserId, date: NaiveDate) -> Self {
        Self {
            user_id,
            month: date.month0(),
            year: date.year(),
        }
    }

    /// The period containing the current UTC date.
    #[must_use]
    pub fn current(user_id: UserId) -> Self {
        Self::for_date(user_id, Utc::now().date_naive())
    }
}

impl std::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{:04}-{:02}", self.user_id, self.year, self.month + 1)
    }
}

/// One category's running totals within a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    /// Category name, unique within the period.
    pub category: String,
    /// Spendable limit. Raised by income.
    pub limit: Decimal,
    /// Amount spent. Raised by expenses.
    pub spent: Decimal,
}

impl CategoryEntry {
    /// Creates an entry with both totals at zero.
    #[must_use]
    pub fn empty(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            limit: Decimal::ZERO,
            spent: Decimal::ZERO,
        }
    }
}

/// A user's category limits and spending for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPeriod {
    /// Budget ID.
    pub id: BudgetId,
    /// Owner.
    #[serde(rename = "user")]
    pub user_id: UserId,
    /// Month, zero-based.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// Category entries in first-touch order.
    pub categories: Vec<CategoryEntry>,
}

impl BudgetPeriod {
    /// Creates an empty period.
    #[must_use]
    pub fn new(id: BudgetId, key: PeriodKey) -> Self {
        Self {
            id,
            user_id: key.user_id,
            month: key.month,
            year: key.year,
            categories: Vec::new(),
        }
    }

    /// This period's identity.
    #[must_use]
    pub const fn key(&self) -> PeriodKey {
        PeriodKey {
            user_id: self.user_id,
            month: self.month,
            year: self.year,
        }
    }

    /// Looks up a category by exact name.
    #[must_use]
    pub fn entry(&self, category: &str) -> Option<&CategoryEntry> {
        self.categories.iter().find(|e| e.category == category)
    }

    /// Applies a category effect: seeds a new entry if the category is
    /// absent, otherwise adds the delta to the existing entry.
    pub fn apply_effect(&mut self, category: &str, effect: &CategoryEffect) {
        match self.categories.iter_mut().find(|e| e.category == category) {
            Some(entry) => *entry = effect.applied_to(entry),
            None => self.categories.push(effect.seeded(category)),
        }
    }

    /// Overwrites one field of a category, creating the entry at zero first
    /// if it is absent.
    pub fn set_amount(&mut self, category: &str, field: CategoryField, value: Decimal) {
        let index = match self.categories.iter().position(|e| e.category == category) {
            Some(index) => index,
            None => {
                self.categories.push(CategoryEntry::empty(category));
                self.categories.len() - 1
            }
        };
        let entry = &mut self.categories[index];
        match field {
            CategoryField::Limit => entry.limit = value,
            CategoryField::Spent => entry.spent = value,
        }
    }

    /// Derives totals and category rankings.
    #[must_use]
    pub fn summary(&self) -> BudgetSummary {
        BudgetSummary::from_categories(&self.categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_period_key_rejects_month_twelve() {
        let user = UserId::new();
        assert!(PeriodKey::new(user, 11, 2024).is_ok());
        assert_eq!(
            PeriodKey::new(user, 12, 2024).unwrap_err(),
            BudgetError::InvalidMonth(12)
        );
    }

    #[test]
    fn test_period_key_display_is_one_based() {
        let user = UserId::new();
        let key = PeriodKey::for_date(user, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(key.month, 0);
        assert_eq!(key.to_string(), format!("{user}/2024-01"));
    }

    #[test]
    fn test_set_amount_creates_then_overwrites() {
        let key = PeriodKey::current(UserId::new());
        let mut period = BudgetPeriod::new(BudgetId::new(), key);

        period.set_amount("Rent", CategoryField::Limit, dec!(1200));
        period.set_amount("Rent", CategoryField::Spent, dec!(1150));
        period.set_amount("Rent", CategoryField::Limit, dec!(1250));

        assert_eq!(period.categories.len(), 1);
        let rent = period.entry("Rent").unwrap();
        assert_eq!(rent.limit, dec!(1250));
        assert_eq!(rent.spent, dec!(1150));
    }

    #[test]
    fn test_serializes_user_field_name() {
        let key = PeriodKey::new(UserId::new(), 4, 2024).unwrap();
        let period = BudgetPeriod::new(BudgetId::new(), key);
        let json = serde_json::to_value(&period).unwrap();

        assert_eq!(json["user"], serde_json::json!(key.user_id));
        assert_eq!(json["month"], 4);
        assert_eq!(json["categories"], serde_json::json!([]));
    }
}
