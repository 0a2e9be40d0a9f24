//! Budget summary: totals plus the most overspent and healthiest category.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::CategoryEntry;

/// `spent / limit * 100` for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utilization {
    /// Ordinary percentage.
    Finite(Decimal),
    /// Positive spending against a zero limit.
    Unbounded,
}

impl Utilization {
    /// Utilization of `entry`, or `None` when it is undefined (zero limit
    /// and nothing spent).
    ///
    /// A positive ratio too large for `Decimal` counts as `Unbounded`. A
    /// negative one that overflows is treated as undefined.
    #[must_use]
    pub fn of(entry: &CategoryEntry) -> Option<Self> {
        if entry.limit.is_zero() {
            return (entry.spent > Decimal::ZERO).then_some(Self::Unbounded);
        }
        let percent = entry
            .spent
            .checked_div(entry.limit)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));

        match percent {
            Some(percent) => Some(Self::Finite(percent)),
            None => (entry.spent.is_sign_positive() == entry.limit.is_sign_positive())
                .then_some(Self::Unbounded),
        }
    }

    /// How far past 100% this is, if it is past 100% at all.
    #[must_use]
    pub fn overspend(self) -> Option<Self> {
        match self {
            Self::Finite(percent) if percent > Decimal::ONE_HUNDRED => {
                Some(Self::Finite(percent - Decimal::ONE_HUNDRED))
            }
            Self::Finite(_) => None,
            Self::Unbounded => Some(Self::Unbounded),
        }
    }

    /// Strict greater-than, with `Unbounded` above every finite value and
    /// not above itself.
    #[must_use]
    pub fn exceeds(self, other: Self) -> bool {
        match (self, other) {
            (Self::Finite(a), Self::Finite(b)) => a > b,
            (Self::Unbounded, Self::Finite(_)) => true,
            (_, Self::Unbounded) => false,
        }
    }
}

/// Summary of one budget period.
///
/// Serialized with snake_case keys and money as decimal strings
/// (`"total_spent": "250.00"`), like every other amount in the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSummary {
    /// Sum of all limits.
    pub total_budgeted: Decimal,
    /// Sum of all spent amounts.
    pub total_spent: Decimal,
    /// `total_budgeted - total_spent`.
    pub remaining: Decimal,
    /// Category furthest over 100% utilization.
    pub most_overspent_category: Option<String>,
    /// Category with the lowest finite utilization.
    pub healthiest_category: Option<String>,
}

impl BudgetSummary {
    /// Summary of a period that does not exist: zeros and no categories.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derives the summary from a period's categories.
    ///
    /// Ties in either ranking keep the category encountered first.
    #[must_use]
    pub fn from_categories(categories: &[CategoryEntry]) -> Self {
        let total_budgeted: Decimal = categories.iter().map(|c| c.limit).sum();
        let total_spent: Decimal = categories.iter().map(|c| c.spent).sum();

        let mut most_overspent: Option<(&str, Utilization)> = None;
        let mut healthiest: Option<(&str, Decimal)> = None;

        for entry in categories {
            let Some(utilization) = Utilization::of(entry) else {
                continue;
            };

            if let Some(over) = utilization.overspend() {
                if most_overspent.is_none_or(|(_, max)| over.exceeds(max)) {
                    most_overspent = Some((&entry.category, over));
                }
            }

            if let Utilization::Finite(percent) = utilization {
                if healthiest.is_none_or(|(_, min)| percent < min) {
                    healthiest = Some((&entry.category, percent));
                }
            }
        }

        Self {
            total_budgeted,
            total_spent,
            remaining: total_budgeted - total_spent,
            most_overspent_category: most_overspent.map(|(name, _)| name.to_string()),
            healthiest_category: healthiest.map(|(name, _)| name.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(category: &str, limit: Decimal, spent: Decimal) -> CategoryEntry {
        CategoryEntry {
            category: category.to_string(),
            limit,
            spent,
        }
    }

    #[test]
    fn test_summary_example() {
        let summary = BudgetSummary::from_categories(&[
            entry("Food", dec!(300), dec!(100)),
            entry("Transport", dec!(100), dec!(150)),
        ]);

        assert_eq!(summary.total_budgeted, dec!(400));
        assert_eq!(summary.total_spent, dec!(250));
        assert_eq!(summary.remaining, dec!(150));
        assert_eq!(summary.most_overspent_category.as_deref(), Some("Transport"));
        assert_eq!(summary.healthiest_category.as_deref(), Some("Food"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = BudgetSummary::from_categories(&[]);
        assert_eq!(summary, BudgetSummary::empty());
        assert_eq!(summary.remaining, Decimal::ZERO);
        assert!(summary.most_overspent_category.is_none());
        assert!(summary.healthiest_category.is_none());
    }

    #[test]
    fn test_no_overspent_category_at_exactly_full() {
        let summary = BudgetSummary::from_categories(&[entry("Rent", dec!(1000), dec!(1000))]);
        assert!(summary.most_overspent_category.is_none());
        assert_eq!(summary.healthiest_category.as_deref(), Some("Rent"));
    }

    #[test]
    fn test_overspent_tie_keeps_first() {
        let summary = BudgetSummary::from_categories(&[
            entry("Games", dec!(50), dec!(75)),
            entry("Books", dec!(100), dec!(150)),
        ]);
        assert_eq!(summary.most_overspent_category.as_deref(), Some("Games"));
    }

    #[test]
    fn test_healthiest_tie_keeps_first() {
        let summary = BudgetSummary::from_categories(&[
            entry("Gym", dec!(40), dec!(10)),
            entry("Phone", dec!(80), dec!(20)),
        ]);
        assert_eq!(summary.healthiest_category.as_deref(), Some("Gym"));
    }

    #[test]
    fn test_zero_limit_with_spending_is_most_overspent() {
        let summary = BudgetSummary::from_categories(&[
            entry("Transport", dec!(100), dec!(900)),
            entry("Coffee", dec!(0), dec!(12)),
            entry("Snacks", dec!(0), dec!(30)),
        ]);
        assert_eq!(summary.most_overspent_category.as_deref(), Some("Coffee"));
        assert_eq!(summary.healthiest_category.as_deref(), Some("Transport"));
    }

    #[test]
    fn test_zero_limit_without_spending_is_ignored() {
        let summary = BudgetSummary::from_categories(&[
            entry("Unused", dec!(0), dec!(0)),
            entry("Food", dec!(200), dec!(50)),
        ]);
        assert!(summary.most_overspent_category.is_none());
        assert_eq!(summary.healthiest_category.as_deref(), Some("Food"));
    }

    #[test]
    fn test_income_only_category_is_healthiest() {
        let summary = BudgetSummary::from_categories(&[
            entry("Salary", dec!(1000), dec!(0)),
            entry("Food", dec!(300), dec!(100)),
        ]);
        assert_eq!(summary.healthiest_category.as_deref(), Some("Salary"));
        assert_eq!(summary.remaining, dec!(1200));
    }

    #[test]
    fn test_overflowing_utilization_is_most_overspent() {
        let tiny = dec!(0.0000000000000000000000000001);
        let summary = BudgetSummary::from_categories(&[
            entry("Transport", dec!(100), dec!(900)),
            entry("Tiny", tiny, dec!(1000)),
        ]);

        assert_eq!(
            Utilization::of(&entry("Tiny", tiny, dec!(1000))),
            Some(Utilization::Unbounded)
        );
        assert_eq!(summary.most_overspent_category.as_deref(), Some("Tiny"));
        assert_eq!(summary.healthiest_category.as_deref(), Some("Transport"));
    }

    #[test]
    fn test_negative_overflow_is_undefined() {
        let tiny = dec!(-0.0000000000000000000000000001);
        assert_eq!(Utilization::of(&entry("Refunds", tiny, dec!(1000))), None);
    }

    #[test]
    fn test_summary_serializes_money_as_strings() {
        let summary = BudgetSummary::from_categories(&[entry("Food", dec!(300), dec!(100.50))]);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["total_budgeted"], "300");
        assert_eq!(json["total_spent"], "100.50");
        assert_eq!(json["remaining"], "199.50");
        assert_eq!(json["healthiest_category"], "Food");
    }

    #[test]
    fn test_utilization_values() {
        assert_eq!(
            Utilization::of(&entry("a", dec!(200), dec!(50))),
            Some(Utilization::Finite(dec!(25)))
        );
        assert_eq!(
            Utilization::of(&entry("b", dec!(0), dec!(1))),
            Some(Utilization::Unbounded)
        );
        assert_eq!(Utilization::of(&entry("c", dec!(0), dec!(0))), None);
        assert!(Utilization::Unbounded.exceeds(Utilization::Finite(dec!(1000000))));
        assert!(!Utilization::Unbounded.exceeds(Utilization::Unbounded));
    }
}
