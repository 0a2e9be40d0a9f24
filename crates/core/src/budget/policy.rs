//! The category policy: how one transaction moves a category's totals.
//!
//! Income does not get a separate column. It *extends the spendable limit*
//! of its category, while expenses accumulate in `spent`. A budget's
//! remaining figure (`limit - spent`) therefore doubles as a cash-flow
//! ledger, and the summary rankings rely on this convention.
//!
//! | kind    | entry absent, apply | entry absent, reverse | entry present        |
//! |---------|---------------------|-----------------------|----------------------|
//! | income  | `limit = amount`    | `limit = 0`           | `limit += ±amount`   |
//! | expense | `spent = amount`    | `spent = 0`           | `spent += ±amount`   |
//!
//! Reversing into an absent entry seeds zeros rather than negatives.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{CategoryEntry, Direction};
use crate::transaction::TransactionKind;

/// A `(limit, spent)` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAmounts {
    /// Limit component.
    pub limit: Decimal,
    /// Spent component.
    pub spent: Decimal,
}

/// The effect of one transaction on one category entry.
///
/// `seed` is written when the entry does not exist yet, `delta` is added
/// when it does. Splitting the two lets a store apply the effect as a single
/// atomic insert-or-increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryEffect {
    /// Initial totals for a new entry.
    pub seed: CategoryAmounts,
    /// Increment for an existing entry.
    pub delta: CategoryAmounts,
}

impl CategoryEffect {
    /// Computes the effect of a transaction of `kind` and `amount`.
    #[must_use]
    pub fn for_transaction(kind: TransactionKind, amount: Decimal, direction: Direction) -> Self {
        let signed = direction.sign() * amount;
        let seeded = if direction.is_apply() {
            amount
        } else {
            Decimal::ZERO
        };

        match kind {
            TransactionKind::Income => Self {
                seed: CategoryAmounts {
                    limit: seeded,
                    spent: Decimal::ZERO,
                },
                delta: CategoryAmounts {
                    limit: signed,
                    spent: Decimal::ZERO,
                },
            },
            TransactionKind::Expense => Self {
                seed: CategoryAmounts {
                    limit: Decimal::ZERO,
                    spent: seeded,
                },
                delta: CategoryAmounts {
                    limit: Decimal::ZERO,
                    spent: signed,
                },
            },
        }
    }

    /// A new entry named `category` holding the seed totals.
    #[must_use]
    pub fn seeded(&self, category: &str) -> CategoryEntry {
        CategoryEntry {
            category: category.to_string(),
            limit: self.seed.limit,
            spent: self.seed.spent,
        }
    }

    /// `entry` with the delta added.
    #[must_use]
    pub fn applied_to(&self, entry: &CategoryEntry) -> CategoryEntry {
        CategoryEntry {
            category: entry.category.clone(),
            limit: entry.limit + self.delta.limit,
            spent: entry.spent + self.delta.spent,
        }
    }
}

/// Applies one transaction to a category entry and returns the result.
///
/// `entry` is `None` when the period has no entry for `category` yet.
#[must_use]
pub fn apply_transaction_effect(
    entry: Option<&CategoryEntry>,
    category: &str,
    kind: TransactionKind,
    amount: Decimal,
    direction: Direction,
) -> CategoryEntry {
    let effect = CategoryEffect::for_transaction(kind, amount, direction);
    match entry {
        Some(existing) => effect.applied_to(existing),
        None => effect.seeded(category),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn entry(limit: Decimal, spent: Decimal) -> CategoryEntry {
        CategoryEntry {
            category: "Food".to_string(),
            limit,
            spent,
        }
    }

    #[rstest]
    #[case(TransactionKind::Income, Direction::Apply, dec!(100), dec!(0))]
    #[case(TransactionKind::Income, Direction::Reverse, dec!(0), dec!(0))]
    #[case(TransactionKind::Expense, Direction::Apply, dec!(0), dec!(100))]
    #[case(TransactionKind::Expense, Direction::Reverse, dec!(0), dec!(0))]
    fn test_seed_for_absent_entry(
        #[case] kind: TransactionKind,
        #[case] direction: Direction,
        #[case] limit: Decimal,
        #[case] spent: Decimal,
    ) {
        let result = apply_transaction_effect(None, "Food", kind, dec!(100), direction);

        assert_eq!(result, entry(limit, spent));
    }

    #[rstest]
    #[case(TransactionKind::Income, Direction::Apply, dec!(350), dec!(120))]
    #[case(TransactionKind::Income, Direction::Reverse, dec!(250), dec!(120))]
    #[case(TransactionKind::Expense, Direction::Apply, dec!(300), dec!(170))]
    #[case(TransactionKind::Expense, Direction::Reverse, dec!(300), dec!(70))]
    fn test_delta_for_present_entry(
        #[case] kind: TransactionKind,
        #[case] direction: Direction,
        #[case] limit: Decimal,
        #[case] spent: Decimal,
    ) {
        let existing = entry(dec!(300), dec!(120));

        let result = apply_transaction_effect(Some(&existing), "Food", kind, dec!(50), direction);

        assert_eq!(result, entry(limit, spent));
    }

    #[test]
    fn test_income_never_touches_spent() {
        let effect = CategoryEffect::for_transaction(
            TransactionKind::Income,
            dec!(75.25),
            Direction::Apply,
        );
        assert_eq!(effect.seed.spent, Decimal::ZERO);
        assert_eq!(effect.delta.spent, Decimal::ZERO);
        assert_eq!(effect.delta.limit, dec!(75.25));
    }

    #[test]
    fn test_reverse_delta_is_negated_apply_delta() {
        let apply =
            CategoryEffect::for_transaction(TransactionKind::Expense, dec!(19.99), Direction::Apply);
        let reverse = CategoryEffect::for_transaction(
            TransactionKind::Expense,
            dec!(19.99),
            Direction::Reverse,
        );
        assert_eq!(reverse.delta.spent, -apply.delta.spent);
        assert_eq!(reverse.delta.limit, -apply.delta.limit);
    }
}
