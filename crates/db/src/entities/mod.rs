//! `SeaORM` entity definitions.

pub mod budget_categories;
pub mod budgets;
pub mod transactions;
