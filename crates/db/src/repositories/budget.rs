//! Budget repository for monthly budget periods.
//!
//! Implements [`BudgetStore`] over Postgres. Each category write is one
//! `INSERT ... ON CONFLICT (budget_id, category) DO UPDATE`, so concurrent
//! reconciliations of the same category add up instead of overwriting each
//! other.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use finwise_core::budget::{
    BudgetPeriod, BudgetStore, CategoryEffect, CategoryEntry, CategoryField, PeriodKey,
};
use finwise_shared::types::{BudgetId, UserId};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{budget_categories, budgets};

/// Error types for budget operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetRepositoryError {
    /// Budget not found.
    #[error("Budget not found: {0}")]
    NotFound(Uuid),

    /// Period month outside `0..=11`.
    #[error("Invalid budget month: {0}")]
    InvalidMonth(i64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Budget repository for period and category persistence.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: Arc<DatabaseConnection>,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists all of a user's periods, newest first, with their categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<BudgetPeriod>, BudgetRepositoryError> {
        let periods = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.into_inner()))
            .order_by_desc(budgets::Column::Year)
            .order_by_desc(budgets::Column::Month)
            .all(self.db.as_ref())
            .await?;

        if periods.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = periods.iter().map(|b| b.id).collect();
        let rows = budget_categories::Entity::find()
            .filter(budget_categories::Column::BudgetId.is_in(ids))
            .order_by_asc(budget_categories::Column::Position)
            .all(self.db.as_ref())
            .await?;

        let mut by_budget: HashMap<Uuid, Vec<budget_categories::Model>> = HashMap::new();
        for row in rows {
            by_budget.entry(row.budget_id).or_default().push(row);
        }

        periods
            .into_iter()
            .map(|budget| {
                let categories = by_budget.remove(&budget.id).unwrap_or_default();
                to_period(budget, categories)
            })
            .collect()
    }

    /// Finds one of a user's periods by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        user_id: UserId,
        budget_id: BudgetId,
    ) -> Result<Option<BudgetPeriod>, BudgetRepositoryError> {
        let budget = budgets::Entity::find_by_id(budget_id.into_inner())
            .filter(budgets::Column::UserId.eq(user_id.into_inner()))
            .one(self.db.as_ref())
            .await?;

        match budget {
            Some(budget) => self.load_categories(budget).await.map(Some),
            None => Ok(None),
        }
    }

    /// Deletes one of a user's periods. Categories go with it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user owns no such budget.
    pub async fn delete_by_id(
        &self,
        user_id: UserId,
        budget_id: BudgetId,
    ) -> Result<(), BudgetRepositoryError> {
        let result = budgets::Entity::delete_many()
            .filter(budgets::Column::Id.eq(budget_id.into_inner()))
            .filter(budgets::Column::UserId.eq(user_id.into_inner()))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(BudgetRepositoryError::NotFound(budget_id.into_inner()));
        }
        Ok(())
    }

    /// Deletes every period a user owns.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_all_for_user<C: ConnectionTrait>(
        db: &C,
        user_id: UserId,
    ) -> Result<u64, DbErr> {
        let result = budgets::Entity::delete_many()
            .filter(budgets::Column::UserId.eq(user_id.into_inner()))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn load_categories(
        &self,
        budget: budgets::Model,
    ) -> Result<BudgetPeriod, BudgetRepositoryError> {
        let categories = budget_categories::Entity::find()
            .filter(budget_categories::Column::BudgetId.eq(budget.id))
            .order_by_asc(budget_categories::Column::Position)
            .all(self.db.as_ref())
            .await?;

        to_period(budget, categories)
    }
}

#[async_trait]
impl BudgetStore for BudgetRepository {
    type Error = BudgetRepositoryError;

    async fn apply_category_effect(
        &self,
        key: &PeriodKey,
        category: &str,
        effect: CategoryEffect,
    ) -> Result<(), Self::Error> {
        let txn = self.db.begin().await?;
        let budget = upsert_period(&txn, key).await?;

        let conflict = OnConflict::columns([
            budget_categories::Column::BudgetId,
            budget_categories::Column::Category,
        ])
        .value(
            budget_categories::Column::LimitAmount,
            Expr::col((
                budget_categories::Entity,
                budget_categories::Column::LimitAmount,
            ))
            .add(effect.delta.limit),
        )
        .value(
            budget_categories::Column::Spent,
            Expr::col((budget_categories::Entity, budget_categories::Column::Spent))
                .add(effect.delta.spent),
        )
        .update_column(budget_categories::Column::UpdatedAt)
        .to_owned();

        budget_categories::Entity::insert(new_category(
            budget.id,
            category,
            effect.seed.limit,
            effect.seed.spent,
        ))
        .on_conflict(conflict)
        .exec_without_returning(&txn)
        .await?;

        txn.commit().await?;
        Ok(())
    }

    async fn set_category_amount(
        &self,
        key: &PeriodKey,
        category: &str,
        field: CategoryField,
        value: Decimal,
    ) -> Result<(), Self::Error> {
        let txn = self.db.begin().await?;
        let budget = upsert_period(&txn, key).await?;

        let (limit, spent, column) = match field {
            CategoryField::Limit => (
                value,
                Decimal::ZERO,
                budget_categories::Column::LimitAmount,
            ),
            CategoryField::Spent => (Decimal::ZERO, value, budget_categories::Column::Spent),
        };

        let conflict = OnConflict::columns([
            budget_categories::Column::BudgetId,
            budget_categories::Column::Category,
        ])
        .update_columns([column, budget_categories::Column::UpdatedAt])
        .to_owned();

        budget_categories::Entity::insert(new_category(budget.id, category, limit, spent))
            .on_conflict(conflict)
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    async fn find_period(&self, key: &PeriodKey) -> Result<Option<BudgetPeriod>, Self::Error> {
        let budget = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(key.user_id.into_inner()))
            .filter(budgets::Column::Month.eq(month_column(key)?))
            .filter(budgets::Column::Year.eq(key.year))
            .one(self.db.as_ref())
            .await?;

        match budget {
            Some(budget) => self.load_categories(budget).await.map(Some),
            None => Ok(None),
        }
    }
}

/// Inserts the period row if absent and returns it either way.
async fn upsert_period<C: ConnectionTrait>(
    db: &C,
    key: &PeriodKey,
) -> Result<budgets::Model, BudgetRepositoryError> {
    let now = Utc::now().into();

    let budget = budgets::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(key.user_id.into_inner()),
        month: Set(month_column(key)?),
        year: Set(key.year),
        created_at: Set(now),
        updated_at: Set(now),
    };

    // DO UPDATE rather than DO NOTHING so RETURNING yields the existing row.
    let conflict = OnConflict::columns([
        budgets::Column::UserId,
        budgets::Column::Month,
        budgets::Column::Year,
    ])
    .update_column(budgets::Column::UpdatedAt)
    .to_owned();

    Ok(budgets::Entity::insert(budget)
        .on_conflict(conflict)
        .exec_with_returning(db)
        .await?)
}

fn new_category(
    budget_id: Uuid,
    category: &str,
    limit: Decimal,
    spent: Decimal,
) -> budget_categories::ActiveModel {
    let now = Utc::now().into();

    budget_categories::ActiveModel {
        id: Set(Uuid::now_v7()),
        budget_id: Set(budget_id),
        category: Set(category.to_string()),
        limit_amount: Set(limit),
        spent: Set(spent),
        position: NotSet,
        created_at: Set(now),
        updated_at: Set(now),
    }
}

fn month_column(key: &PeriodKey) -> Result<i32, BudgetRepositoryError> {
    i32::try_from(key.month).map_err(|_| BudgetRepositoryError::InvalidMonth(key.month.into()))
}

fn to_period(
    budget: budgets::Model,
    categories: Vec<budget_categories::Model>,
) -> Result<BudgetPeriod, BudgetRepositoryError> {
    let month = u32::try_from(budget.month)
        .ok()
        .filter(|m| *m <= 11)
        .ok_or(BudgetRepositoryError::InvalidMonth(budget.month.into()))?;

    Ok(BudgetPeriod {
        id: BudgetId::from_uuid(budget.id),
        user_id: UserId::from_uuid(budget.user_id),
        month,
        year: budget.year,
        categories: categories
            .into_iter()
            .map(|row| CategoryEntry {
                category: row.category,
                limit: row.limit_amount,
                spent: row.spent,
            })
            .collect(),
    })
}
