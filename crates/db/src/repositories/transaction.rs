//! Transaction repository for income and expense records.
//!
//! Persistence only. Budget reconciliation runs after each write, driven by
//! the caller through `BudgetReconciler`.

use std::sync::Arc;

use chrono::Utc;
use finwise_core::transaction::{TransactionFields, TransactionKind, TransactionSnapshot};
use finwise_shared::types::{PageRequest, TransactionId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::warn;
use uuid::Uuid;

use crate::entities::transactions;

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// Stored type column holds something other than income or expense.
    #[error("Invalid stored transaction {id}: {source}")]
    InvalidRow {
        /// Transaction ID.
        id: Uuid,
        /// Parse failure.
        source: finwise_core::transaction::TransactionError,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Transaction repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: Arc<DatabaseConnection>,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Inserts a validated transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        fields: &TransactionFields,
    ) -> Result<transactions::Model, TransactionError> {
        let now = Utc::now().into();

        let model = transactions::ActiveModel {
            id: Set(TransactionId::new().into_inner()),
            user_id: Set(user_id.into_inner()),
            transaction_type: Set(fields.kind.as_str().to_string()),
            amount: Set(fields.amount),
            category: Set(fields.category.clone()),
            transaction_date: Set(fields.date),
            description: Set(fields.description.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(self.db.as_ref()).await?)
    }

    /// Finds one of a user's transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        user_id: UserId,
        id: TransactionId,
    ) -> Result<Option<transactions::Model>, TransactionError> {
        Ok(transactions::Entity::find_by_id(id.into_inner())
            .filter(transactions::Column::UserId.eq(user_id.into_inner()))
            .one(self.db.as_ref())
            .await?)
    }

    /// Lists a user's transactions, newest date first, with the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> Result<(Vec<transactions::Model>, u64), TransactionError> {
        let query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id.into_inner()));

        let total = query.clone().count(self.db.as_ref()).await?;
        let rows = query
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await?;

        Ok((rows, total))
    }

    /// Overwrites a transaction's fields and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user owns no such transaction.
    pub async fn update(
        &self,
        user_id: UserId,
        id: TransactionId,
        fields: &TransactionFields,
    ) -> Result<transactions::Model, TransactionError> {
        let existing = self
            .find_by_id(user_id, id)
            .await?
            .ok_or(TransactionError::NotFound(id.into_inner()))?;

        let mut model: transactions::ActiveModel = existing.into();
        model.transaction_type = Set(fields.kind.as_str().to_string());
        model.amount = Set(fields.amount);
        model.category = Set(fields.category.clone());
        model.transaction_date = Set(fields.date);
        model.description = Set(fields.description.clone());
        model.updated_at = Set(Utc::now().into());

        Ok(model.update(self.db.as_ref()).await?)
    }

    /// Deletes a transaction and returns the row as it was.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user owns no such transaction.
    pub async fn delete(
        &self,
        user_id: UserId,
        id: TransactionId,
    ) -> Result<transactions::Model, TransactionError> {
        let existing = self
            .find_by_id(user_id, id)
            .await?
            .ok_or(TransactionError::NotFound(id.into_inner()))?;

        let result = transactions::Entity::delete_many()
            .filter(transactions::Column::Id.eq(existing.id))
            .filter(transactions::Column::UserId.eq(user_id.into_inner()))
            .exec(self.db.as_ref())
            .await?;

        // A concurrent delete got there first; its caller reverses the effect.
        if result.rows_affected == 0 {
            warn!(transaction_id = %existing.id, "Transaction removed by a concurrent delete");
            return Err(TransactionError::NotFound(id.into_inner()));
        }
        Ok(existing)
    }

    /// Deletes every transaction a user owns.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_all_for_user<C: ConnectionTrait>(
        db: &C,
        user_id: UserId,
    ) -> Result<u64, DbErr> {
        let result = transactions::Entity::delete_many()
            .filter(transactions::Column::UserId.eq(user_id.into_inner()))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }
}

/// Reads the editable fields back out of a stored row.
///
/// # Errors
///
/// Returns `InvalidRow` if the type column is not income or expense.
pub fn to_fields(model: &transactions::Model) -> Result<TransactionFields, TransactionError> {
    let kind = model
        .transaction_type
        .parse::<TransactionKind>()
        .map_err(|source| TransactionError::InvalidRow {
            id: model.id,
            source,
        })?;

    Ok(TransactionFields {
        kind,
        amount: model.amount,
        category: model.category.clone(),
        date: model.transaction_date,
        description: model.description.clone(),
    })
}

/// The reconciler's view of a stored row.
///
/// # Errors
///
/// Returns `InvalidRow` if the type column is not income or expense.
pub fn to_snapshot(model: &transactions::Model) -> Result<TransactionSnapshot, TransactionError> {
    Ok(to_fields(model)?.snapshot(UserId::from_uuid(model.user_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn row(user_id: Uuid, kind: &str) -> transactions::Model {
        let now = Utc::now().into();
        transactions::Model {
            id: Uuid::new_v4(),
            user_id,
            transaction_type: kind.to_string(),
            amount: dec!(42.50),
            category: "Food".to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            description: Some("groceries".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_to_snapshot_reads_period_from_date() {
        let user = UserId::new();
        let snapshot = to_snapshot(&row(user.into_inner(), "expense")).unwrap();

        assert_eq!(snapshot.kind, TransactionKind::Expense);
        assert_eq!(snapshot.amount, dec!(42.50));
        assert_eq!(snapshot.period_key().month, 2);
        assert_eq!(snapshot.period_key().user_id, user);
    }

    #[test]
    fn test_to_fields_rejects_unknown_type() {
        let result = to_fields(&row(Uuid::new_v4(), "transfer"));
        assert!(matches!(result, Err(TransactionError::InvalidRow { .. })));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<transactions::Model>::new()])
            .into_connection();
        let repo = TransactionRepository::new(Arc::new(db));

        let result = repo.delete(UserId::new(), TransactionId::new()).await;

        assert!(matches!(result, Err(TransactionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_row() {
        let user = UserId::new();
        let stored = row(user.into_inner(), "income");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let repo = TransactionRepository::new(Arc::new(db));

        let removed = repo
            .delete(user, TransactionId::from_uuid(stored.id))
            .await
            .unwrap();

        assert_eq!(removed, stored);
    }
}
