//! Per-user data removal.

use std::sync::Arc;

use finwise_shared::types::UserId;
use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use serde::Serialize;

use super::{BudgetRepository, TransactionRepository};

/// Row counts removed by [`UserDataRepository::purge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    /// Transactions deleted.
    pub transactions: u64,
    /// Budget periods deleted. Their categories cascade.
    pub budgets: u64,
}

/// Removes everything stored for a user.
#[derive(Debug, Clone)]
pub struct UserDataRepository {
    db: Arc<DatabaseConnection>,
}

impl UserDataRepository {
    /// Creates a new user data repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Deletes all of a user's transactions and budgets in one database
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if either delete fails; nothing is removed then.
    pub async fn purge(&self, user_id: UserId) -> Result<PurgeSummary, DbErr> {
        let txn = self.db.begin().await?;

        let transactions = TransactionRepository::delete_all_for_user(&txn, user_id).await?;
        let budgets = BudgetRepository::delete_all_for_user(&txn, user_id).await?;

        txn.commit().await?;

        Ok(PurgeSummary {
            transactions,
            budgets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_purge_reports_counts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 7,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                },
            ])
            .into_connection();
        let repo = UserDataRepository::new(Arc::new(db));

        let summary = repo.purge(UserId::new()).await.unwrap();

        assert_eq!(
            summary,
            PurgeSummary {
                transactions: 7,
                budgets: 2,
            }
        );
    }
}
