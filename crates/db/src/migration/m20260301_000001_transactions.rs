//! Transactions migration.
//!
//! Creates the per-user income and expense records.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS transactions CASCADE;")
            .await?;
        Ok(())
    }
}

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    transaction_type VARCHAR(16) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    category VARCHAR(100) NOT NULL,
    transaction_date DATE NOT NULL DEFAULT CURRENT_DATE,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_transaction_type CHECK (transaction_type IN ('income', 'expense')),
    CONSTRAINT chk_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_category_not_blank CHECK (length(trim(category)) > 0)
);

-- Listing: a user's transactions, newest first
CREATE INDEX idx_transactions_user_date ON transactions(user_id, transaction_date DESC, created_at DESC);
";
