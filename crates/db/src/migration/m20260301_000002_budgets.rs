//! Budgets migration.
//!
//! Creates monthly budget periods and their per-category entries. The unique
//! key on `(budget_id, category)` is what the reconciliation upsert conflicts
//! on.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(BUDGETS_SQL).await?;
        db.execute_unprepared(BUDGET_CATEGORIES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS budget_categories CASCADE;")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS budgets CASCADE;")
            .await?;
        Ok(())
    }
}

const BUDGETS_SQL: &str = r"
CREATE TABLE budgets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    month INTEGER NOT NULL,
    year INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_budget_month CHECK (month BETWEEN 0 AND 11),
    CONSTRAINT uq_budget_period UNIQUE (user_id, month, year)
);

CREATE INDEX idx_budgets_user_period ON budgets(user_id, year DESC, month DESC);
";

const BUDGET_CATEGORIES_SQL: &str = r"
CREATE TABLE budget_categories (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    budget_id UUID NOT NULL REFERENCES budgets(id) ON DELETE CASCADE,
    category VARCHAR(100) NOT NULL,
    limit_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    spent NUMERIC(19, 4) NOT NULL DEFAULT 0,
    position BIGSERIAL NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_budget_category UNIQUE (budget_id, category)
);

CREATE INDEX idx_budget_categories_order ON budget_categories(budget_id, position);
";
