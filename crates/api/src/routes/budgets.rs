//! Budget routes.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use finwise_core::budget::{BudgetPeriod, BudgetStore, BudgetSummary, PeriodKey};
use finwise_shared::AppError;
use finwise_shared::types::{BudgetId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};

/// Creates the budget routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets))
        .route("/budgets/summary", get(get_summary))
        .route("/budgets/update-limit", post(update_limit))
        .route("/budgets/update-spent", post(update_spent))
        .route("/budgets/{id}", get(get_budget).delete(delete_budget))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Optional period selector. Missing parts default to the current UTC month.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// Month, zero-based.
    pub month: Option<u32>,
    /// Calendar year.
    pub year: Option<i32>,
}

impl PeriodQuery {
    fn resolve(&self, user_id: UserId) -> ApiResult<PeriodKey> {
        let current = PeriodKey::current(user_id);
        Ok(PeriodKey::new(
            user_id,
            self.month.unwrap_or(current.month),
            self.year.unwrap_or(current.year),
        )?)
    }
}

/// Request body for setting a category's limit.
#[derive(Debug, Deserialize)]
pub struct UpdateLimitRequest {
    /// Category name.
    pub category: String,
    /// New limit.
    pub limit: Decimal,
    /// Month, zero-based; defaults to the current month.
    pub month: Option<u32>,
    /// Year; defaults to the current year.
    pub year: Option<i32>,
}

/// Request body for setting a category's spent amount.
#[derive(Debug, Deserialize)]
pub struct UpdateSpentRequest {
    /// Category name.
    pub category: String,
    /// New spent amount.
    pub spent: Decimal,
    /// Month, zero-based; defaults to the current month.
    pub month: Option<u32>,
    /// Year; defaults to the current year.
    pub year: Option<i32>,
}

/// Summary plus the period it describes.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Month, zero-based.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// Totals and rankings.
    #[serde(flatten)]
    pub summary: BudgetSummary,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /budgets - Lists the user's budget periods, newest first.
async fn list_budgets(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Value>> {
    let budgets = state.budgets().list_for_user(auth.user_id()).await?;
    Ok(Json(json!({ "budgets": budgets })))
}

/// GET /budgets/summary - Totals and category rankings for one month.
async fn get_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<Json<SummaryResponse>> {
    let Query(query) = query?;
    let key = query.resolve(auth.user_id())?;
    let summary = state.reconciler().summary(&key).await?;

    Ok(Json(SummaryResponse {
        month: key.month,
        year: key.year,
        summary,
    }))
}

/// POST /budgets/update-limit - Sets a category's limit directly.
async fn update_limit(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<UpdateLimitRequest>, JsonRejection>,
) -> ApiResult<Json<BudgetPeriod>> {
    let Json(req) = payload?;
    let key = PeriodQuery {
        month: req.month,
        year: req.year,
    }
    .resolve(auth.user_id())?;

    let reconciler = state.reconciler();
    reconciler.set_limit(&key, &req.category, req.limit).await?;

    info!(period = %key, category = %req.category, limit = %req.limit, "Budget limit set");

    current_period(&state, &key).await
}

/// POST /budgets/update-spent - Sets a category's spent amount directly.
async fn update_spent(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<UpdateSpentRequest>, JsonRejection>,
) -> ApiResult<Json<BudgetPeriod>> {
    let Json(req) = payload?;
    let key = PeriodQuery {
        month: req.month,
        year: req.year,
    }
    .resolve(auth.user_id())?;

    let reconciler = state.reconciler();
    reconciler.set_spent(&key, &req.category, req.spent).await?;

    info!(period = %key, category = %req.category, spent = %req.spent, "Budget spent set");

    current_period(&state, &key).await
}

/// GET /budgets/{id} - Fetches one budget period.
async fn get_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BudgetPeriod>> {
    state
        .budgets()
        .find_by_id(auth.user_id(), BudgetId::from_uuid(id))
        .await?
        .map(Json)
        .ok_or_else(budget_not_found)
}

/// DELETE /budgets/{id} - Deletes a budget period and its categories.
async fn delete_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .budgets()
        .delete_by_id(auth.user_id(), BudgetId::from_uuid(id))
        .await?;

    info!(budget_id = %id, user_id = %auth.user_id(), "Budget deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helper Functions
// ============================================================================

async fn current_period(state: &AppState, key: &PeriodKey) -> ApiResult<Json<BudgetPeriod>> {
    state
        .budgets()
        .find_period(key)
        .await?
        .map(Json)
        .ok_or_else(budget_not_found)
}

fn budget_not_found() -> ApiError {
    ApiError(AppError::NotFound("Budget not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_query_defaults_to_current() {
        let user = UserId::new();
        let key = PeriodQuery::default().resolve(user).unwrap();
        assert_eq!(key, PeriodKey::current(user));
    }

    #[test]
    fn test_period_query_rejects_month_twelve() {
        let query = PeriodQuery {
            month: Some(12),
            year: Some(2024),
        };
        assert!(query.resolve(UserId::new()).is_err());
    }
}
