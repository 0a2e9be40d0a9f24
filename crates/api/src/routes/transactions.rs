//! Transaction routes.
//!
//! Every write is followed by budget reconciliation for the affected period.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use finwise_core::transaction::TransactionDraft;
use finwise_db::entities::transactions;
use finwise_db::repositories::{to_fields, to_snapshot};
use finwise_shared::AppError;
use finwise_shared::types::{PageRequest, PageResponse, TransactionId};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};

/// Creates the transaction routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for a transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Owner.
    pub user: Uuid,
    /// `income` or `expense`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Amount.
    pub amount: Decimal,
    /// Category.
    pub category: String,
    /// Transaction date.
    pub date: NaiveDate,
    /// Description.
    pub description: Option<String>,
    /// Created at timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(model: transactions::Model) -> Self {
        Self {
            id: model.id,
            user: model.user_id,
            kind: model.transaction_type,
            amount: model.amount,
            category: model.category,
            date: model.transaction_date,
            description: model.description,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /transactions - Lists the user's transactions, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    page: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<Json<PageResponse<TransactionResponse>>> {
    let Query(page) = page?;
    let page = page.clamped();
    let (rows, total) = state.transactions().list(auth.user_id(), &page).await?;

    let items = rows.into_iter().map(TransactionResponse::from).collect();
    Ok(Json(PageResponse::new(items, page.page, page.per_page, total)))
}

/// POST /transactions - Records a transaction and applies it to its budget.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<TransactionDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TransactionResponse>)> {
    let Json(draft) = payload?;
    let fields = draft.validate(Utc::now().date_naive())?;

    let created = state.transactions().create(auth.user_id(), &fields).await?;
    state
        .reconciler()
        .record_created(&to_snapshot(&created)?)
        .await?;

    info!(
        transaction_id = %created.id,
        user_id = %auth.user_id(),
        kind = %fields.kind,
        category = %fields.category,
        "Transaction created"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET /transactions/{id} - Fetches one transaction.
async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TransactionResponse>> {
    let found = state
        .transactions()
        .find_by_id(auth.user_id(), TransactionId::from_uuid(id))
        .await?
        .ok_or_else(|| ApiError(AppError::NotFound("Transaction not found".to_string())))?;

    Ok(Json(found.into()))
}

/// PUT /transactions/{id} - Edits a transaction and moves its budget effect.
async fn update_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<TransactionDraft>, JsonRejection>,
) -> ApiResult<Json<TransactionResponse>> {
    let Json(draft) = payload?;
    let id = TransactionId::from_uuid(id);
    let repo = state.transactions();

    let current = repo
        .find_by_id(auth.user_id(), id)
        .await?
        .ok_or_else(|| ApiError(AppError::NotFound("Transaction not found".to_string())))?;
    let fields = draft.merge_into(&to_fields(&current)?)?;

    let updated = repo.update(auth.user_id(), id, &fields).await?;
    state
        .reconciler()
        .record_updated(&to_snapshot(&current)?, &to_snapshot(&updated)?)
        .await?;

    info!(transaction_id = %id, user_id = %auth.user_id(), "Transaction updated");

    Ok(Json(updated.into()))
}

/// DELETE /transactions/{id} - Deletes a transaction and reverses its effect.
async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let id = TransactionId::from_uuid(id);
    let deleted = state.transactions().delete(auth.user_id(), id).await?;
    state
        .reconciler()
        .record_deleted(&to_snapshot(&deleted)?)
        .await?;

    info!(transaction_id = %id, user_id = %auth.user_id(), "Transaction deleted");

    Ok(StatusCode::NO_CONTENT)
}
