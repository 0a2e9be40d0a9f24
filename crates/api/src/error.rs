//! Error responses.
//!
//! Every handler error becomes an [`AppError`] and is rendered as
//! `{"error": <code>, "message": <text>}` with the matching status.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use finwise_core::budget::{BudgetError, ReconcileError};
use finwise_db::repositories::{BudgetRepositoryError, TransactionError};
use finwise_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Handler error rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.public_message(),
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::Validation(rejection.body_text()))
    }
}

impl From<finwise_core::transaction::TransactionError> for ApiError {
    fn from(err: finwise_core::transaction::TransactionError) -> Self {
        Self(AppError::Validation(err.to_string()))
    }
}

impl From<BudgetError> for ApiError {
    fn from(err: BudgetError) -> Self {
        Self(AppError::Validation(err.to_string()))
    }
}

impl From<TransactionError> for ApiError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::NotFound(_) => {
                Self(AppError::NotFound("Transaction not found".to_string()))
            }
            TransactionError::InvalidRow { .. } => Self(AppError::Internal(err.to_string())),
            TransactionError::Database(e) => e.into(),
        }
    }
}

impl From<BudgetRepositoryError> for ApiError {
    fn from(err: BudgetRepositoryError) -> Self {
        match err {
            BudgetRepositoryError::NotFound(_) => {
                Self(AppError::NotFound("Budget not found".to_string()))
            }
            BudgetRepositoryError::InvalidMonth(_) => Self(AppError::Internal(err.to_string())),
            BudgetRepositoryError::Database(e) => e.into(),
        }
    }
}

impl From<ReconcileError<BudgetRepositoryError>> for ApiError {
    fn from(err: ReconcileError<BudgetRepositoryError>) -> Self {
        match err {
            ReconcileError::Invalid(e) => e.into(),
            ReconcileError::Store(e) => e.into(),
        }
    }
}
