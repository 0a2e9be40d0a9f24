//! User data routes.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::delete};
use finwise_db::repositories::{PurgeSummary, UserDataRepository};
use serde::Serialize;
use tracing::info;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the user routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/users/me/data", delete(delete_my_data))
}

/// Response for a data wipe.
#[derive(Debug, Serialize)]
pub struct DeleteDataResponse {
    /// Rows removed.
    pub deleted: PurgeSummary,
}

/// DELETE /users/me/data - Removes all of the caller's transactions and budgets.
async fn delete_my_data(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<DeleteDataResponse>> {
    let deleted = UserDataRepository::new(Arc::clone(&state.db))
        .purge(auth.user_id())
        .await?;

    info!(
        user_id = %auth.user_id(),
        transactions = deleted.transactions,
        budgets = deleted.budgets,
        "User data deleted"
    );

    Ok(Json(DeleteDataResponse { deleted }))
}
