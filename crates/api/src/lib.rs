//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication and role middleware
//! - Error responses

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use finwise_core::budget::BudgetReconciler;
use finwise_db::{BudgetRepository, TransactionRepository};
use finwise_shared::JwtService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    /// Transaction repository over the shared pool.
    #[must_use]
    pub fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(Arc::clone(&self.db))
    }

    /// Budget repository over the shared pool.
    #[must_use]
    pub fn budgets(&self) -> BudgetRepository {
        BudgetRepository::new(Arc::clone(&self.db))
    }

    /// Reconciler writing to the budget tables.
    #[must_use]
    pub fn reconciler(&self) -> BudgetReconciler<BudgetRepository> {
        BudgetReconciler::new(self.budgets())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
