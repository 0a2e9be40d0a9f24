//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod budget;
pub mod transaction;
pub mod user_data;

pub use budget::{BudgetRepository, BudgetRepositoryError};
pub use transaction::{TransactionError, TransactionRepository, to_fields, to_snapshot};
pub use user_data::{PurgeSummary, UserDataRepository};
