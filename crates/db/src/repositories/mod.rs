//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod analytics;
pub mod budget;
pub mod tag;
pub mod transaction;
pub mod user;

pub use analytics::{AnalyticsError, BudgetAnalyticsRepository};
pub use budget::{BudgetRepoError, BudgetRepository, DateRangeFilter};
pub use tag::{DEFAULT_TAG_COLOR, TagRepository};
pub use transaction::{CreateTransactionInput, TransactionRepoError, TransactionRepository};
pub use user::UserRepository;
