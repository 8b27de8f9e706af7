//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repositories for budgets, transactions, tags and users
//! - The snapshot-reading budget analytics repository
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod snapshot;

pub use repositories::{
    AnalyticsError, BudgetAnalyticsRepository, BudgetRepoError, BudgetRepository,
    CreateTransactionInput, DateRangeFilter, TagRepository, TransactionRepoError,
    TransactionRepository, UserRepository,
};
pub use snapshot::Snapshot;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tally_shared::config::DatabaseConfig;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection sized from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}
