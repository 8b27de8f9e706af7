//! Consistent read snapshots.
//!
//! Analytics reads (a budget, then the transactions in its window) must see
//! the same database state. [`Snapshot`] wraps a `REPEATABLE READ, READ ONLY`
//! transaction; every query issued through [`Snapshot::connection`] observes
//! the snapshot taken by its first statement.
//!
//! # Usage
//!
//! ```ignore
//! let snapshot = Snapshot::begin(&db).await?;
//! let budgets = budgets::Entity::find().all(snapshot.connection()).await?;
//! snapshot.finish().await?;
//! ```

use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

/// Issued as the first statement of every snapshot.
pub const SNAPSHOT_MODE_SQL: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

/// A read-only, repeatable-read database transaction.
pub struct Snapshot {
    txn: DatabaseTransaction,
}

impl Snapshot {
    /// Opens a new snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started.
    pub async fn begin(db: &DatabaseConnection) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        txn.execute_unprepared(SNAPSHOT_MODE_SQL).await?;

        Ok(Self { txn })
    }

    /// Connection to run the snapshot's queries on.
    #[must_use]
    pub fn connection(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Ends the snapshot.
    ///
    /// Nothing was written, so committing only releases the transaction.
    /// Dropping a snapshot without calling this rolls it back.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn finish(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }
}
