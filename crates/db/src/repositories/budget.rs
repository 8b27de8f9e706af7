//! Budget repository.
//!
//! Budgets are written as a header row plus ordered item rows. Writes are
//! validated with the core validator and applied in one database
//! transaction; reads assemble the core [`Budget`] with item tags resolved.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tally_core::budget::{
    Budget, BudgetError, BudgetInput, BudgetItem, BudgetItemInput, Tag, validate_budget_input,
};
use tally_shared::AppError;
use tally_shared::types::{BudgetId, BudgetItemId, TagId, UserId};
use uuid::Uuid;

use super::tag::{tags_by_id, tags_for_user};
use crate::entities::{budget_items, budgets};

/// Error types for budget operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetRepoError {
    /// Validation or ownership failure.
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BudgetRepoError> for AppError {
    fn from(err: BudgetRepoError) -> Self {
        match err {
            BudgetRepoError::Budget(e @ BudgetError::NotFound(_)) => Self::NotFound(e.to_string()),
            BudgetRepoError::Budget(e) => Self::Validation(e.to_string()),
            BudgetRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Restricts listed budgets to those overlapping `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRangeFilter {
    /// Window start (inclusive).
    pub start: DateTime<Utc>,
    /// Window end (inclusive).
    pub end: DateTime<Utc>,
}

/// Budget repository for CRUD operations.
#[derive(Debug, Clone, Copy)]
pub struct BudgetRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> BudgetRepository<'a> {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a user's budgets, ordered by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn list_budgets(
        &self,
        user_id: UserId,
        filter: Option<DateRangeFilter>,
    ) -> Result<Vec<Budget>, DbErr> {
        budgets_for_user(self.db, user_id, filter).await
    }

    /// Gets a budget owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn get_budget(
        &self,
        user_id: UserId,
        budget_id: BudgetId,
    ) -> Result<Option<Budget>, DbErr> {
        budget_for_user(self.db, user_id, budget_id).await
    }

    /// Creates a budget with its items.
    ///
    /// # Errors
    ///
    /// Returns an error if the input fails validation or a write fails.
    pub async fn create_budget(
        &self,
        user_id: UserId,
        input: BudgetInput,
    ) -> Result<Budget, BudgetRepoError> {
        let user_tags = tags_for_user(self.db, user_id).await?;
        validate_budget_input(&input, &user_tags)?;

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let header = budgets::ActiveModel {
            id: Set(BudgetId::new().into_inner()),
            user_id: Set(user_id.into_inner()),
            name: Set(input.name.trim().to_string()),
            start_date: Set(input.start_date.into()),
            end_date: Set(input.end_date.into()),
            currency: Set(input.currency.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let items = insert_items(&txn, header.id, &input.items, now).await?;
        txn.commit().await?;

        tracing::info!(
            user_id = %user_id,
            budget_id = %header.id,
            items = items.len(),
            "Budget created"
        );

        Ok(assemble(header, items, &index_tags(user_tags)))
    }

    /// Replaces a budget's name, range, currency and items.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the budget does not exist or belongs to another
    /// user, a validation error for bad input, or a database error.
    pub async fn update_budget(
        &self,
        user_id: UserId,
        budget_id: BudgetId,
        input: BudgetInput,
    ) -> Result<Budget, BudgetRepoError> {
        let user_tags = tags_for_user(self.db, user_id).await?;
        validate_budget_input(&input, &user_tags)?;

        let txn = self.db.begin().await?;
        let existing = budgets::Entity::find_by_id(budget_id.into_inner())
            .filter(budgets::Column::UserId.eq(user_id.into_inner()))
            .one(&txn)
            .await?
            .ok_or(BudgetError::NotFound(budget_id))?;

        let now = Utc::now();
        let mut header: budgets::ActiveModel = existing.into();
        header.name = Set(input.name.trim().to_string());
        header.start_date = Set(input.start_date.into());
        header.end_date = Set(input.end_date.into());
        header.currency = Set(input.currency.clone());
        header.updated_at = Set(now.into());
        let header = header.update(&txn).await?;

        budget_items::Entity::delete_many()
            .filter(budget_items::Column::BudgetId.eq(header.id))
            .exec(&txn)
            .await?;
        let items = insert_items(&txn, header.id, &input.items, now).await?;
        txn.commit().await?;

        tracing::info!(
            user_id = %user_id,
            budget_id = %budget_id,
            items = items.len(),
            "Budget updated"
        );

        Ok(assemble(header, items, &index_tags(user_tags)))
    }

    /// Deletes a budget and its items.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no budget with this ID belongs to `user_id`.
    pub async fn delete_budget(
        &self,
        user_id: UserId,
        budget_id: BudgetId,
    ) -> Result<(), BudgetRepoError> {
        let result = budgets::Entity::delete_many()
            .filter(budgets::Column::Id.eq(budget_id.into_inner()))
            .filter(budgets::Column::UserId.eq(user_id.into_inner()))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(BudgetError::NotFound(budget_id).into());
        }

        tracing::info!(user_id = %user_id, budget_id = %budget_id, "Budget deleted");
        Ok(())
    }
}

async fn insert_items(
    txn: &DatabaseTransaction,
    budget_id: Uuid,
    items: &[BudgetItemInput],
    now: DateTime<Utc>,
) -> Result<Vec<budget_items::Model>, DbErr> {
    let mut inserted = Vec::with_capacity(items.len());
    for (position, item) in (0i32..).zip(items) {
        let model = budget_items::ActiveModel {
            id: Set(BudgetItemId::new().into_inner()),
            budget_id: Set(budget_id),
            tag_id: Set(item.tag_id.map(TagId::into_inner)),
            expected_amount: Set(item.expected_amount),
            position: Set(position),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await?;
        inserted.push(model);
    }
    Ok(inserted)
}

/// One budget with items, if owned by `user_id`.
pub(crate) async fn budget_for_user<C>(
    conn: &C,
    user_id: UserId,
    budget_id: BudgetId,
) -> Result<Option<Budget>, DbErr>
where
    C: ConnectionTrait,
{
    let Some(header) = budgets::Entity::find_by_id(budget_id.into_inner())
        .filter(budgets::Column::UserId.eq(user_id.into_inner()))
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let items = budget_items::Entity::find()
        .filter(budget_items::Column::BudgetId.eq(header.id))
        .order_by_asc(budget_items::Column::Position)
        .all(conn)
        .await?;

    let tags = tags_by_id(conn, items.iter().filter_map(|item| item.tag_id)).await?;

    Ok(Some(assemble(header, items, &tags)))
}

/// All budgets of `user_id` with items, optionally restricted by overlap.
pub(crate) async fn budgets_for_user<C>(
    conn: &C,
    user_id: UserId,
    filter: Option<DateRangeFilter>,
) -> Result<Vec<Budget>, DbErr>
where
    C: ConnectionTrait,
{
    let mut query =
        budgets::Entity::find().filter(budgets::Column::UserId.eq(user_id.into_inner()));
    if let Some(range) = filter {
        query = query
            .filter(budgets::Column::StartDate.lte(range.end))
            .filter(budgets::Column::EndDate.gte(range.start));
    }
    let headers = query
        .order_by_asc(budgets::Column::StartDate)
        .order_by_asc(budgets::Column::Id)
        .all(conn)
        .await?;

    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let items = budget_items::Entity::find()
        .filter(budget_items::Column::BudgetId.is_in(headers.iter().map(|h| h.id)))
        .order_by_asc(budget_items::Column::BudgetId)
        .order_by_asc(budget_items::Column::Position)
        .all(conn)
        .await?;

    let tags = tags_by_id(conn, items.iter().filter_map(|item| item.tag_id)).await?;

    let mut by_budget: HashMap<Uuid, Vec<budget_items::Model>> = HashMap::new();
    for item in items {
        by_budget.entry(item.budget_id).or_default().push(item);
    }

    Ok(headers
        .into_iter()
        .map(|header| {
            let items = by_budget.remove(&header.id).unwrap_or_default();
            assemble(header, items, &tags)
        })
        .collect())
}

fn index_tags(tags: Vec<Tag>) -> HashMap<Uuid, Tag> {
    tags.into_iter().map(|tag| (tag.id.into_inner(), tag)).collect()
}

fn assemble(
    header: budgets::Model,
    mut items: Vec<budget_items::Model>,
    tags: &HashMap<Uuid, Tag>,
) -> Budget {
    items.sort_by_key(|item| item.position);
    let budget_id = BudgetId::from_uuid(header.id);

    Budget {
        id: budget_id,
        user_id: UserId::from_uuid(header.user_id),
        name: header.name,
        start_date: header.start_date.with_timezone(&Utc),
        end_date: header.end_date.with_timezone(&Utc),
        currency: header.currency,
        items: items
            .into_iter()
            .map(|item| BudgetItem {
                id: BudgetItemId::from_uuid(item.id),
                budget_id,
                tag_id: item.tag_id.map(TagId::from_uuid),
                tag: item.tag_id.and_then(|id| tags.get(&id)).cloned(),
                expected_amount: item.expected_amount,
            })
            .collect(),
    }
}
