//! Transaction repository.
//!
//! Reads resolve each transaction's full tag set and its primary tag, the
//! one the budget engine matches on.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tally_core::budget::{Tag, Transaction, TransactionType};
use tally_shared::AppError;
use tally_shared::types::{TagId, TransactionId, UserId};
use uuid::Uuid;

use super::tag::tags_by_id;
use crate::entities::{tags, transaction_tags, transactions};

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionRepoError {
    /// A tag on the transaction does not belong to the user.
    #[error("Tag not found: {0}")]
    TagNotOwned(TagId),

    /// Amount is zero or negative.
    #[error("Transaction amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TransactionRepoError> for AppError {
    fn from(err: TransactionRepoError) -> Self {
        match err {
            TransactionRepoError::Database(e) => Self::Database(e.to_string()),
            other => Self::Validation(other.to_string()),
        }
    }
}

/// Input for recording a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Owning user.
    pub user_id: UserId,
    /// Expense or income.
    pub transaction_type: TransactionType,
    /// Positive amount.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Optional description.
    pub description: Option<String>,
    /// When it happened.
    pub occurred_at: DateTime<Utc>,
    /// Full tag set.
    pub tag_ids: Vec<TagId>,
    /// Tag used for budget matching; added to the tag set if missing.
    pub primary_tag_id: Option<TagId>,
}

/// Transaction repository.
#[derive(Debug, Clone, Copy)]
pub struct TransactionRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TransactionRepository<'a> {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a user's transactions in `currency` with `occurred_at` in
    /// `[start, end]`, ordered by time then ID.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn list_transactions(
        &self,
        user_id: UserId,
        currency: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, DbErr> {
        transactions_in_window(self.db, user_id, currency, start, end).await
    }

    /// Records a transaction with its tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, a tag is not owned by
    /// the user, or the insert fails.
    pub async fn create_transaction(
        &self,
        input: CreateTransactionInput,
    ) -> Result<Transaction, TransactionRepoError> {
        if input.amount <= Decimal::ZERO {
            return Err(TransactionRepoError::NonPositiveAmount(input.amount));
        }

        let mut tag_ids = input.tag_ids.clone();
        tag_ids.extend(input.primary_tag_id);
        tag_ids.sort_unstable();
        tag_ids.dedup();

        let owned: HashMap<Uuid, tags::Model> = if tag_ids.is_empty() {
            HashMap::new()
        } else {
            tags::Entity::find()
                .filter(tags::Column::UserId.eq(input.user_id.into_inner()))
                .filter(tags::Column::Id.is_in(tag_ids.iter().map(|id| id.into_inner())))
                .all(self.db)
                .await?
                .into_iter()
                .map(|model| (model.id, model))
                .collect()
        };
        if let Some(missing) = tag_ids
            .iter()
            .find(|id| !owned.contains_key(&id.into_inner()))
        {
            return Err(TransactionRepoError::TagNotOwned(*missing));
        }

        let txn = self.db.begin().await?;

        let model = transactions::ActiveModel {
            id: Set(TransactionId::new().into_inner()),
            user_id: Set(input.user_id.into_inner()),
            transaction_type: Set(input.transaction_type.into()),
            amount: Set(input.amount),
            currency: Set(input.currency.clone()),
            description: Set(input.description.clone()),
            occurred_at: Set(input.occurred_at.into()),
            primary_tag_id: Set(input.primary_tag_id.map(TagId::into_inner)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        if !tag_ids.is_empty() {
            let links = tag_ids.iter().map(|tag_id| transaction_tags::ActiveModel {
                transaction_id: Set(model.id),
                tag_id: Set(tag_id.into_inner()),
            });
            transaction_tags::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;

        let lookup: HashMap<Uuid, Tag> = owned
            .into_values()
            .map(|model| (model.id, super::tag::to_tag(model)))
            .collect();
        let tags = sorted_tags(tag_ids.iter().filter_map(|id| lookup.get(&id.into_inner())));

        Ok(to_transaction(model, tags, &lookup))
    }
}

/// A user's transactions in one currency and inclusive time window.
pub(crate) async fn transactions_in_window<C>(
    conn: &C,
    user_id: UserId,
    currency: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Transaction>, DbErr>
where
    C: ConnectionTrait,
{
    let rows = transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user_id.into_inner()))
        .filter(transactions::Column::Currency.eq(currency))
        .filter(transactions::Column::OccurredAt.between(start, end))
        .order_by_asc(transactions::Column::OccurredAt)
        .order_by_asc(transactions::Column::Id)
        .all(conn)
        .await?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let links = transaction_tags::Entity::find()
        .filter(transaction_tags::Column::TransactionId.is_in(rows.iter().map(|row| row.id)))
        .all(conn)
        .await?;

    let lookup = tags_by_id(
        conn,
        links
            .iter()
            .map(|link| link.tag_id)
            .chain(rows.iter().filter_map(|row| row.primary_tag_id)),
    )
    .await?;

    let mut tag_sets: HashMap<Uuid, Vec<&Tag>> = HashMap::new();
    for link in &links {
        if let Some(tag) = lookup.get(&link.tag_id) {
            tag_sets.entry(link.transaction_id).or_default().push(tag);
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let tags = sorted_tags(tag_sets.remove(&row.id).unwrap_or_default());
            to_transaction(row, tags, &lookup)
        })
        .collect())
}

fn sorted_tags<'a, I>(tags: I) -> Vec<Tag>
where
    I: IntoIterator<Item = &'a Tag>,
{
    let mut tags: Vec<Tag> = tags.into_iter().cloned().collect();
    tags.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    tags
}

fn to_transaction(
    model: transactions::Model,
    tags: Vec<Tag>,
    lookup: &HashMap<Uuid, Tag>,
) -> Transaction {
    Transaction {
        id: TransactionId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        transaction_type: model.transaction_type.into(),
        amount: model.amount,
        currency: model.currency,
        description: model.description,
        occurred_at: model.occurred_at.with_timezone(&Utc),
        tags,
        primary_tag: model
            .primary_tag_id
            .and_then(|id| lookup.get(&id))
            .cloned(),
    }
}
