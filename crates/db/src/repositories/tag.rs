//! Tag repository.
//!
//! Tags are owned by a user and are read by the analytics engine only to
//! decorate items, alerts and top spenders.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use tally_core::budget::Tag;
use tally_shared::types::{TagId, UserId};
use uuid::Uuid;

use crate::entities::tags;

/// Color given to tags created without one.
pub const DEFAULT_TAG_COLOR: &str = "#64748b";

/// Tag repository.
#[derive(Debug, Clone, Copy)]
pub struct TagRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TagRepository<'a> {
    /// Creates a new tag repository.
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a user's tags ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_tags(&self, user_id: UserId) -> Result<Vec<Tag>, DbErr> {
        tags_for_user(self.db, user_id).await
    }

    /// Looks up tags by ID, restricted to those owned by `user_id`.
    ///
    /// Unknown or foreign IDs are silently absent from the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_ids(&self, user_id: UserId, ids: &[TagId]) -> Result<Vec<Tag>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = tags::Entity::find()
            .filter(tags::Column::UserId.eq(user_id.into_inner()))
            .filter(tags::Column::Id.is_in(ids.iter().map(|id| id.into_inner())))
            .order_by_asc(tags::Column::Name)
            .all(self.db)
            .await?;

        Ok(models.into_iter().map(to_tag).collect())
    }

    /// Creates a tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including a duplicate name for
    /// the same user).
    pub async fn create_tag(
        &self,
        user_id: UserId,
        name: &str,
        color: Option<&str>,
    ) -> Result<Tag, DbErr> {
        let tag = tags::ActiveModel {
            id: Set(TagId::new().into_inner()),
            user_id: Set(user_id.into_inner()),
            name: Set(name.trim().to_string()),
            color: Set(color.unwrap_or(DEFAULT_TAG_COLOR).to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        Ok(to_tag(tag.insert(self.db).await?))
    }
}

/// All tags owned by `user_id`, ordered by name.
pub(crate) async fn tags_for_user<C>(conn: &C, user_id: UserId) -> Result<Vec<Tag>, DbErr>
where
    C: ConnectionTrait,
{
    let models = tags::Entity::find()
        .filter(tags::Column::UserId.eq(user_id.into_inner()))
        .order_by_asc(tags::Column::Name)
        .all(conn)
        .await?;

    Ok(models.into_iter().map(to_tag).collect())
}

/// Resolves tag IDs to tags. Issues no query when `ids` is empty.
pub(crate) async fn tags_by_id<C, I>(conn: &C, ids: I) -> Result<HashMap<Uuid, Tag>, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = Uuid>,
{
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let models = tags::Entity::find()
        .filter(tags::Column::Id.is_in(ids))
        .all(conn)
        .await?;

    Ok(models
        .into_iter()
        .map(|model| (model.id, to_tag(model)))
        .collect())
}

pub(crate) fn to_tag(model: tags::Model) -> Tag {
    Tag {
        id: TagId::from_uuid(model.id),
        name: model.name,
        color: model.color,
    }
}
