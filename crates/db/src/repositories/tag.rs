//! Tag repository.

use std::sync::Arc;

use super::now;
use crate::entities::{Tag, tag};
use crate::error::{map_db_err, map_db_err_as};
use jokebot_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, warn};

const TAG_CONFLICT: &str = "tag already exists";

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a tag by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<tag::Model>> {
        Tag::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Get a tag by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<tag::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag not found: {id}")))
    }

    /// Find a tag by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<tag::Model>> {
        Tag::find()
            .filter(tag::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Find several tags by ID.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<tag::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Tag::find()
            .filter(tag::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// List all tags ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Count tags.
    pub async fn count(&self) -> AppResult<u64> {
        Tag::find()
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Create a tag.
    pub async fn create(&self, name: &str, created_by: Option<i64>) -> AppResult<tag::Model> {
        let now = now();
        let model = tag::ActiveModel {
            name: Set(name.to_string()),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_db_err_as(e, TAG_CONFLICT, "creator not found"))?;
        debug!(tag_id = created.id, name = %created.name, "Created tag");
        Ok(created)
    }

    /// Rename a tag.
    pub async fn rename(&self, id: i32, name: &str) -> AppResult<tag::Model> {
        let mut model: tag::ActiveModel = self.get_by_id(id).await?.into();
        model.name = Set(name.to_string());
        model.updated_at = Set(now());
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| map_db_err_as(e, TAG_CONFLICT, "creator not found"))
    }

    /// Delete a tag. Refused while jokes or chats still use it.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = Tag::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| {
                let err = map_db_err_as(e, TAG_CONFLICT, "tag is still used by jokes or chats");
                warn!(tag_id = id, error = %err, "Tag delete refused");
                err
            })?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_tag(id: i32, name: &str) -> tag::Model {
        tag::Model {
            id,
            name: name.to_string(),
            created_by: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_tag(1, "Funny")]])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let result = repo.find_by_name("Funny").await.unwrap().unwrap();

        assert_eq!(result.id, 1);
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = TagRepository::new(db);
        assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rename() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_tag(2, "Pun")]])
                .append_query_results([[create_test_tag(2, "Puns")]])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let result = repo.rename(2, "Puns").await.unwrap();

        assert_eq!(result.name, "Puns");
    }

    #[tokio::test]
    async fn test_rename_missing_tag() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<tag::Model>::new()])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let result = repo.rename(9, "Puns").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
