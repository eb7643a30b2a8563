//! Joke repository.

use std::sync::Arc;

use super::now;
use crate::entities::{Joke, JokeTag, Tag, joke, joke_tag, tag};
use crate::error::{map_db_err, map_db_err_as};
use jokebot_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

const JOKE_CONFLICT: &str = "joke already exists";
const JOKE_REFERENCE: &str = "author or language not found";

/// Input for creating a joke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJoke {
    pub add_by: i64,
    pub language_code: String,
    pub content: String,
    pub status: joke::JokeStatus,
}

impl NewJoke {
    fn into_active_model(self) -> joke::ActiveModel {
        let now = now();
        joke::ActiveModel {
            add_by: Set(self.add_by),
            language_code: Set(self.language_code),
            content: Set(self.content),
            status: Set(self.status),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
    }
}

async fn insert_joke_tag<C: ConnectionTrait>(
    conn: &C,
    joke_id: i32,
    tag_id: i32,
) -> AppResult<joke_tag::Model> {
    let now = now();
    let model = joke_tag::ActiveModel {
        joke_id: Set(joke_id),
        tag_id: Set(tag_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model
        .insert(conn)
        .await
        .map_err(|e| map_db_err_as(e, "joke already has this tag", "joke or tag not found"))
}

async fn replace_joke_tags<C: ConnectionTrait>(
    conn: &C,
    joke_id: i32,
    tag_ids: &[i32],
) -> AppResult<()> {
    JokeTag::delete_many()
        .filter(joke_tag::Column::JokeId.eq(joke_id))
        .exec(conn)
        .await
        .map_err(map_db_err)?;

    for &tag_id in tag_ids {
        insert_joke_tag(conn, joke_id, tag_id).await?;
    }
    Ok(())
}

/// Joke repository for database operations.
#[derive(Clone)]
pub struct JokeRepository {
    db: Arc<DatabaseConnection>,
}

impl JokeRepository {
    /// Create a new joke repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a joke by ID. Soft-deleted jokes are not returned.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<joke::Model>> {
        Joke::find_by_id(id)
            .filter(joke::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Find a joke by ID, including soft-deleted ones.
    pub async fn find_by_id_with_deleted(&self, id: i32) -> AppResult<Option<joke::Model>> {
        Joke::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Get a joke by ID, returning an error if not found or soft-deleted.
    pub async fn get_by_id(&self, id: i32) -> AppResult<joke::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Joke not found: {id}")))
    }

    /// Find a joke by its exact content.
    pub async fn find_by_content(&self, content: &str) -> AppResult<Option<joke::Model>> {
        Joke::find()
            .filter(joke::Column::Content.eq(content))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Count jokes that are not soft-deleted.
    pub async fn count(&self) -> AppResult<u64> {
        Joke::find()
            .filter(joke::Column::DeletedAt.is_null())
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Create a joke.
    ///
    /// Duplicate content is rejected with `Conflict("joke already exists")`.
    pub async fn create(&self, input: NewJoke) -> AppResult<joke::Model> {
        let created = input
            .into_active_model()
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_db_err_as(e, JOKE_CONFLICT, JOKE_REFERENCE))?;
        debug!(joke_id = created.id, author = created.add_by, "Created joke");
        Ok(created)
    }

    /// Create a joke and attach its tags in one transaction.
    pub async fn create_with_tags(
        &self,
        input: NewJoke,
        tag_ids: &[i32],
    ) -> AppResult<joke::Model> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let created = input
            .into_active_model()
            .insert(&txn)
            .await
            .map_err(|e| map_db_err_as(e, JOKE_CONFLICT, JOKE_REFERENCE))?;

        for &tag_id in tag_ids {
            insert_joke_tag(&txn, created.id, tag_id).await?;
        }

        txn.commit().await.map_err(map_db_err)?;

        info!(
            joke_id = created.id,
            author = created.add_by,
            tags = tag_ids.len(),
            "Created joke with tags"
        );
        Ok(created)
    }

    /// Update a joke. `updated_at` is always rewritten to the current time.
    pub async fn update(&self, model: joke::ActiveModel) -> AppResult<joke::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| map_db_err_as(e, JOKE_CONFLICT, JOKE_REFERENCE))
    }

    /// Change the status of a joke.
    pub async fn set_status(&self, id: i32, status: joke::JokeStatus) -> AppResult<joke::Model> {
        let mut model: joke::ActiveModel = self.get_by_id(id).await?.into();
        model.status = Set(status);
        let updated = self.update(model).await?;
        debug!(joke_id = id, status = ?status, "Changed joke status");
        Ok(updated)
    }

    /// Soft-delete a joke. Returns whether a visible joke was deleted.
    pub async fn soft_delete(&self, id: i32) -> AppResult<bool> {
        let now = now();
        let result = Joke::update_many()
            .col_expr(joke::Column::DeletedAt, Expr::value(Some(now)))
            .col_expr(joke::Column::UpdatedAt, Expr::value(now))
            .filter(joke::Column::Id.eq(id))
            .filter(joke::Column::DeletedAt.is_null())
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    /// Undo a soft delete. Returns whether a deleted joke was restored.
    pub async fn restore(&self, id: i32) -> AppResult<bool> {
        let result = Joke::update_many()
            .col_expr(
                joke::Column::DeletedAt,
                Expr::value(Option::<sea_orm::prelude::DateTimeWithTimeZone>::None),
            )
            .col_expr(joke::Column::UpdatedAt, Expr::value(now()))
            .filter(joke::Column::Id.eq(id))
            .filter(joke::Column::DeletedAt.is_not_null())
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    /// Jokes submitted by a user, newest first (paginated).
    pub async fn find_by_author(
        &self,
        author: i64,
        status: Option<joke::JokeStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<joke::Model>> {
        let mut query = Joke::find()
            .filter(joke::Column::AddBy.eq(author))
            .filter(joke::Column::DeletedAt.is_null());

        if let Some(status) = status {
            query = query.filter(joke::Column::Status.eq(status));
        }

        query
            .order_by_desc(joke::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// IDs of the jokes eligible for random selection.
    ///
    /// Matches language and status, skips soft-deleted jokes and, when
    /// `tag_ids` is not empty, keeps only jokes carrying at least one of them.
    pub async fn candidate_ids(
        &self,
        language_code: &str,
        status: joke::JokeStatus,
        tag_ids: &[i32],
    ) -> AppResult<Vec<i32>> {
        let mut query = Joke::find()
            .select_only()
            .column(joke::Column::Id)
            .filter(joke::Column::LanguageCode.eq(language_code))
            .filter(joke::Column::Status.eq(status))
            .filter(joke::Column::DeletedAt.is_null());

        if !tag_ids.is_empty() {
            query = query.filter(
                joke::Column::Id.in_subquery(
                    Query::select()
                        .column(joke_tag::Column::JokeId)
                        .from(JokeTag)
                        .and_where(joke_tag::Column::TagId.is_in(tag_ids.iter().copied()))
                        .to_owned(),
                ),
            );
        }

        query
            .order_by_asc(joke::Column::Id)
            .into_tuple::<i32>()
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    // === Tags ===

    /// Tags of a joke, ordered by name.
    pub async fn tags(&self, joke_id: i32) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .inner_join(JokeTag)
            .filter(joke_tag::Column::JokeId.eq(joke_id))
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Whether a joke carries a tag.
    pub async fn has_tag(&self, joke_id: i32, tag_id: i32) -> AppResult<bool> {
        let count = JokeTag::find()
            .filter(joke_tag::Column::JokeId.eq(joke_id))
            .filter(joke_tag::Column::TagId.eq(tag_id))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(count > 0)
    }

    /// Attach a tag to a joke.
    pub async fn add_tag(&self, joke_id: i32, tag_id: i32) -> AppResult<joke_tag::Model> {
        insert_joke_tag(self.db.as_ref(), joke_id, tag_id).await
    }

    /// Detach a tag from a joke. Returns whether a row was removed.
    pub async fn remove_tag(&self, joke_id: i32, tag_id: i32) -> AppResult<bool> {
        let result = JokeTag::delete_many()
            .filter(joke_tag::Column::JokeId.eq(joke_id))
            .filter(joke_tag::Column::TagId.eq(tag_id))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    /// Replace every tag of a joke with `tag_ids` in one transaction.
    pub async fn replace_tags(&self, joke_id: i32, tag_ids: &[i32]) -> AppResult<()> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        replace_joke_tags(&txn, joke_id, tag_ids).await?;
        txn.commit().await.map_err(map_db_err)?;

        debug!(joke_id, tags = tag_ids.len(), "Replaced joke tags");
        Ok(())
    }

    /// Update a joke and, when `tag_ids` is given, replace its tags.
    ///
    /// Both changes are committed together: a failing tag leaves the joke row
    /// untouched as well.
    pub async fn update_with_tags(
        &self,
        model: Option<joke::ActiveModel>,
        joke_id: i32,
        tag_ids: Option<&[i32]>,
    ) -> AppResult<joke::Model> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        if let Some(model) = model {
            model
                .update(&txn)
                .await
                .map_err(|e| map_db_err_as(e, JOKE_CONFLICT, JOKE_REFERENCE))?;
        }
        if let Some(tag_ids) = tag_ids {
            replace_joke_tags(&txn, joke_id, tag_ids).await?;
        }

        let updated = Joke::find_by_id(joke_id)
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Joke not found: {joke_id}")))?;

        txn.commit().await.map_err(map_db_err)?;

        debug!(joke_id, tags = ?tag_ids.map(<[i32]>::len), "Updated joke");
        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_joke(id: i32, content: &str) -> joke::Model {
        joke::Model {
            id,
            add_by: 6_038_394_083,
            language_code: "en".to_string(),
            content: content.to_string(),
            status: joke::JokeStatus::Published,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let joke = create_test_joke(1, "A joke long enough to be stored here.");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[joke.clone()]])
                .into_connection(),
        );

        let repo = JokeRepository::new(db);
        let result = repo.find_by_id(1).await.unwrap();

        assert_eq!(result, Some(joke));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<joke::Model>::new()])
                .into_connection(),
        );

        let repo = JokeRepository::new(db);
        let result = repo.get_by_id(999).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_with_tags() {
        let joke = create_test_joke(4, "Another joke that is long enough to keep.");
        let tag_link = joke_tag::Model {
            id: 1,
            joke_id: 4,
            tag_id: 2,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[joke.clone()]])
                .append_query_results([[tag_link]])
                .into_connection(),
        );

        let repo = JokeRepository::new(db);
        let result = repo
            .create_with_tags(
                NewJoke {
                    add_by: joke.add_by,
                    language_code: "en".to_string(),
                    content: joke.content.clone(),
                    status: joke::JokeStatus::Pending,
                },
                &[2],
            )
            .await
            .unwrap();

        assert_eq!(result.id, 4);
    }

    #[tokio::test]
    async fn test_soft_delete_already_deleted() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = JokeRepository::new(db);
        assert!(!repo.soft_delete(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_has_tag() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1))
                }]])
                .into_connection(),
        );

        let repo = JokeRepository::new(db);
        assert!(repo.has_tag(1, 1).await.unwrap());
    }
}
