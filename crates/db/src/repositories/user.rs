//! User repository.

use std::sync::Arc;

use super::now;
use crate::entities::{Joke, User, joke, user};
use crate::error::{map_db_err, map_db_err_as};
use jokebot_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Get a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {id}")))
    }

    /// Check if a user exists.
    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    /// Create a new user with an externally assigned ID.
    pub async fn create(&self, id: i64, username: Option<String>) -> AppResult<user::Model> {
        let now = now();
        let model = user::ActiveModel {
            id: Set(id),
            username: Set(username),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_db_err_as(e, "user already exists", "user not found"))
    }

    /// Insert the user, or refresh the username of an existing one.
    pub async fn upsert(&self, id: i64, username: Option<String>) -> AppResult<user::Model> {
        match self.find_by_id(id).await? {
            Some(existing) if existing.username == username => Ok(existing),
            Some(existing) => {
                let mut model: user::ActiveModel = existing.into();
                model.username = Set(username);
                model.updated_at = Set(now());
                let updated = model.update(self.db.as_ref()).await.map_err(map_db_err)?;
                debug!(user_id = id, "Refreshed username");
                Ok(updated)
            }
            None => {
                let created = self.create(id, username).await?;
                debug!(user_id = id, "Registered user");
                Ok(created)
            }
        }
    }

    /// Get the jokes a user submitted, newest first, optionally filtered by status.
    ///
    /// Soft-deleted jokes are left out.
    pub async fn find_jokes(
        &self,
        user_id: i64,
        status: Option<joke::JokeStatus>,
    ) -> AppResult<Vec<joke::Model>> {
        let mut query = Joke::find()
            .filter(joke::Column::AddBy.eq(user_id))
            .filter(joke::Column::DeletedAt.is_null())
            .order_by_desc(joke::Column::Id);

        if let Some(status) = status {
            query = query.filter(joke::Column::Status.eq(status));
        }

        query.all(self.db.as_ref()).await.map_err(map_db_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_user(id: i64, username: Option<&str>) -> user::Model {
        user::Model {
            id,
            username: username.map(ToString::to_string),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let user = create_test_user(6_038_394_083, Some("alice"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_id(6_038_394_083).await.unwrap();

        assert_eq!(result.unwrap().username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id(42).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_user() {
        let user = create_test_user(7, Some("bob"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.create(7, Some("bob".to_string())).await.unwrap();

        assert_eq!(result.id, 7);
    }

    #[tokio::test]
    async fn test_upsert_unchanged_user_does_not_write() {
        let user = create_test_user(7, Some("bob"));

        // Only the lookup is queued; a write would exhaust the mock.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.upsert(7, Some("bob".to_string())).await.unwrap();

        assert_eq!(result, user);
    }

    #[tokio::test]
    async fn test_upsert_refreshes_username() {
        let user = create_test_user(7, Some("bob"));
        let renamed = create_test_user(7, Some("robert"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .append_query_results([[renamed]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.upsert(7, Some("robert".to_string())).await.unwrap();

        assert_eq!(result.username.as_deref(), Some("robert"));
    }
}
