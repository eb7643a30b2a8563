//! User service.

use jokebot_common::AppResult;
use jokebot_db::{entities::user, repositories::UserRepository};
use tracing::info;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Register a user seen by the bot, or refresh their username.
    pub async fn register(&self, id: i64, username: Option<String>) -> AppResult<user::Model> {
        let username = username
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let is_new = !self.user_repo.exists(id).await?;
        let user = self.user_repo.upsert(id, username).await?;
        if is_new {
            info!(user_id = id, "New user registered");
        }
        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: i64) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jokebot_common::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: i64, username: Option<&str>) -> user::Model {
        user::Model {
            id,
            username: username.map(ToString::to_string),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_register_new_user() {
        let user = create_test_user(11, Some("carol"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // exists, upsert lookup, insert
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service
            .register(11, Some("  carol ".to_string()))
            .await
            .unwrap();

        assert_eq!(result, user);
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service.get(12).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
