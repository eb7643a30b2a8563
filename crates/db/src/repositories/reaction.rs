//! Reaction catalog repository.

use std::sync::Arc;

use crate::entities::{Reaction, reaction};
use crate::error::map_db_err;
use jokebot_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Reaction repository for database operations.
#[derive(Clone)]
pub struct ReactionRepository {
    db: Arc<DatabaseConnection>,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The whole catalog, highest id first (laughing, thinking, dislike).
    pub async fn find_all(&self) -> AppResult<Vec<reaction::Model>> {
        Reaction::find()
            .order_by_desc(reaction::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Find a reaction by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<reaction::Model>> {
        Reaction::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Get a reaction by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<reaction::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reaction not found: {id}")))
    }

    /// Find a reaction by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<reaction::Model>> {
        Reaction::find()
            .filter(reaction::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_reaction(id: i32, name: &str, emoji: &str) -> reaction::Model {
        reaction::Model {
            id,
            name: name.to_string(),
            emoji: emoji.to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_all() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_reaction(1, "laughing", "😂"),
                    create_test_reaction(0, "thinking", "🤔"),
                    create_test_reaction(-1, "dislike", "👎"),
                ]])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let result = repo.find_all().await.unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result[2].id, -1);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<reaction::Model>::new()])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let result = repo.get_by_id(7).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_reaction(0, "thinking", "🤔")]])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let result = repo.find_by_name("thinking").await.unwrap().unwrap();

        assert_eq!(result.id, 0);
    }
}
