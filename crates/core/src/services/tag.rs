//! Tag service.

use jokebot_common::{AppError, AppResult};
use jokebot_db::{entities::tag, repositories::TagRepository};
use tracing::info;

/// Longest tag name, in characters.
const MAX_TAG_NAME_LENGTH: usize = 64;

/// Tag service for business logic.
#[derive(Clone)]
pub struct TagService {
    tag_repo: TagRepository,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub const fn new(tag_repo: TagRepository) -> Self {
        Self { tag_repo }
    }

    fn normalize_name(name: &str) -> AppResult<String> {
        let name = name.trim();
        let length = name.chars().count();
        if length == 0 || length > MAX_TAG_NAME_LENGTH {
            return Err(AppError::Validation(format!(
                "Tag name must be between 1 and {MAX_TAG_NAME_LENGTH} characters"
            )));
        }
        Ok(name.to_string())
    }

    /// Create a tag.
    pub async fn create(&self, name: &str, created_by: Option<i64>) -> AppResult<tag::Model> {
        let name = Self::normalize_name(name)?;
        let tag = self.tag_repo.create(&name, created_by).await?;
        info!(tag_id = tag.id, name = %tag.name, "Tag created");
        Ok(tag)
    }

    /// List all tags ordered by name.
    pub async fn list(&self) -> AppResult<Vec<tag::Model>> {
        self.tag_repo.find_all().await
    }

    /// Get a tag by ID.
    pub async fn get(&self, id: i32) -> AppResult<tag::Model> {
        self.tag_repo.get_by_id(id).await
    }

    /// Rename a tag.
    pub async fn rename(&self, id: i32, name: &str) -> AppResult<tag::Model> {
        let name = Self::normalize_name(name)?;
        self.tag_repo.rename(id, &name).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[test]
    fn test_normalize_name() {
        assert_eq!(TagService::normalize_name("  Puns ").unwrap(), "Puns");
        assert!(TagService::normalize_name("   ").is_err());
        assert!(TagService::normalize_name(&"x".repeat(65)).is_err());
        assert!(TagService::normalize_name(&"x".repeat(64)).is_ok());
    }

    #[tokio::test]
    async fn test_create_trims_name() {
        let tag = tag::Model {
            id: 3,
            name: "Programming".to_string(),
            created_by: Some(1),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[tag.clone()]])
                .into_connection(),
        );

        let service = TagService::new(TagRepository::new(db));
        let result = service.create(" Programming ", Some(1)).await.unwrap();

        assert_eq!(result, tag);
    }
}
