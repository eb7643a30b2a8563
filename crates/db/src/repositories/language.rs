//! Language repository.

use std::sync::Arc;

use crate::entities::{Language, language};
use crate::error::{map_db_err, map_db_err_as};
use jokebot_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect,
    Set,
};

/// Language repository for database operations.
#[derive(Clone)]
pub struct LanguageRepository {
    db: Arc<DatabaseConnection>,
}

impl LanguageRepository {
    /// Create a new language repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a language by its code.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<language::Model>> {
        Language::find_by_id(code)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Get a language by its code, returning an error if not found.
    pub async fn get_by_code(&self, code: &str) -> AppResult<language::Model> {
        self.find_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Language not found: {code}")))
    }

    /// Check if a language exists.
    pub async fn exists(&self, code: &str) -> AppResult<bool> {
        Ok(self.find_by_code(code).await?.is_some())
    }

    /// List all languages ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<language::Model>> {
        Language::find()
            .order_by_asc(language::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// List languages ordered by name (paginated).
    pub async fn find_page(&self, limit: u64, offset: u64) -> AppResult<Vec<language::Model>> {
        Language::find()
            .order_by_asc(language::Column::Name)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Count languages.
    pub async fn count(&self) -> AppResult<u64> {
        Language::find()
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Add a language to the catalog.
    pub async fn create(&self, code: &str, name: &str) -> AppResult<language::Model> {
        let model = language::ActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_db_err_as(e, "language already exists", "language not found"))
    }

    /// Rename a language.
    pub async fn rename(&self, code: &str, name: &str) -> AppResult<language::Model> {
        let mut model: language::ActiveModel = self.get_by_code(code).await?.into();
        model.name = Set(name.to_string());
        model.update(self.db.as_ref()).await.map_err(map_db_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_language(code: &str, name: &str) -> language::Model {
        language::Model {
            code: code.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_by_code_found() {
        let lang = create_test_language("en", "English");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[lang.clone()]])
                .into_connection(),
        );

        let repo = LanguageRepository::new(db);
        let result = repo.find_by_code("en").await.unwrap();

        assert_eq!(result, Some(lang));
    }

    #[tokio::test]
    async fn test_get_by_code_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<language::Model>::new()])
                .into_connection(),
        );

        let repo = LanguageRepository::new(db);
        let result = repo.get_by_code("xx").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_all() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_language("en", "English"),
                    create_test_language("fr", "French"),
                ]])
                .into_connection(),
        );

        let repo = LanguageRepository::new(db);
        let result = repo.find_all().await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].code, "fr");
    }

    #[tokio::test]
    async fn test_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(12))
                }]])
                .into_connection(),
        );

        let repo = LanguageRepository::new(db);
        assert_eq!(repo.count().await.unwrap(), 12);
    }
}
