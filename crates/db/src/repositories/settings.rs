//! Settings repository (per-chat delivery settings and preferred tags).

use std::sync::Arc;

use super::now;
use crate::entities::{PreferredTag, Settings, Tag, preferred_tag, settings, tag};
use crate::error::{map_db_err, map_db_err_as};
use jokebot_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

/// Values a settings row starts from, and returns to on reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDefaults {
    pub preferred_language: String,
    pub schedule: i32,
    pub sending_jokes: settings::Switch,
    pub delete_last_joke: settings::YesNo,
}

impl Default for SettingsDefaults {
    fn default() -> Self {
        Self {
            preferred_language: "en".to_string(),
            schedule: 600,
            sending_jokes: settings::Switch::Off,
            delete_last_joke: settings::YesNo::Yes,
        }
    }
}

fn default_row(chat_id: i64, defaults: &SettingsDefaults) -> settings::ActiveModel {
    settings::ActiveModel {
        chat_id: Set(chat_id),
        preferred_language: Set(defaults.preferred_language.clone()),
        schedule: Set(defaults.schedule),
        sending_jokes: Set(defaults.sending_jokes),
        delete_last_joke: Set(defaults.delete_last_joke),
        ..Default::default()
    }
}

/// Insert a settings row for `chat_id` on any connection or transaction.
pub(crate) async fn insert_settings<C: ConnectionTrait>(
    conn: &C,
    chat_id: i64,
    defaults: &SettingsDefaults,
) -> AppResult<settings::Model> {
    default_row(chat_id, defaults).insert(conn).await.map_err(|e| {
        map_db_err_as(
            e,
            "chat already has settings",
            "chat or language not found",
        )
    })
}

async fn find_settings<C: ConnectionTrait>(
    conn: &C,
    chat_id: i64,
) -> AppResult<Option<settings::Model>> {
    Settings::find()
        .filter(settings::Column::ChatId.eq(chat_id))
        .one(conn)
        .await
        .map_err(map_db_err)
}

/// Return the settings of `chat_id`, inserting `defaults` when there are none.
///
/// The insert ignores a row committed concurrently for the same chat, and the
/// row is read back afterwards, so racing callers all get the stored settings.
pub(crate) async fn ensure_settings<C: ConnectionTrait>(
    conn: &C,
    chat_id: i64,
    defaults: &SettingsDefaults,
) -> AppResult<settings::Model> {
    if let Some(existing) = find_settings(conn, chat_id).await? {
        return Ok(existing);
    }

    let inserted = Settings::insert(default_row(chat_id, defaults))
        .on_conflict(
            OnConflict::column(settings::Column::ChatId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .map_err(|e| {
            map_db_err_as(
                e,
                "chat already has settings",
                "chat or language not found",
            )
        })?;
    if inserted == 0 {
        debug!(chat_id, "Settings were created concurrently");
    }

    find_settings(conn, chat_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Settings not found for chat: {chat_id}")))
}

/// Settings repository for database operations.
#[derive(Clone)]
pub struct SettingsRepository {
    db: Arc<DatabaseConnection>,
}

impl SettingsRepository {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the settings of a chat.
    pub async fn find_by_chat(&self, chat_id: i64) -> AppResult<Option<settings::Model>> {
        find_settings(self.db.as_ref(), chat_id).await
    }

    /// Get the settings of a chat, returning an error if there are none.
    pub async fn get_by_chat(&self, chat_id: i64) -> AppResult<settings::Model> {
        self.find_by_chat(chat_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Settings not found for chat: {chat_id}")))
    }

    /// Create the settings row of a chat.
    ///
    /// A chat has at most one settings row; a second one is rejected with
    /// `Conflict("chat already has settings")`.
    pub async fn create(
        &self,
        chat_id: i64,
        defaults: &SettingsDefaults,
    ) -> AppResult<settings::Model> {
        let created = insert_settings(self.db.as_ref(), chat_id, defaults).await?;
        debug!(chat_id, "Created settings");
        Ok(created)
    }

    /// Return the settings of a chat, creating them from `defaults` if missing.
    pub async fn get_or_create(
        &self,
        chat_id: i64,
        defaults: &SettingsDefaults,
    ) -> AppResult<settings::Model> {
        ensure_settings(self.db.as_ref(), chat_id, defaults).await
    }

    /// Update a settings row.
    pub async fn update(&self, model: settings::ActiveModel) -> AppResult<settings::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| map_db_err_as(e, "chat already has settings", "language not found"))
    }

    /// Put the settings of a chat back to `defaults` and forget its preferred tags.
    pub async fn reset(
        &self,
        chat_id: i64,
        defaults: &SettingsDefaults,
    ) -> AppResult<settings::Model> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let result = Settings::update_many()
            .col_expr(
                settings::Column::PreferredLanguage,
                Expr::value(defaults.preferred_language.clone()),
            )
            .col_expr(settings::Column::Schedule, Expr::value(defaults.schedule))
            .col_expr(
                settings::Column::SendingJokes,
                Expr::value(defaults.sending_jokes),
            )
            .col_expr(
                settings::Column::DeleteLastJoke,
                Expr::value(defaults.delete_last_joke),
            )
            .filter(settings::Column::ChatId.eq(chat_id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "Settings not found for chat: {chat_id}"
            )));
        }

        PreferredTag::delete_many()
            .filter(preferred_tag::Column::ChatId.eq(chat_id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        let reset = Settings::find()
            .filter(settings::Column::ChatId.eq(chat_id))
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Settings not found for chat: {chat_id}")))?;

        txn.commit().await.map_err(map_db_err)?;

        info!(chat_id, "Reset settings to defaults");
        Ok(reset)
    }

    /// Delete the settings row of a chat.
    pub async fn delete(&self, chat_id: i64) -> AppResult<bool> {
        let result = Settings::delete_many()
            .filter(settings::Column::ChatId.eq(chat_id))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    // === Preferred tags ===

    /// Tags a chat prefers, ordered by name.
    pub async fn preferred_tags(&self, chat_id: i64) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .inner_join(PreferredTag)
            .filter(preferred_tag::Column::ChatId.eq(chat_id))
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// IDs of the tags a chat prefers.
    pub async fn preferred_tag_ids(&self, chat_id: i64) -> AppResult<Vec<i32>> {
        PreferredTag::find()
            .select_only()
            .column(preferred_tag::Column::TagId)
            .filter(preferred_tag::Column::ChatId.eq(chat_id))
            .order_by_asc(preferred_tag::Column::TagId)
            .into_tuple::<i32>()
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Add a preferred tag to a chat.
    pub async fn add_preferred_tag(
        &self,
        chat_id: i64,
        tag_id: i32,
    ) -> AppResult<preferred_tag::Model> {
        let now = now();
        let model = preferred_tag::ActiveModel {
            chat_id: Set(chat_id),
            tag_id: Set(tag_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = model.insert(self.db.as_ref()).await.map_err(|e| {
            map_db_err_as(e, "tag is already preferred", "chat or tag not found")
        })?;
        debug!(chat_id, tag_id, "Added preferred tag");
        Ok(created)
    }

    /// Remove a preferred tag from a chat. Returns whether a row was removed.
    pub async fn remove_preferred_tag(&self, chat_id: i64, tag_id: i32) -> AppResult<bool> {
        let result = PreferredTag::delete_many()
            .filter(preferred_tag::Column::ChatId.eq(chat_id))
            .filter(preferred_tag::Column::TagId.eq(tag_id))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    /// Remove every preferred tag of a chat.
    pub async fn clear_preferred_tags(&self, chat_id: i64) -> AppResult<u64> {
        let result = PreferredTag::delete_many()
            .filter(preferred_tag::Column::ChatId.eq(chat_id))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_settings(chat_id: i64) -> settings::Model {
        settings::Model {
            id: 1,
            chat_id,
            preferred_language: "en".to_string(),
            schedule: 600,
            sending_jokes: settings::Switch::Off,
            delete_last_joke: settings::YesNo::Yes,
        }
    }

    #[test]
    fn test_defaults() {
        let defaults = SettingsDefaults::default();
        assert_eq!(defaults.preferred_language, "en");
        assert_eq!(defaults.schedule, 600);
        assert_eq!(defaults.sending_jokes, settings::Switch::Off);
        assert_eq!(defaults.delete_last_joke, settings::YesNo::Yes);
    }

    #[tokio::test]
    async fn test_find_by_chat() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_settings(-100)]])
                .into_connection(),
        );

        let repo = SettingsRepository::new(db);
        let result = repo.find_by_chat(-100).await.unwrap().unwrap();

        assert_eq!(result.chat_id, -100);
        assert_eq!(result.schedule, 600);
    }

    #[tokio::test]
    async fn test_get_or_create_returns_existing() {
        let existing = create_test_settings(5);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing.clone()]])
                .into_connection(),
        );

        let repo = SettingsRepository::new(db);
        let result = repo
            .get_or_create(5, &SettingsDefaults::default())
            .await
            .unwrap();

        assert_eq!(result, existing);
    }

    #[tokio::test]
    async fn test_get_or_create_inserts_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<settings::Model>::new()])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([[create_test_settings(5)]])
                .into_connection(),
        );

        let repo = SettingsRepository::new(db);
        let result = repo
            .get_or_create(5, &SettingsDefaults::default())
            .await
            .unwrap();

        assert_eq!(result.chat_id, 5);
    }

    #[tokio::test]
    async fn test_get_or_create_returns_row_inserted_concurrently() {
        let mut stored = create_test_settings(5);
        stored.schedule = 1_800;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<settings::Model>::new()])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .append_query_results([[stored.clone()]])
                .into_connection(),
        );

        let repo = SettingsRepository::new(db);
        let result = repo
            .get_or_create(5, &SettingsDefaults::default())
            .await
            .unwrap();

        assert_eq!(result, stored);
    }

    #[tokio::test]
    async fn test_reset_missing_settings() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = SettingsRepository::new(db);
        let result = repo.reset(9, &SettingsDefaults::default()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_preferred_tag() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = SettingsRepository::new(db);
        assert!(repo.remove_preferred_tag(5, 2).await.unwrap());
    }
}
