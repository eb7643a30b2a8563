//! Chat repository.

use std::sync::Arc;

use super::now;
use super::settings::{SettingsDefaults, ensure_settings, insert_settings};
use crate::entities::{Chat, Settings, chat, settings};
use crate::error::{map_db_err, map_db_err_as};
use jokebot_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, warn};

/// Input for registering a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChat {
    pub id: i64,
    pub chat_type: chat::ChatType,
    pub username: Option<String>,
    /// Owner, for private chats
    pub user_id: Option<i64>,
}

impl NewChat {
    fn into_active_model(self) -> chat::ActiveModel {
        let now = now();
        chat::ActiveModel {
            id: Set(self.id),
            chat_type: Set(self.chat_type),
            username: Set(self.username),
            last_message_id: Set(None),
            user_id: Set(self.user_id),
            last_joke_sent_at: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

/// Chat repository for database operations.
#[derive(Clone)]
pub struct ChatRepository {
    db: Arc<DatabaseConnection>,
}

impl ChatRepository {
    /// Create a new chat repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a chat by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<chat::Model>> {
        Chat::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Get a chat by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<chat::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Chat not found: {id}")))
    }

    /// Check if a chat exists.
    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    /// Count chats.
    pub async fn count(&self) -> AppResult<u64> {
        Chat::find()
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Create a chat without settings.
    pub async fn create(&self, input: NewChat) -> AppResult<chat::Model> {
        input
            .into_active_model()
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_db_err_as(e, "chat already exists", "user not found"))
    }

    /// Create a chat together with its settings row in one transaction.
    pub async fn create_with_settings(
        &self,
        input: NewChat,
        defaults: &SettingsDefaults,
    ) -> AppResult<(chat::Model, settings::Model)> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let chat = input
            .into_active_model()
            .insert(&txn)
            .await
            .map_err(|e| map_db_err_as(e, "chat already exists", "user not found"))?;
        let settings = insert_settings(&txn, chat.id, defaults).await?;

        txn.commit().await.map_err(map_db_err)?;

        info!(chat_id = chat.id, chat_type = ?chat.chat_type, "Registered chat");
        Ok((chat, settings))
    }

    /// Apply `changes` to a known chat, if any, and make sure it has settings.
    ///
    /// Both steps share one transaction.
    pub async fn refresh_with_settings(
        &self,
        current: chat::Model,
        changes: Option<chat::ActiveModel>,
        defaults: &SettingsDefaults,
    ) -> AppResult<(chat::Model, settings::Model)> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let chat = match changes {
            Some(mut model) => {
                model.updated_at = Set(now());
                model
                    .update(&txn)
                    .await
                    .map_err(|e| map_db_err_as(e, "chat already exists", "user not found"))?
            }
            None => current,
        };
        let settings = ensure_settings(&txn, chat.id, defaults).await?;

        txn.commit().await.map_err(map_db_err)?;

        debug!(chat_id = chat.id, "Refreshed chat");
        Ok((chat, settings))
    }

    /// Update a chat, refreshing `updated_at`.
    pub async fn update(&self, mut model: chat::ActiveModel) -> AppResult<chat::Model> {
        model.updated_at = Set(now());
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| map_db_err_as(e, "chat already exists", "user not found"))
    }

    /// Record when the last joke was sent (epoch seconds).
    pub async fn update_last_joke_sent_at(&self, id: i64, sent_at: i64) -> AppResult<()> {
        let result = Chat::update_many()
            .col_expr(chat::Column::LastJokeSentAt, Expr::value(sent_at))
            .col_expr(chat::Column::UpdatedAt, Expr::value(now()))
            .filter(chat::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Chat not found: {id}")));
        }
        Ok(())
    }

    /// Record the last message the bot sent to a chat.
    pub async fn update_last_message_id(&self, id: i64, message_id: Option<i64>) -> AppResult<()> {
        let result = Chat::update_many()
            .col_expr(chat::Column::LastMessageId, Expr::value(message_id))
            .col_expr(chat::Column::UpdatedAt, Expr::value(now()))
            .filter(chat::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Chat not found: {id}")));
        }
        Ok(())
    }

    /// Delete a chat.
    ///
    /// Refused with `InvalidReference` while the chat still has settings or
    /// preferred tags.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = Chat::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| {
                let err = map_db_err_as(
                    e,
                    "chat already exists",
                    "chat is still referenced by settings or preferred tags",
                );
                warn!(chat_id = id, error = %err, "Chat delete refused");
                err
            })?;
        Ok(result.rows_affected > 0)
    }

    /// Chats with sending switched on whose next joke is due at `now` (epoch seconds).
    pub async fn find_due(&self, now: i64) -> AppResult<Vec<(chat::Model, settings::Model)>> {
        let next_due = Expr::col((chat::Entity, chat::Column::LastJokeSentAt))
            .add(Expr::col((settings::Entity, settings::Column::Schedule)));

        let rows = Chat::find()
            .find_also_related(Settings)
            .filter(settings::Column::SendingJokes.eq(settings::Switch::On))
            .filter(Expr::expr(next_due).lte(now))
            .order_by_asc(chat::Column::LastJokeSentAt)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        let due: Vec<_> = rows
            .into_iter()
            .filter_map(|(chat, settings)| settings.map(|s| (chat, s)))
            .collect();
        debug!(count = due.len(), now, "Found due chats");
        Ok(due)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_chat(id: i64) -> chat::Model {
        chat::Model {
            id,
            chat_type: chat::ChatType::Group,
            username: None,
            last_message_id: None,
            user_id: None,
            last_joke_sent_at: 0,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

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

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<chat::Model>::new()])
                .into_connection(),
        );

        let repo = ChatRepository::new(db);
        let result = repo.get_by_id(-1001).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_with_settings() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_chat(-1001)]])
                .append_query_results([[create_test_settings(-1001)]])
                .into_connection(),
        );

        let repo = ChatRepository::new(db);
        let (chat, settings) = repo
            .create_with_settings(
                NewChat {
                    id: -1001,
                    chat_type: chat::ChatType::Group,
                    username: None,
                    user_id: None,
                },
                &SettingsDefaults::default(),
            )
            .await
            .unwrap();

        assert_eq!(chat.id, -1001);
        assert_eq!(settings.chat_id, chat.id);
    }

    #[tokio::test]
    async fn test_update_last_joke_sent_at_missing_chat() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ChatRepository::new(db);
        let result = repo.update_last_joke_sent_at(42, 1_700_000_000).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(3))
                }]])
                .into_connection(),
        );

        let repo = ChatRepository::new(db);
        assert_eq!(repo.count().await.unwrap(), 3);
    }
}
