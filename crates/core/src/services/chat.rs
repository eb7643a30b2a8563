//! Chat service: registration and per-chat delivery settings.

use jokebot_common::{AppError, AppResult, Config};
use jokebot_db::entities::{chat, settings, tag};
use jokebot_db::repositories::{
    ChatRepository, LanguageRepository, NewChat, SettingsDefaults, SettingsRepository,
    TagRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

/// Input for registering a chat.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterChatInput {
    pub id: i64,
    pub chat_type: chat::ChatType,
    #[validate(length(max = 64))]
    pub username: Option<String>,
    /// Owner, for private chats
    pub user_id: Option<i64>,
}

/// Chat service for business logic.
#[derive(Clone)]
pub struct ChatService {
    chat_repo: ChatRepository,
    settings_repo: SettingsRepository,
    language_repo: LanguageRepository,
    tag_repo: TagRepository,
    defaults: SettingsDefaults,
    min_schedule: i32,
    max_schedule: i32,
}

impl ChatService {
    /// Create a new chat service with the built-in defaults.
    #[must_use]
    pub fn new(
        chat_repo: ChatRepository,
        settings_repo: SettingsRepository,
        language_repo: LanguageRepository,
        tag_repo: TagRepository,
    ) -> Self {
        Self {
            chat_repo,
            settings_repo,
            language_repo,
            tag_repo,
            defaults: SettingsDefaults::default(),
            min_schedule: 60,
            max_schedule: 86_400,
        }
    }

    /// Take defaults and schedule limits from the configuration.
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.defaults.preferred_language = config.jokes.default_language.clone();
        self.defaults.schedule = config.chats.default_schedule;
        self.min_schedule = config.chats.min_schedule;
        self.max_schedule = config.chats.max_schedule;
        self
    }

    /// Settings a new chat starts with.
    #[must_use]
    pub const fn defaults(&self) -> &SettingsDefaults {
        &self.defaults
    }

    /// Register a chat together with its settings.
    ///
    /// A known chat gets its type, username and owner refreshed, and its
    /// settings created if they are missing.
    pub async fn register(
        &self,
        input: RegisterChatInput,
    ) -> AppResult<(chat::Model, settings::Model)> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let Some(existing) = self.chat_repo.find_by_id(input.id).await? else {
            return self
                .chat_repo
                .create_with_settings(
                    NewChat {
                        id: input.id,
                        chat_type: input.chat_type,
                        username: input.username,
                        user_id: input.user_id,
                    },
                    &self.defaults,
                )
                .await;
        };

        let changes = if existing.chat_type == input.chat_type
            && existing.username == input.username
            && existing.user_id == input.user_id
        {
            None
        } else {
            let mut model: chat::ActiveModel = existing.clone().into();
            model.chat_type = Set(input.chat_type);
            model.username = Set(input.username);
            model.user_id = Set(input.user_id);
            Some(model)
        };

        self.chat_repo
            .refresh_with_settings(existing, changes, &self.defaults)
            .await
    }

    /// Get the settings of a chat, creating the defaults if they are missing.
    pub async fn settings(&self, chat_id: i64) -> AppResult<settings::Model> {
        self.chat_repo.get_by_id(chat_id).await?;
        self.settings_repo
            .get_or_create(chat_id, &self.defaults)
            .await
    }

    /// Switch automatic delivery on or off.
    pub async fn set_sending_jokes(
        &self,
        chat_id: i64,
        value: settings::Switch,
    ) -> AppResult<settings::Model> {
        let mut model: settings::ActiveModel = self.settings(chat_id).await?.into();
        model.sending_jokes = Set(value);
        let updated = self.settings_repo.update(model).await?;
        info!(chat_id, sending_jokes = ?value, "Changed joke delivery");
        Ok(updated)
    }

    /// Flip automatic delivery.
    pub async fn toggle_sending_jokes(&self, chat_id: i64) -> AppResult<settings::Model> {
        let current = self.settings(chat_id).await?;
        self.set_sending_jokes(chat_id, current.sending_jokes.toggled())
            .await
    }

    /// Set the number of seconds between two jokes.
    pub async fn set_schedule(&self, chat_id: i64, seconds: i32) -> AppResult<settings::Model> {
        if !(self.min_schedule..=self.max_schedule).contains(&seconds) {
            return Err(AppError::Validation(format!(
                "Schedule must be between {} and {} seconds",
                self.min_schedule, self.max_schedule
            )));
        }

        let mut model: settings::ActiveModel = self.settings(chat_id).await?.into();
        model.schedule = Set(seconds);
        self.settings_repo.update(model).await
    }

    /// Flip whether the previous joke is removed when a new one is sent.
    pub async fn toggle_delete_last_joke(&self, chat_id: i64) -> AppResult<settings::Model> {
        let current = self.settings(chat_id).await?;
        let next = current.delete_last_joke.toggled();
        let mut model: settings::ActiveModel = current.into();
        model.delete_last_joke = Set(next);
        self.settings_repo.update(model).await
    }

    /// Choose the language jokes are drawn from.
    pub async fn set_preferred_language(
        &self,
        chat_id: i64,
        code: &str,
    ) -> AppResult<settings::Model> {
        let language = self.language_repo.get_by_code(code).await?;

        let mut model: settings::ActiveModel = self.settings(chat_id).await?.into();
        model.preferred_language = Set(language.code);
        self.settings_repo.update(model).await
    }

    /// Tags a chat restricts its jokes to.
    pub async fn preferred_tags(&self, chat_id: i64) -> AppResult<Vec<tag::Model>> {
        self.settings_repo.preferred_tags(chat_id).await
    }

    /// Add a tag to the chat's preferences.
    pub async fn add_preferred_tag(&self, chat_id: i64, tag_id: i32) -> AppResult<()> {
        self.chat_repo.get_by_id(chat_id).await?;
        self.tag_repo.get_by_id(tag_id).await?;
        self.settings_repo.add_preferred_tag(chat_id, tag_id).await?;
        Ok(())
    }

    /// Remove a tag from the chat's preferences.
    pub async fn remove_preferred_tag(&self, chat_id: i64, tag_id: i32) -> AppResult<()> {
        if !self
            .settings_repo
            .remove_preferred_tag(chat_id, tag_id)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "Tag {tag_id} is not preferred by chat {chat_id}"
            )));
        }
        Ok(())
    }

    /// Put every setting back to its default and forget the preferred tags.
    pub async fn reset_settings(&self, chat_id: i64) -> AppResult<settings::Model> {
        self.settings(chat_id).await?;
        self.settings_repo.reset(chat_id, &self.defaults).await
    }

    /// Chats whose next joke is due at `now` (epoch seconds).
    pub async fn due_chats(&self, now: i64) -> AppResult<Vec<(chat::Model, settings::Model)>> {
        self.chat_repo.find_due(now).await
    }

    /// Record a delivered joke.
    pub async fn mark_joke_sent(
        &self,
        chat_id: i64,
        now: i64,
        message_id: Option<i64>,
    ) -> AppResult<()> {
        self.chat_repo.update_last_joke_sent_at(chat_id, now).await?;
        self.chat_repo
            .update_last_message_id(chat_id, message_id)
            .await?;
        debug!(chat_id, sent_at = now, "Recorded delivered joke");
        Ok(())
    }
}
