//! Joke service: submission, editing, publication and selection.

use jokebot_common::{AppError, AppResult, Config};
use jokebot_db::entities::{joke, language, tag, user};
use jokebot_db::repositories::{
    JokeReactionRepository, JokeRepository, LanguageRepository, NewJoke, ReactionCount,
    SettingsRepository, UserRepository,
};
use rand::seq::SliceRandom;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

/// Input for submitting a joke.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitJokeInput {
    #[validate(length(max = 4096))]
    pub content: String,
    /// Falls back to the configured default language
    #[validate(length(min = 2, max = 8))]
    pub language_code: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<i32>,
}

/// Changes to an existing joke. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EditJokeInput {
    #[validate(length(max = 4096))]
    pub content: Option<String>,
    #[validate(length(min = 2, max = 8))]
    pub language_code: Option<String>,
    pub tag_ids: Option<Vec<i32>>,
}

/// A joke with everything needed to display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JokeDetails {
    pub joke: joke::Model,
    pub author: user::Model,
    pub language: language::Model,
    pub tags: Vec<tag::Model>,
    pub reactions: Vec<ReactionCount>,
}

/// Joke service for business logic.
#[derive(Clone)]
pub struct JokeService {
    joke_repo: JokeRepository,
    user_repo: UserRepository,
    language_repo: LanguageRepository,
    settings_repo: SettingsRepository,
    joke_reaction_repo: JokeReactionRepository,
    min_content_length: usize,
    default_language: String,
}

impl JokeService {
    /// Create a new joke service with the built-in rules.
    #[must_use]
    pub fn new(
        joke_repo: JokeRepository,
        user_repo: UserRepository,
        language_repo: LanguageRepository,
        settings_repo: SettingsRepository,
        joke_reaction_repo: JokeReactionRepository,
    ) -> Self {
        Self {
            joke_repo,
            user_repo,
            language_repo,
            settings_repo,
            joke_reaction_repo,
            min_content_length: 30,
            default_language: "en".to_string(),
        }
    }

    /// Take the submission rules from the configuration.
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.min_content_length = config.jokes.min_content_length;
        self.default_language = config.jokes.default_language.clone();
        self
    }

    fn check_content(&self, content: &str) -> AppResult<String> {
        let content = content.trim();
        if content.chars().count() < self.min_content_length {
            return Err(AppError::Validation(format!(
                "Joke must be at least {} characters long",
                self.min_content_length
            )));
        }
        Ok(content.to_string())
    }

    async fn get_own(&self, joke_id: i32, author: i64) -> AppResult<joke::Model> {
        let joke = self.joke_repo.get_by_id(joke_id).await?;
        if joke.add_by != author {
            return Err(AppError::Forbidden("Not the author of this joke".to_string()));
        }
        Ok(joke)
    }

    /// Submit a joke for publication, together with its tags.
    pub async fn submit(&self, author: i64, input: SubmitJokeInput) -> AppResult<joke::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let content = self.check_content(&input.content)?;
        let language_code = input
            .language_code
            .unwrap_or_else(|| self.default_language.clone());
        self.language_repo.get_by_code(&language_code).await?;

        let mut tag_ids = input.tag_ids;
        tag_ids.sort_unstable();
        tag_ids.dedup();

        let joke = self
            .joke_repo
            .create_with_tags(
                NewJoke {
                    add_by: author,
                    language_code,
                    content,
                    status: joke::JokeStatus::Pending,
                },
                &tag_ids,
            )
            .await?;

        info!(joke_id = joke.id, author, "Joke submitted");
        Ok(joke)
    }

    /// Edit a joke. Only its author may do so.
    pub async fn edit(
        &self,
        joke_id: i32,
        author: i64,
        input: EditJokeInput,
    ) -> AppResult<joke::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let current = self.get_own(joke_id, author).await?;
        let mut model: joke::ActiveModel = current.clone().into();
        let mut changed = false;

        if let Some(content) = input.content {
            model.content = Set(self.check_content(&content)?);
            changed = true;
        }
        if let Some(code) = input.language_code {
            let language = self.language_repo.get_by_code(&code).await?;
            model.language_code = Set(language.code);
            changed = true;
        }

        let tag_ids = input.tag_ids.map(|mut ids| {
            ids.sort_unstable();
            ids.dedup();
            ids
        });

        if !changed && tag_ids.is_none() {
            return Ok(current);
        }

        let updated = self
            .joke_repo
            .update_with_tags(changed.then_some(model), joke_id, tag_ids.as_deref())
            .await?;

        debug!(joke_id, author, "Joke edited");
        Ok(updated)
    }

    /// Move a joke between pending and published.
    pub async fn toggle_published(&self, joke_id: i32, author: i64) -> AppResult<joke::Model> {
        let joke = self.get_own(joke_id, author).await?;
        let next = match joke.status {
            joke::JokeStatus::Published => joke::JokeStatus::Pending,
            joke::JokeStatus::Draft | joke::JokeStatus::Pending => joke::JokeStatus::Published,
            joke::JokeStatus::Archived => {
                return Err(AppError::Validation(
                    "Archived jokes cannot be published".to_string(),
                ));
            }
        };
        self.joke_repo.set_status(joke_id, next).await
    }

    /// Withdraw a joke from delivery.
    pub async fn archive(&self, joke_id: i32, author: i64) -> AppResult<joke::Model> {
        self.get_own(joke_id, author).await?;
        self.joke_repo
            .set_status(joke_id, joke::JokeStatus::Archived)
            .await
    }

    /// Soft-delete a joke.
    pub async fn delete(&self, joke_id: i32, author: i64) -> AppResult<()> {
        self.get_own(joke_id, author).await?;
        if !self.joke_repo.soft_delete(joke_id).await? {
            return Err(AppError::NotFound(format!("Joke not found: {joke_id}")));
        }
        info!(joke_id, author, "Joke deleted");
        Ok(())
    }

    /// Bring back a soft-deleted joke.
    pub async fn restore(&self, joke_id: i32, author: i64) -> AppResult<joke::Model> {
        let joke = self
            .joke_repo
            .find_by_id_with_deleted(joke_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Joke not found: {joke_id}")))?;
        if joke.add_by != author {
            return Err(AppError::Forbidden("Not the author of this joke".to_string()));
        }
        if !self.joke_repo.restore(joke_id).await? {
            return Err(AppError::Validation(format!("Joke {joke_id} is not deleted")));
        }
        self.joke_repo.get_by_id(joke_id).await
    }

    /// The jokes a user submitted, newest first.
    pub async fn my_jokes(
        &self,
        author: i64,
        status: Option<joke::JokeStatus>,
    ) -> AppResult<Vec<joke::Model>> {
        self.user_repo.find_jokes(author, status).await
    }

    /// IDs of the published jokes a chat may receive.
    ///
    /// Jokes are in the chat's preferred language and, when the chat has
    /// preferred tags, carry at least one of them.
    pub async fn candidates_for_chat(&self, chat_id: i64) -> AppResult<Vec<i32>> {
        let language = match self.settings_repo.find_by_chat(chat_id).await? {
            Some(settings) => settings.preferred_language,
            None => self.default_language.clone(),
        };
        let tag_ids = self.settings_repo.preferred_tag_ids(chat_id).await?;

        self.joke_repo
            .candidate_ids(&language, joke::JokeStatus::Published, &tag_ids)
            .await
    }

    /// Pick a random joke for a chat, if any matches its preferences.
    pub async fn random_for_chat(&self, chat_id: i64) -> AppResult<Option<joke::Model>> {
        let candidates = self.candidates_for_chat(chat_id).await?;
        let Some(joke_id) = candidates.choose(&mut rand::thread_rng()).copied() else {
            debug!(chat_id, "No joke matches the chat preferences");
            return Ok(None);
        };
        self.joke_repo.find_by_id(joke_id).await
    }

    /// Load a joke with its author, language, tags and reaction counts.
    pub async fn load(&self, joke_id: i32) -> AppResult<JokeDetails> {
        let joke = self.joke_repo.get_by_id(joke_id).await?;
        let author = self.user_repo.get_by_id(joke.add_by).await?;
        let language = self.language_repo.get_by_code(&joke.language_code).await?;
        let tags = self.joke_repo.tags(joke_id).await?;
        let reactions = self.joke_reaction_repo.counts_for_joke(joke_id).await?;

        Ok(JokeDetails {
            joke,
            author,
            language,
            tags,
            reactions,
        })
    }
}
