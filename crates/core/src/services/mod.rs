//! Business logic services.

#![allow(missing_docs)]

pub mod chat;
pub mod joke;
pub mod reaction;
pub mod tag;
pub mod user;

pub use chat::{ChatService, RegisterChatInput};
pub use joke::{EditJokeInput, JokeDetails, JokeService, SubmitJokeInput};
pub use reaction::ReactionService;
pub use tag::TagService;
pub use user::UserService;

use std::sync::Arc;

use jokebot_common::Config;
use jokebot_db::repositories::{
    ChatRepository, JokeReactionRepository, JokeRepository, LanguageRepository,
    ReactionRepository, SettingsRepository, TagRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

/// Every service, wired to one connection pool.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub chats: ChatService,
    pub jokes: JokeService,
    pub tags: TagService,
    pub reactions: ReactionService,
}

impl Services {
    /// Build all services from a connection and the application configuration.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let chat_repo = ChatRepository::new(Arc::clone(&db));
        let settings_repo = SettingsRepository::new(Arc::clone(&db));
        let language_repo = LanguageRepository::new(Arc::clone(&db));
        let tag_repo = TagRepository::new(Arc::clone(&db));
        let joke_repo = JokeRepository::new(Arc::clone(&db));
        let reaction_repo = ReactionRepository::new(Arc::clone(&db));
        let joke_reaction_repo = JokeReactionRepository::new(db);

        Self {
            users: UserService::new(user_repo.clone()),
            chats: ChatService::new(
                chat_repo,
                settings_repo.clone(),
                language_repo.clone(),
                tag_repo.clone(),
            )
            .with_config(config),
            jokes: JokeService::new(
                joke_repo.clone(),
                user_repo,
                language_repo,
                settings_repo,
                joke_reaction_repo.clone(),
            )
            .with_config(config),
            tags: TagService::new(tag_repo),
            reactions: ReactionService::new(joke_reaction_repo, reaction_repo, joke_repo),
        }
    }
}
