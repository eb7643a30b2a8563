//! Repositories for database access.

mod chat;
mod joke;
mod joke_reaction;
mod language;
mod reaction;
mod settings;
mod tag;
mod user;

pub use chat::{ChatRepository, NewChat};
pub use joke::{JokeRepository, NewJoke};
pub use joke_reaction::{JokeReactionRepository, ReactionCount, ReactionOutcome};
pub use language::LanguageRepository;
pub use reaction::ReactionRepository;
pub use settings::{SettingsDefaults, SettingsRepository};
pub use tag::TagRepository;
pub use user::UserRepository;

use sea_orm::prelude::DateTimeWithTimeZone;

/// Current time in the form stored in timestamp columns.
pub(crate) fn now() -> DateTimeWithTimeZone {
    chrono::Utc::now().into()
}
