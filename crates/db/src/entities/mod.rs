//! Database entities.

pub mod chat;
pub mod joke;
pub mod joke_reaction;
pub mod joke_tag;
pub mod language;
pub mod preferred_tag;
pub mod reaction;
pub mod settings;
pub mod tag;
pub mod user;

pub use chat::Entity as Chat;
pub use joke::Entity as Joke;
pub use joke_reaction::Entity as JokeReaction;
pub use joke_tag::Entity as JokeTag;
pub use language::Entity as Language;
pub use preferred_tag::Entity as PreferredTag;
pub use reaction::Entity as Reaction;
pub use settings::Entity as Settings;
pub use tag::Entity as Tag;
pub use user::Entity as User;
