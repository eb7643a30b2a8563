//! Raw schema creation and removal.
//!
//! Unlike [`crate::migrate`], these do not consult the migration history:
//! [`create`] fails with [`AppError::DuplicateObject`] when the tables are
//! already there, and [`drop`] removes every table child-first.

use crate::entities::{
    Chat, Joke, JokeReaction, JokeTag, Language, PreferredTag, Reaction, Settings, Tag, User,
};
use crate::error::map_db_err;
use crate::migrations::Migrator;
use jokebot_common::{AppError, AppResult};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use sea_orm_migration::prelude::*;
use tracing::{debug, info};

/// Tables in the order they are dropped (children before parents).
pub const DROP_ORDER: [&str; 10] = [
    "joke_reactions",
    "joke_tags",
    "preferred_tags",
    "reactions",
    "tags",
    "jokes",
    "settings",
    "chats",
    "users",
    "languages",
];

/// Create all tables and indexes.
pub async fn create(db: &DatabaseConnection) -> AppResult<()> {
    let manager = SchemaManager::new(db);
    for migration in Migrator::table_migrations() {
        migration.up(&manager).await.map_err(map_db_err)?;
        debug!(migration = migration.name(), "Applied table definition");
    }
    info!("Schema created");
    Ok(())
}

/// Drop all tables, children first, together with the migration history.
pub async fn drop(db: &DatabaseConnection) -> AppResult<()> {
    let manager = SchemaManager::new(db);
    for migration in Migrator::table_migrations().into_iter().rev() {
        migration.down(&manager).await.map_err(map_db_err)?;
        debug!(migration = migration.name(), "Reverted table definition");
    }

    manager
        .drop_table(
            Table::drop()
                .table(Alias::new("seaql_migrations"))
                .if_exists()
                .to_owned(),
        )
        .await
        .map_err(map_db_err)?;

    info!("Schema dropped");
    Ok(())
}

/// Whether every table of the schema exists.
pub async fn exists(db: &DatabaseConnection) -> AppResult<bool> {
    let manager = SchemaManager::new(db);
    for table in DROP_ORDER {
        if !manager.has_table(table).await.map_err(map_db_err)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Number of rows in every table, parents first.
pub async fn row_counts(db: &DatabaseConnection) -> AppResult<Vec<(&'static str, u64)>> {
    let mut counts = Vec::with_capacity(DROP_ORDER.len());
    counts.push(("languages", Language::find().count(db).await.map_err(map_db_err)?));
    counts.push(("users", User::find().count(db).await.map_err(map_db_err)?));
    counts.push(("chats", Chat::find().count(db).await.map_err(map_db_err)?));
    counts.push(("settings", Settings::find().count(db).await.map_err(map_db_err)?));
    counts.push(("jokes", Joke::find().count(db).await.map_err(map_db_err)?));
    counts.push(("tags", Tag::find().count(db).await.map_err(map_db_err)?));
    counts.push(("reactions", Reaction::find().count(db).await.map_err(map_db_err)?));
    counts.push(("preferred_tags", PreferredTag::find().count(db).await.map_err(map_db_err)?));
    counts.push(("joke_tags", JokeTag::find().count(db).await.map_err(map_db_err)?));
    counts.push(("joke_reactions", JokeReaction::find().count(db).await.map_err(map_db_err)?));
    Ok(counts)
}

/// Drop and recreate the schema.
pub async fn recreate(db: &DatabaseConnection) -> AppResult<()> {
    match drop(db).await {
        Ok(()) => {}
        // Nothing to drop on an empty database
        Err(AppError::Database(msg)) if msg.to_lowercase().contains("no such table") => {}
        Err(AppError::Database(msg)) if msg.contains("does not exist") => {}
        Err(e) => return Err(e),
    }
    create(db).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_order_covers_every_table_once() {
        let mut tables = DROP_ORDER.to_vec();
        tables.sort_unstable();
        tables.dedup();
        assert_eq!(tables.len(), 10);
    }

    #[test]
    fn test_children_dropped_before_parents() {
        let pos = |name: &str| DROP_ORDER.iter().position(|t| *t == name).unwrap_or(usize::MAX);
        assert!(pos("joke_reactions") < pos("jokes"));
        assert!(pos("joke_reactions") < pos("reactions"));
        assert!(pos("joke_tags") < pos("tags"));
        assert!(pos("preferred_tags") < pos("chats"));
        assert!(pos("settings") < pos("chats"));
        assert!(pos("chats") < pos("users"));
        assert!(pos("jokes") < pos("languages"));
    }
}
