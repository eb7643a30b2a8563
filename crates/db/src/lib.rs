//! Database layer for jokebot.
//!
//! - [`entities`]: sea-orm models for the ten tables
//! - [`migrations`]: versioned schema and reference-data migrations
//! - [`schema`]: raw create / drop of the schema
//! - [`seed`]: the reaction catalog and language list
//! - [`repositories`]: data access with domain-specific rejections
//! - [`fixtures`]: sample data for development and tests

pub mod entities;
pub mod error;
pub mod fixtures;
pub mod migrations;
pub mod repositories;
pub mod schema;
pub mod seed;
pub mod test_utils;

use jokebot_common::{AppError, Config};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::log::LevelFilter;

/// Initialize database connection.
pub async fn init(config: &Config) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(&config.database.url);

    opt.max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    migrations::Migrator::up(db, None)
        .await
        .map_err(error::map_db_err)
}

/// Roll back every migration and apply them again.
pub async fn reset(db: &DatabaseConnection) -> Result<(), AppError> {
    migrations::Migrator::refresh(db)
        .await
        .map_err(error::map_db_err)
}

/// Names of the migrations not applied yet.
pub async fn pending_migrations(db: &DatabaseConnection) -> Result<Vec<String>, AppError> {
    let pending = migrations::Migrator::get_pending_migrations(db)
        .await
        .map_err(error::map_db_err)?;
    Ok(pending.iter().map(|m| m.name().to_string()).collect())
}
