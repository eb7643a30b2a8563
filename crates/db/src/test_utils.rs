//! Test utilities for database operations.
//!
//! Provides an in-memory SQLite database with the schema applied, for
//! integration tests that need real constraint checks.

use std::sync::Arc;

use crate::schema::DROP_ORDER;
use crate::{fixtures, migrate};
use jokebot_common::{AppError, AppResult};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

/// URL of a private in-memory SQLite database.
pub const MEMORY_URL: &str = "sqlite::memory:";

/// A test database context backed by in-memory SQLite.
///
/// The pool holds a single connection: every connection to `sqlite::memory:`
/// opens a fresh database, so a second one would not see the schema.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Create a database with every migration applied, reference data included.
    pub async fn new() -> AppResult<Self> {
        let db = Self::empty().await?;
        migrate(&db.conn).await?;
        Ok(db)
    }

    /// Create a database with no tables at all.
    pub async fn empty() -> AppResult<Self> {
        let mut opt = ConnectOptions::new(MEMORY_URL);
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        info!("Opened in-memory test database");
        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Create a migrated database loaded with the sample data.
    pub async fn with_fixtures() -> AppResult<Self> {
        let db = Self::new().await?;
        fixtures::load_sample_data(&db.conn).await?;
        Ok(db)
    }

    /// Get the database connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        self.conn.as_ref()
    }

    /// Get a shared handle, as taken by the repositories.
    #[must_use]
    pub fn shared(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Delete every row, children first. The schema is kept.
    pub async fn cleanup(&self) -> AppResult<()> {
        let backend = self.conn.get_database_backend();
        for table in DROP_ORDER {
            self.conn
                .execute(Statement::from_string(
                    backend,
                    format!("DELETE FROM \"{table}\""),
                ))
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        info!("Cleaned up test database");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema;

    #[tokio::test]
    async fn test_new_applies_schema() {
        let db = TestDatabase::new().await.unwrap();
        assert!(schema::exists(db.connection()).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_has_no_schema() {
        let db = TestDatabase::empty().await.unwrap();
        assert!(!schema::exists(db.connection()).await.unwrap());
    }
}
