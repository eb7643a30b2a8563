//! Seed the reaction catalog and the language list.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        crate::seed::seed_reference_data(manager.get_connection())
            .await
            .map(|_| ())
            .map_err(|e| DbErr::Migration(e.to_string()))
    }

    /// Reference rows go away with their tables; deleting them here would
    /// trip the foreign keys of any joke or reaction still present.
    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        Ok(())
    }
}
